//! cardstub - an emulated card-issuing API
//!
//! Validates requests against declarative JSON schemas, keeps card records
//! in a local directory mirrored to a remote object store, and announces
//! card lifecycle changes to a webhook.

pub mod auth;
pub mod cli;
pub mod config;
pub mod http_server;
pub mod notify;
pub mod observability;
pub mod schema;
pub mod store;
