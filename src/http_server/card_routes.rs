//! Card HTTP Routes
//!
//! Emulated card-issuing endpoints. Every handler validates its input
//! against the schema of the same name before touching the store; path
//! parameters are validated as a one-field payload.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use rand::Rng;
use serde_json::{json, Value};
use tracing::info;

use super::errors::ApiResult;
use super::state::AppState;
use crate::notify::CardEvent;
use crate::observability::Event;
use crate::store::{generate_id, Record, StoreError};

pub const STATUS_AWAITING_ACTIVATION: &str = "card-status-awaiting-activation";
pub const STATUS_ACTIVE: &str = "card-status-active";
pub const STATUS_SUSPENDED: &str = "card-status-suspended";

/// Create card routes
pub fn card_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/cards", post(issue_card_handler))
        .route("/cards/by-token/:card_token", get(get_card_by_token_handler))
        .route("/cards/:card_id", get(get_card_handler))
        .route("/cards/:card_id/image", get(get_card_image_handler))
        .route("/cards/:card_id/activate", post(activate_card_handler))
        .route("/cards/:card_id/suspend", post(suspend_card_handler))
        .route("/cards/:card_id/pin", get(get_pin_handler))
        .with_state(state)
}

/// Malformed JSON is treated like an empty payload so that the
/// credential check still runs first.
fn parse_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

fn card_token() -> u64 {
    rand::thread_rng().gen_range(9_999..=99_999)
}

fn card_pin() -> u64 {
    rand::thread_rng().gen_range(1_000..=9_999)
}

// ==================
// Handlers
// ==================

async fn issue_card_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let input = parse_body(&body);
    state.validator().validate("add_card", &input, &headers)?;

    let mut record: Record = match input {
        Value::Object(map) => map,
        _ => Record::new(),
    };
    let card_id = generate_id();
    record.insert("card_status".into(), json!(STATUS_AWAITING_ACTIVATION));
    record.insert("card_id".into(), json!(card_id));
    record.insert("card_token".into(), json!(card_token()));

    state.store.put(&card_id, &record)?;
    info!(event = %Event::CardIssued, card_id = %card_id, "card issued");

    state.announce(
        CardEvent::AwaitingActivation,
        &card_id,
        record.get("ledger_id"),
    );

    Ok(Json(json!({ "card_id": card_id })))
}

async fn get_card_handler(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    state
        .validator()
        .validate("get_card", &json!({ "card_id": card_id }), &headers)?;

    let record = state.store.get(&card_id).await?;
    Ok(Json(Value::Object(record)))
}

async fn get_card_by_token_handler(
    State(state): State<Arc<AppState>>,
    Path(card_token): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    state.validator().validate(
        "get_card_by_token",
        &json!({ "card_token": card_token }),
        &headers,
    )?;

    // Tokens are stored as numbers
    let token: u64 = card_token
        .parse()
        .map_err(|_| StoreError::NotFound(format!("card_token={}", card_token)))?;
    // Reads every local record file; keep it off the async workers
    let store = state.store.clone();
    let record =
        tokio::task::spawn_blocking(move || store.scan_by_field("card_token", &json!(token)))
            .await
            .map_err(|e| StoreError::Io(format!("token scan aborted: {}", e)))??;
    Ok(Json(Value::Object(record)))
}

async fn get_card_image_handler(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    state
        .validator()
        .validate("get_card_image", &json!({ "card_id": card_id }), &headers)?;

    Ok(Json(json!({ "temp_card_image_url": state.card_image_url })))
}

async fn activate_card_handler(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    state
        .validator()
        .validate("activate_card", &json!({ "card_id": card_id }), &headers)?;

    change_status(&state, &card_id, STATUS_ACTIVE, CardEvent::Activated).await?;
    Ok(Json(json!({ "card_id": card_id })))
}

async fn suspend_card_handler(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    state
        .validator()
        .validate("suspend_card", &json!({ "card_id": card_id }), &headers)?;

    change_status(&state, &card_id, STATUS_SUSPENDED, CardEvent::Suspended).await?;
    Ok(Json(json!({ "card_id": card_id })))
}

async fn get_pin_handler(
    State(state): State<Arc<AppState>>,
    Path(card_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    state
        .validator()
        .validate("get_pin", &json!({ "card_id": card_id }), &headers)?;

    Ok(Json(json!({ "pin": card_pin() })))
}

async fn change_status(
    state: &AppState,
    card_id: &str,
    status: &str,
    event: CardEvent,
) -> ApiResult<()> {
    let mut partial = Record::new();
    partial.insert("card_status".into(), json!(status));
    state.store.merge(card_id, partial).await?;

    info!(event = %Event::CardStatusChanged, card_id, status, "card status changed");
    state.announce(event, card_id, None);
    Ok(())
}
