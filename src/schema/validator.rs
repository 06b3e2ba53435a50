//! Request validator
//!
//! Order of checks:
//! 1. Schema lookup
//! 2. Authentication (always before any shape check)
//! 3. Non-empty payload
//! 4. Each declared field, in declaration order, stopping at the first failure
//!
//! Only declared fields are inspected. Undeclared fields pass through, and
//! nested objects are checked only through explicit `a--b` entries.

use axum::http::HeaderMap;
use serde::Serialize;
use serde_json::Value;

use super::errors::{ValidationError, ValidationResult};
use super::loader::SchemaLoader;
use super::types::{FieldKind, FieldRule, Primitive};
use crate::auth::ApiKey;

/// Validates requests against named schemas.
///
/// Borrowed per request; holds no state of its own.
pub struct SchemaValidator<'a> {
    loader: &'a SchemaLoader,
    api_key: &'a ApiKey,
}

impl<'a> SchemaValidator<'a> {
    /// Creates a validator backed by the given registry and key
    pub fn new(loader: &'a SchemaLoader, api_key: &'a ApiKey) -> Self {
        Self { loader, api_key }
    }

    /// Validates a request payload and its headers against a schema.
    ///
    /// # Errors
    ///
    /// - `SchemaNotFound` if `schema_name` is not registered
    /// - `Unauthorized` if the credential is missing or wrong
    /// - `InvalidInput` if the payload is empty or not an object
    /// - `EnumRequired` / `TypeMismatch` for the first failing field
    pub fn validate(
        &self,
        schema_name: &str,
        input: &Value,
        headers: &HeaderMap,
    ) -> ValidationResult<()> {
        let schema = self
            .loader
            .get(schema_name)
            .ok_or_else(|| ValidationError::SchemaNotFound(schema_name.to_string()))?;

        self.api_key.check(headers)?;

        match input.as_object() {
            Some(map) if !map.is_empty() => {}
            _ => return Err(ValidationError::empty_payload()),
        }

        for rule in &schema.fields {
            check_field(rule, rule.resolve(input))?;
        }

        Ok(())
    }

    /// Same as [`validate`](Self::validate), flattened into a verdict
    pub fn verdict(&self, schema_name: &str, input: &Value, headers: &HeaderMap) -> Verdict {
        self.validate(schema_name, input, headers).into()
    }
}

/// Checks one resolved value against its rule
fn check_field(rule: &FieldRule, value: &Value) -> ValidationResult<()> {
    match &rule.kind {
        FieldKind::Enum { options } => {
            if options.iter().any(|option| option == value) {
                return Ok(());
            }
            if !rule.is_required() && value.is_null() {
                return Ok(());
            }
            Err(ValidationError::EnumRequired {
                field: rule.name.clone(),
                options: options.clone(),
            })
        }
        FieldKind::Primitive(_) => {
            let accepted = rule.accepted();
            if accepted.contains(&Primitive::of(value)) {
                return Ok(());
            }
            Err(ValidationError::TypeMismatch {
                field: rule.name.clone(),
                accepted,
            })
        }
    }
}

/// Pass/fail outcome with a human-readable reason, in the response shape
/// the emulated API uses (`{"success": .., "message": ..}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    #[serde(rename = "success")]
    pub ok: bool,
    #[serde(rename = "message")]
    pub reason: String,
}

impl Verdict {
    pub fn pass() -> Self {
        Self {
            ok: true,
            reason: String::new(),
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: reason.into(),
        }
    }
}

impl From<ValidationResult<()>> for Verdict {
    fn from(result: ValidationResult<()>) -> Self {
        match result {
            Ok(()) => Verdict::pass(),
            Err(e) => Verdict::fail(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Presence, Schema};
    use axum::http::{header::AUTHORIZATION, HeaderValue};
    use serde_json::json;

    const KEY: &str = "test-key";

    fn auth_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("API-Key {}", KEY)).unwrap(),
        );
        headers
    }

    fn setup_loader() -> SchemaLoader {
        let mut loader = SchemaLoader::default();
        loader
            .register(Schema::new(
                "payment",
                vec![
                    FieldRule::required("ledger_id", &[Primitive::Str]),
                    FieldRule::optional("note", &[Primitive::Str]),
                    FieldRule::required("amount--value", &[Primitive::Int]),
                    FieldRule::one_of(
                        "kind",
                        Presence::Required,
                        vec![json!("charge"), json!("refund")],
                    ),
                    FieldRule::one_of("channel", Presence::Optional, vec![json!("web")]),
                ],
            ))
            .unwrap();
        loader
    }

    fn valid_payment() -> Value {
        json!({
            "ledger_id": "ldg_1",
            "amount": { "value": 42 },
            "kind": "refund"
        })
    }

    #[test]
    fn test_valid_payload_passes() {
        let loader = setup_loader();
        let key = ApiKey::new(KEY);
        let validator = SchemaValidator::new(&loader, &key);

        assert!(validator
            .validate("payment", &valid_payment(), &auth_headers())
            .is_ok());
    }

    #[test]
    fn test_unknown_schema() {
        let loader = setup_loader();
        let key = ApiKey::new(KEY);
        let validator = SchemaValidator::new(&loader, &key);

        let result = validator.validate("missing", &valid_payment(), &auth_headers());
        assert_eq!(result, Err(ValidationError::SchemaNotFound("missing".into())));
    }

    #[test]
    fn test_auth_checked_before_shape() {
        let loader = setup_loader();
        let key = ApiKey::new(KEY);
        let validator = SchemaValidator::new(&loader, &key);

        // Payload is also invalid; the auth failure must win
        let result = validator.validate("payment", &json!({}), &HeaderMap::new());
        assert_eq!(result, Err(ValidationError::missing_credentials()));
    }

    #[test]
    fn test_empty_payload_rejected() {
        let loader = setup_loader();
        let key = ApiKey::new(KEY);
        let validator = SchemaValidator::new(&loader, &key);

        for input in [json!({}), json!(null), json!([1, 2])] {
            let result = validator.validate("payment", &input, &auth_headers());
            assert_eq!(result, Err(ValidationError::empty_payload()));
        }
    }

    #[test]
    fn test_nested_required_missing() {
        let loader = setup_loader();
        let key = ApiKey::new(KEY);
        let validator = SchemaValidator::new(&loader, &key);

        let mut input = valid_payment();
        input["amount"] = json!({});
        let err = validator
            .validate("payment", &input, &auth_headers())
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::TypeMismatch {
                field: "amount--value".into(),
                accepted: vec![Primitive::Int],
            }
        );
    }

    #[test]
    fn test_float_is_not_int() {
        let loader = setup_loader();
        let key = ApiKey::new(KEY);
        let validator = SchemaValidator::new(&loader, &key);

        let mut input = valid_payment();
        input["amount"]["value"] = json!(42.5);
        let err = validator
            .validate("payment", &input, &auth_headers())
            .unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { .. }));
    }

    #[test]
    fn test_optional_null_passes_and_wrong_type_fails() {
        let loader = setup_loader();
        let key = ApiKey::new(KEY);
        let validator = SchemaValidator::new(&loader, &key);

        let mut input = valid_payment();
        input["note"] = Value::Null;
        assert!(validator.validate("payment", &input, &auth_headers()).is_ok());

        input["note"] = json!(5);
        let err = validator
            .validate("payment", &input, &auth_headers())
            .unwrap_err();
        assert_eq!(err.to_string(), "note should be of type [str, None]");
    }

    #[test]
    fn test_enum_cases() {
        let loader = setup_loader();
        let key = ApiKey::new(KEY);
        let validator = SchemaValidator::new(&loader, &key);

        let mut input = valid_payment();
        input["kind"] = json!("x");
        let err = validator
            .validate("payment", &input, &auth_headers())
            .unwrap_err();
        assert!(err.to_string().contains("[\"charge\", \"refund\"]"));

        input["kind"] = Value::Null;
        let null_err = validator
            .validate("payment", &input, &auth_headers())
            .unwrap_err();
        assert_eq!(null_err, err);
    }

    #[test]
    fn test_optional_enum() {
        let loader = setup_loader();
        let key = ApiKey::new(KEY);
        let validator = SchemaValidator::new(&loader, &key);

        let mut input = valid_payment();
        input["channel"] = json!("web");
        assert!(validator.validate("payment", &input, &auth_headers()).is_ok());

        input["channel"] = json!("fax");
        assert!(matches!(
            validator.validate("payment", &input, &auth_headers()),
            Err(ValidationError::EnumRequired { .. })
        ));
    }

    #[test]
    fn test_first_failure_wins() {
        let loader = setup_loader();
        let key = ApiKey::new(KEY);
        let validator = SchemaValidator::new(&loader, &key);

        let input = json!({ "ledger_id": 1, "kind": "x" });
        let err = validator
            .validate("payment", &input, &auth_headers())
            .unwrap_err();
        assert!(err.to_string().starts_with("ledger_id"));
    }

    #[test]
    fn test_verdict_shape() {
        let loader = setup_loader();
        let key = ApiKey::new(KEY);
        let validator = SchemaValidator::new(&loader, &key);

        let verdict = validator.verdict("payment", &valid_payment(), &HeaderMap::new());
        assert!(!verdict.ok);
        assert_eq!(
            serde_json::to_value(&verdict).unwrap(),
            json!({ "success": false, "message": "Authorisation header needed" })
        );
        assert_eq!(
            validator.verdict("payment", &valid_payment(), &auth_headers()),
            Verdict::pass()
        );
    }
}
