//! Request-body field access with per-field validators shared by all entities.

use crate::error::{AppError, ValidationError};
use serde_json::{Map, Value};

/// Flat request body: field name to raw JSON value, in request order.
pub type FieldMap = Map<String, Value>;

pub fn body_to_map(value: Value) -> Result<FieldMap, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// Every key must be in `allowed`; `id` is always reported as immutable.
pub fn reject_unknown(fields: &FieldMap, allowed: &[&str]) -> Result<(), ValidationError> {
    let mut errors = ValidationError::default();
    for key in fields.keys() {
        if key == "id" {
            errors.push("id", "is generated and cannot be set");
        } else if !allowed.contains(&key.as_str()) {
            errors.push(key.as_str(), "unknown field");
        }
    }
    errors.into_result()
}

/// Absent and `null` are the same thing for every validator.
fn present<'a>(value: Option<&'a Value>) -> Option<&'a Value> {
    value.filter(|v| !v.is_null())
}

pub fn non_empty(field: &str, value: &str, what: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::field(field, format!("{} must not be empty", what)));
    }
    Ok(())
}

pub fn required_string(field: &str, value: Option<&Value>, what: &str) -> Result<String, ValidationError> {
    let v = present(value).ok_or_else(|| ValidationError::field(field, format!("{} is required", what)))?;
    let s = v
        .as_str()
        .ok_or_else(|| ValidationError::field(field, "must be a string"))?;
    non_empty(field, s, what)?;
    Ok(s.to_string())
}

/// String that must be present but may be empty.
pub fn string(field: &str, value: Option<&Value>) -> Result<String, ValidationError> {
    let v = present(value).ok_or_else(|| ValidationError::field(field, "is required"))?;
    v.as_str()
        .map(str::to_string)
        .ok_or_else(|| ValidationError::field(field, "must be a string"))
}

pub fn integer(field: &str, value: Option<&Value>) -> Result<i64, ValidationError> {
    let v = present(value).ok_or_else(|| ValidationError::field(field, "is required"))?;
    v.as_i64()
        .ok_or_else(|| ValidationError::field(field, "must be an integer"))
}

/// Foreign keys reject absence and non-positive ids; existence is checked by the store.
pub fn foreign_key(field: &str, value: Option<&Value>, what: &str) -> Result<i64, ValidationError> {
    let v = present(value).ok_or_else(|| ValidationError::field(field, format!("{} is required", what)))?;
    match v.as_i64() {
        Some(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::field(field, "must be a positive integer id")),
    }
}

/// Records the error instead of returning early, so one response lists every bad field.
pub fn collect<T>(errors: &mut ValidationError, result: Result<T, ValidationError>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            errors.merge(e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> FieldMap {
        body_to_map(v).unwrap()
    }

    #[test]
    fn test_body_must_be_object() {
        assert!(matches!(body_to_map(json!([1, 2])), Err(AppError::BadRequest(_))));
        assert!(matches!(body_to_map(json!("name")), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_reject_unknown_lists_every_offender() {
        let fields = map(json!({"name": "Ada", "id": 3, "rank": "captain"}));
        let err = reject_unknown(&fields, &["name"]).unwrap_err();
        assert_eq!(err.errors.len(), 2);
        assert_eq!(err.errors[0].field, "id");
        assert_eq!(err.errors[1].field, "rank");
    }

    #[test]
    fn test_required_string_treats_null_as_absent() {
        let err = required_string("name", Some(&Value::Null), "name").unwrap_err();
        assert_eq!(err.messages(), vec!["name: name is required"]);
        let err = required_string("name", Some(&json!("")), "name").unwrap_err();
        assert_eq!(err.messages(), vec!["name: name must not be empty"]);
        assert!(required_string("name", Some(&json!(7)), "name").is_err());
        assert_eq!(required_string("name", Some(&json!("Ada")), "name").unwrap(), "Ada");
    }

    #[test]
    fn test_foreign_key_rejects_absent_and_non_positive() {
        assert!(foreign_key("planet_id", None, "planet").is_err());
        assert!(foreign_key("planet_id", Some(&json!(0)), "planet").is_err());
        assert!(foreign_key("planet_id", Some(&json!("1")), "planet").is_err());
        assert_eq!(foreign_key("planet_id", Some(&json!(4)), "planet").unwrap(), 4);
    }

    #[test]
    fn test_integer_rejects_fractions() {
        assert!(integer("distance_from_earth", Some(&json!(2.5))).is_err());
        assert_eq!(integer("distance_from_earth", Some(&json!(-3))).unwrap(), -3);
    }
}
