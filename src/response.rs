//! The `{ code, message, <payload field> }` envelope every endpoint answers with.

use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::AppError;

/// An envelope with no payload.
pub fn message(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "code": status.as_u16(),
        "message": message
    }))
}

/// An envelope whose payload sits under `field` (`data`, `task`, `tasks`, `token`, ...).
pub fn with_payload<T: Serialize>(
    status: StatusCode,
    message: &str,
    field: &str,
    payload: &T,
) -> Result<HttpResponse, AppError> {
    let payload = serde_json::to_value(payload).map_err(|e| {
        AppError::InternalServerError(format!("Failed to serialize response: {}", e))
    })?;
    let mut body = Map::new();
    body.insert("code".into(), Value::from(status.as_u16()));
    body.insert("message".into(), Value::from(message));
    body.insert(field.into(), payload);
    Ok(HttpResponse::build(status).json(Value::Object(body)))
}
