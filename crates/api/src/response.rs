//! API response envelope.
//!
//! Every endpoint answers `{"status": bool, "message": str, "response": data}`.
//! Errors use the same shape through `AppError::into_response`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use sangam_common::{AppError, AppResult, LocalTimeFormatter};
use serde::Serialize;
use serde_json::Value;

/// Standard API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: bool,
    pub message: String,
    pub response: T,
    #[serde(skip)]
    code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub fn ok(data: T) -> Self {
        Self::with_message("Success", data)
    }

    /// Create a success response with a custom message.
    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            status: true,
            message: message.into(),
            response: data,
            code: StatusCode::OK,
        }
    }

    /// Answer with `201 Created`.
    #[must_use]
    pub fn created(mut self) -> Self {
        self.code = StatusCode::CREATED;
        self
    }
}

impl ApiResponse<Value> {
    /// Success response whose timestamps also carry a local rendering.
    pub fn localized<T: Serialize>(data: &T, formatter: &LocalTimeFormatter) -> AppResult<Self> {
        let mut value = serde_json::to_value(data)
            .map_err(|e| AppError::Internal(format!("Failed to serialize response: {e}")))?;
        localize_times(&mut value, formatter);
        Ok(Self::ok(value))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.code, Json(self)).into_response()
    }
}

/// Success response without a payload.
#[must_use]
pub fn done(message: impl Into<String>) -> ApiResponse<Value> {
    ApiResponse::with_message(message, Value::Array(vec![]))
}

/// Add a `<key>_local` string next to every `*_at` or `*_time` timestamp.
pub fn localize_times(value: &mut Value, formatter: &LocalTimeFormatter) {
    match value {
        Value::Object(map) => {
            let mut local = Vec::new();
            for (key, field) in map.iter_mut() {
                if is_time_key(key)
                    && let Value::String(text) = &*field
                    && let Ok(at) = DateTime::parse_from_rfc3339(text)
                {
                    local.push((
                        format!("{key}_local"),
                        formatter.format(at.with_timezone(&Utc)),
                    ));
                } else {
                    localize_times(field, formatter);
                }
            }
            for (key, text) in local {
                map.insert(key, Value::String(text));
            }
        }
        Value::Array(items) => {
            for item in items {
                localize_times(item, formatter);
            }
        }
        _ => {}
    }
}

fn is_time_key(key: &str) -> bool {
    key.ends_with("_at") || key.ends_with("_time")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shape() {
        let value = serde_json::to_value(ApiResponse::ok(json!({"id": "a"}))).unwrap();
        assert_eq!(
            value,
            json!({"status": true, "message": "Success", "response": {"id": "a"}})
        );
    }

    #[test]
    fn test_localize_times_nested() {
        let formatter = LocalTimeFormatter::default();
        let mut value = json!({
            "rooms": [{
                "last_message_time": "2025-01-15T20:00:00Z",
                "created_at": "2025-03-02T06:15:00+00:00",
                "name": "Priya",
            }],
            "updated_at": null,
        });

        localize_times(&mut value, &formatter);

        let room = &value["rooms"][0];
        assert_eq!(room["last_message_time_local"], "16 Jan 2025, 01:30 AM");
        assert_eq!(room["created_at_local"], "02 Mar 2025, 11:45 AM");
        assert_eq!(room["name"], "Priya");
        assert!(value.get("updated_at_local").is_none());
    }
}
