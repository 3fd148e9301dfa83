//! Response envelope shared by the JSON endpoints

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// `{ success, message, data, errors, path, timestamp }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub errors: Option<String>,
    pub path: String,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T, path: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: None,
            path: path.into(),
            timestamp: Utc::now(),
        })
    }

    pub fn fail(
        message: impl Into<String>,
        errors: impl Into<String>,
        path: impl Into<String>,
    ) -> Json<Self> {
        Json(Self {
            success: false,
            message: message.into(),
            data: None,
            errors: Some(errors.into()),
            path: path.into(),
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_shape() {
        let Json(body) = ApiResponse::ok("done", 7, "/x");
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "done");
        assert_eq!(value["data"], 7);
        assert!(value["errors"].is_null());
        assert_eq!(value["path"], "/x");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_fail_shape() {
        let Json(body) = ApiResponse::<()>::fail("Internal error", "backend down", "/x");
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["success"], false);
        assert!(value["data"].is_null());
        assert_eq!(value["errors"], "backend down");
    }
}
