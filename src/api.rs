use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Envelope every endpoint answers with.
#[derive(Debug, Serialize)]
pub struct APIResponse<T = ()> {
    pub message: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl APIResponse<()> {
    pub fn new_from_msg(msg: &str) -> Self {
        APIResponse {
            message: msg.to_owned(),
            success: true,
            data: None,
            error: None,
        }
    }

    pub fn failure(msg: &str) -> Self {
        APIResponse {
            message: msg.to_owned(),
            success: false,
            data: None,
            error: None,
        }
    }
}

impl<T: Serialize> APIResponse<T> {
    pub fn with_data(msg: &str, data: T) -> Self {
        APIResponse {
            message: msg.to_owned(),
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omits_absent_data_and_error() {
        let body = serde_json::to_value(APIResponse::new_from_msg("BookMark is deleted")).unwrap();

        assert_eq!(
            body,
            serde_json::json!({ "message": "BookMark is deleted", "success": true })
        );
    }

    #[test]
    fn failure_carries_diagnostic_error() {
        let body = serde_json::to_value(
            APIResponse::failure("Failed to add bookmark").with_error("InternalError: disk full"),
        )
        .unwrap();

        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "InternalError: disk full");
        assert!(body.get("data").is_none());
    }
}
