//! Response envelope
//!
//! Uniform envelope returned by every operation at the request boundary:
//! `success` plus either `data` or `error`. The HTTP status comes from the
//! error taxonomy, not from the envelope.

use serde::{Deserialize, Serialize};

use crate::utils::errors::ExpoHubError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            error: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: &ExpoHubError) -> Self {
        Self {
            success: false,
            message: None,
            data: None,
            error: Some(error.to_string()),
        }
    }
}

impl<T> From<&ExpoHubError> for ApiResponse<T> {
    fn from(error: &ExpoHubError) -> Self {
        ApiResponse::err(error)
    }
}

/// Envelope plus the HTTP status the boundary should respond with
pub fn into_response<T: Serialize>(
    result: Result<T, ExpoHubError>,
) -> (u16, ApiResponse<T>) {
    match result {
        Ok(data) => (200, ApiResponse::ok(data)),
        Err(err) => (err.http_status(), ApiResponse::err(&err)),
    }
}
