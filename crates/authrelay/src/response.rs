//! Turning transport responses into results.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use authrelay_core::{ApiError, ApiResponse, Result, TransportResponse, codes};

const NO_CONTENT: u16 = 204;

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

/// Interpret a response that is not going to be retried.
pub(crate) async fn interpret<T: DeserializeOwned>(
    response: TransportResponse,
) -> Result<ApiResponse<T>> {
    let status = response.status();
    if status == NO_CONTENT {
        return Ok(ApiResponse::empty());
    }

    let ok = response.is_success();
    let text = response.text().await?;
    trace!(status, bytes = text.len(), "Response body read");

    // Only a zero-length body is empty; whitespace must still parse as JSON.
    if text.is_empty() {
        return if ok {
            Ok(ApiResponse::empty())
        } else {
            Err(ApiError::new(codes::EMPTY_RESPONSE, "Empty response body", status))
        };
    }

    let payload: Value = serde_json::from_str(&text).map_err(|e| {
        ApiError::new(
            codes::INVALID_RESPONSE,
            format!("Invalid JSON response: {e}"),
            status,
        )
    })?;

    if ok {
        serde_json::from_value(payload).map_err(|e| {
            ApiError::new(
                codes::INVALID_RESPONSE,
                format!("Unexpected response shape: {e}"),
                status,
            )
        })
    } else {
        Err(error_from_payload(
            payload,
            status,
            codes::UNKNOWN_ERROR,
            "An error occurred",
        ))
    }
}

/// Build the terminal error for a 401 that could not be recovered.
///
/// The body is whatever the server sent with the original 401; anything
/// unreadable becomes the generic `UNAUTHORIZED` error.
pub(crate) async fn unauthorized(response: TransportResponse) -> ApiError {
    let status = response.status();
    let Ok(text) = response.text().await else {
        return ApiError::unauthorized();
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(payload) => error_from_payload(payload, status, codes::UNAUTHORIZED, "Unauthorized"),
        Err(_) => ApiError::unauthorized(),
    }
}

/// Extract the server's `{"error": {"code", "message"}}` object.
pub(crate) fn error_from_payload(
    payload: Value,
    status: u16,
    fallback_code: &str,
    fallback_message: &str,
) -> ApiError {
    let detail = serde_json::from_value::<ErrorEnvelope>(payload)
        .ok()
        .and_then(|envelope| envelope.error);

    match detail {
        Some(detail) => ApiError::new(
            detail.code.unwrap_or_else(|| fallback_code.to_string()),
            detail.message.unwrap_or_else(|| fallback_message.to_string()),
            status,
        ),
        None => ApiError::new(fallback_code, fallback_message, status),
    }
}
