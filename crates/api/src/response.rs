//! Response handling shared by every TRS and WES call.

use std::time::Instant;

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use wfinterop_util::http::{parse_response_json_strict, status_error_message, truncate_response_preview};

use crate::ApiError;

/// Turn a response into its JSON payload.
///
/// Non-success statuses become [`ApiError::Status`]; an empty success body
/// becomes `Value::Null`. Nothing is retried.
pub(crate) async fn handle_response(method: &Method, url: &str, response: Response, started: Instant) -> Result<Value, ApiError> {
    let status = response.status();
    let body_text = response.text().await.map_err(|source| ApiError::Transport {
        url: url.to_string(),
        source,
    })?;

    if !status.is_success() {
        let message = error_message(status, &body_text);
        warn!(
            method = %method,
            url = %url,
            status = %status,
            duration_ms = started.elapsed().as_millis(),
            "http request failed"
        );
        return Err(ApiError::Status {
            method: method.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
            message,
        });
    }

    if body_text.trim().is_empty() {
        debug!(
            method = %method,
            url = %url,
            status = %status,
            duration_ms = started.elapsed().as_millis(),
            "http request completed with empty response"
        );
        return Ok(Value::Null);
    }

    let parsed = parse_response_json_strict(&body_text, Some(status)).inspect_err(|error| {
        warn!(
            method = %method,
            url = %url,
            status = %status,
            body_len = body_text.len(),
            error = %error,
            "http response JSON parse failed"
        );
    })?;
    debug!(
        method = %method,
        url = %url,
        status = %status,
        duration_ms = started.elapsed().as_millis(),
        "http request completed"
    );
    Ok(parsed)
}

pub(crate) fn decode<T: DeserializeOwned>(url: &str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Prefer the server's own message (`msg` for WES, `message` elsewhere),
/// prefixed with a hint for statuses users can act on.
fn error_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|payload| {
            payload
                .get("msg")
                .or_else(|| payload.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| truncate_response_preview(body, 200));

    match status_error_message(status.as_u16()) {
        Some(hint) => format!("{hint}; {detail}"),
        None => detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_uses_server_msg_and_hint() {
        let message = error_message(StatusCode::UNAUTHORIZED, r#"{"msg": "token expired", "status_code": 401}"#);
        assert!(message.starts_with("Unauthorized (401)"), "message: {message}");
        assert!(message.ends_with("token expired"));
    }

    #[test]
    fn error_message_falls_back_to_body_preview() {
        let message = error_message(StatusCode::INTERNAL_SERVER_ERROR, "upstream\nexploded");
        assert_eq!(message, "upstream exploded");
    }
}
