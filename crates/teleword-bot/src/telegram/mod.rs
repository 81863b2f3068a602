//! Bot API client: one POST per message and the response envelope check.

use std::time::Duration;

use serde_json::Value;

use crate::error::{SendError, SendResult};
use crate::message::Outgoing;
use crate::request::{ApiRequest, build_request};

pub(crate) mod types;

pub use types::{Chat, SentMessage, TelegramResponse};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Transport settings for [`TelegramClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    /// Disable TLS certificate verification.
    pub insecure: bool,
    pub connect_timeout: Duration,
    /// Whole-request timeout, upload included.
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            insecure: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    /// # Errors
    /// Returns a transport error if the HTTP client cannot be initialized.
    pub fn with_options(token: String, options: &ClientOptions) -> SendResult<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.timeout)
            .user_agent(concat!("teleword/", env!("CARGO_PKG_VERSION")));
        if options.insecure {
            tracing::warn!("Skipping certificate verification as requested by user");
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder.build().map_err(SendError::transport)?;

        Ok(Self {
            http,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Builds and submits one message. Returns the `result` object of the
    /// API response.
    ///
    /// # Errors
    /// Returns a local file, transport, or API error.
    pub async fn send(&self, message: &Outgoing) -> SendResult<Value> {
        tracing::debug!(
            chat_id = %message.chat_id,
            kind = message.payload.noun(),
            "Trying to send {} to chat {}",
            message.payload.noun(),
            message.chat_id
        );
        let request = build_request(message)?;
        self.execute(request).await
    }

    /// Submits a prepared request.
    ///
    /// # Errors
    /// Returns a transport error if no response arrived, or an API error if
    /// Telegram rejected the call.
    pub async fn execute(&self, request: ApiRequest) -> SendResult<Value> {
        let url = format!("{}/bot{}/{}", self.base_url, self.token, request.method);
        tracing::debug!(
            base_url = %self.base_url,
            method = request.method,
            content_type = %request.content_type,
            body_len = request.body.len(),
            "Sending POST request"
        );

        let response = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, request.content_type)
            .body(request.body)
            .send()
            .await
            .map_err(SendError::transport)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(SendError::transport)?;
        tracing::debug!(status = status.as_u16(), "Response status");
        tracing::debug!(body = %String::from_utf8_lossy(&bytes), "Response data");

        interpret_response(status.as_u16(), &bytes)
    }
}

/// Decides success from the HTTP status and the JSON envelope.
///
/// # Errors
/// Returns an API error carrying Telegram's `description` when the call was
/// not successful.
pub fn interpret_response(status: u16, body: &[u8]) -> SendResult<Value> {
    let success_status = (200..300).contains(&status);
    let generic = || format!("Telegram API error (HTTP {status})");

    let payload: TelegramResponse = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(err) if success_status => {
            return Err(SendError::api("Failed to decode Telegram response")
                .with_details(err.to_string()));
        }
        Err(_) => {
            let snippet = String::from_utf8_lossy(body).trim().to_string();
            let err = SendError::api(generic());
            return Err(if snippet.is_empty() {
                err
            } else {
                err.with_details(snippet)
            });
        }
    };

    if !payload.ok || !success_status {
        if let Some(code) = payload.error_code {
            tracing::debug!(error_code = code, "Telegram rejected the call");
        }
        let description = payload
            .description
            .filter(|description| !description.trim().is_empty())
            .unwrap_or_else(generic);
        return Err(SendError::api(description));
    }

    Ok(payload.result.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::SendErrorKind;

    #[test]
    fn ok_response_returns_result() {
        let body = br#"{"ok":true,"result":{"message_id":7,"chat":{"id":42,"type":"private"}}}"#;
        let result = interpret_response(200, body).unwrap();
        assert_eq!(result["message_id"], json!(7));
        let sent: SentMessage = serde_json::from_value(result).unwrap();
        assert_eq!(sent.chat.map(|chat| chat.id), Some(42));
    }

    #[test]
    fn rejection_carries_description() {
        let body = br#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#;
        let err = interpret_response(400, body).unwrap_err();
        assert_eq!(err.kind, SendErrorKind::Api);
        assert!(err.to_string().contains("chat not found"));
    }

    #[test]
    fn ok_false_with_200_is_still_rejection() {
        let err = interpret_response(200, br#"{"ok":false,"description":"chat not found"}"#)
            .unwrap_err();
        assert_eq!(err.kind, SendErrorKind::Api);
        assert_eq!(err.message, "chat not found");
    }

    #[test]
    fn missing_description_uses_generic_message() {
        let err = interpret_response(500, br#"{"ok":false}"#).unwrap_err();
        assert_eq!(err.message, "Telegram API error (HTTP 500)");
    }

    #[test]
    fn non_json_error_body_is_reported() {
        let err = interpret_response(502, b"<html>Bad Gateway</html>").unwrap_err();
        assert_eq!(err.kind, SendErrorKind::Api);
        assert_eq!(err.message, "Telegram API error (HTTP 502)");
        assert_eq!(err.details.as_deref(), Some("<html>Bad Gateway</html>"));
    }

    #[test]
    fn non_2xx_with_ok_true_is_rejection() {
        let err = interpret_response(404, br#"{"ok":true,"result":{}}"#).unwrap_err();
        assert_eq!(err.message, "Telegram API error (HTTP 404)");
    }
}
