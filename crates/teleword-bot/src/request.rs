//! Turns an [`Outgoing`] message into the body of one Bot API call.

use crate::error::{SendError, SendResult};
use crate::message::{Outgoing, Payload};
use crate::multipart::MultipartBuilder;
use crate::telegram::types::SendMessageRequest;
use crate::upload::{self, LoadedFile, MediaKind};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Method name, body bytes, and the `Content-Type` describing them.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: &'static str,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl ApiRequest {
    pub fn is_multipart(&self) -> bool {
        self.content_type.starts_with("multipart/form-data")
    }
}

/// Builds the request, reading the upload file for photo and video messages.
///
/// # Errors
/// Returns a local file error if the upload cannot be read.
pub fn build_request(message: &Outgoing) -> SendResult<ApiRequest> {
    match &message.payload {
        Payload::Text { text } => text_request(message, text),
        Payload::Photo { path, caption } => {
            let media = Media {
                kind: MediaKind::Photo,
                caption: caption.as_deref(),
                streaming: false,
            };
            media_request(message, &media, upload::load(path)?)
        }
        Payload::Video {
            path,
            caption,
            streaming,
        } => {
            let media = Media {
                kind: MediaKind::Video,
                caption: caption.as_deref(),
                streaming: *streaming,
            };
            media_request(message, &media, upload::load(path)?)
        }
    }
}

/// Media fields taken from a photo or video payload.
struct Media<'a> {
    kind: MediaKind,
    caption: Option<&'a str>,
    streaming: bool,
}

fn text_request(message: &Outgoing, text: &str) -> SendResult<ApiRequest> {
    let request = SendMessageRequest {
        chat_id: &message.chat_id,
        text,
        parse_mode: message.parse_mode.map(|mode| mode.as_str()),
        disable_notification: message.silent.then_some(true),
    };
    let body = serde_json::to_vec(&request).map_err(|err| {
        SendError::usage("Failed to encode message as JSON").with_details(err.to_string())
    })?;
    Ok(ApiRequest {
        method: message.payload.method(),
        content_type: JSON_CONTENT_TYPE.to_string(),
        body,
    })
}

/// Builds a multipart request around an already loaded file.
fn media_request(
    message: &Outgoing,
    media: &Media<'_>,
    file: LoadedFile,
) -> SendResult<ApiRequest> {
    let mut form = MultipartBuilder::new().text("chat_id", message.chat_id.as_str());
    if let Some(caption) = media.caption.filter(|caption| !caption.is_empty()) {
        form = form.text("caption", caption);
    }
    if let Some(mode) = message.parse_mode {
        form = form.text("parse_mode", mode.as_str());
    }
    if message.silent {
        form = form.text("disable_notification", "true");
    }
    if media.streaming {
        form = form.text("supports_streaming", "true");
    }
    let form = form.file(
        media.kind.field_name(),
        file.filename,
        file.content_type,
        file.bytes,
    );

    let body = form.build()?;
    Ok(ApiRequest {
        method: message.payload.method(),
        content_type: body.content_type(),
        body: body.into_bytes(),
    })
}
