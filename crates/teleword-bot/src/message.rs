//! Outgoing message descriptor.

use std::path::{Path, PathBuf};

use crate::upload::MediaKind;

/// Telegram `parse_mode` value used for message text and captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Markdown,
}

impl ParseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseMode::Markdown => "Markdown",
        }
    }
}

/// Kind-specific message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text {
        text: String,
    },
    Photo {
        path: PathBuf,
        caption: Option<String>,
    },
    Video {
        path: PathBuf,
        caption: Option<String>,
        streaming: bool,
    },
}

impl Payload {
    /// Bot API method that delivers this payload.
    pub fn method(&self) -> &'static str {
        match self {
            Payload::Text { .. } => "sendMessage",
            Payload::Photo { .. } => "sendPhoto",
            Payload::Video { .. } => "sendVideo",
        }
    }

    /// Short noun used in log lines and confirmations.
    pub fn noun(&self) -> &'static str {
        match self {
            Payload::Text { .. } => "message",
            Payload::Photo { .. } => "photo",
            Payload::Video { .. } => "video",
        }
    }

    /// Local file to upload and its media family, if any.
    pub fn upload(&self) -> Option<(&Path, MediaKind)> {
        match self {
            Payload::Text { .. } => None,
            Payload::Photo { path, .. } => Some((path.as_path(), MediaKind::Photo)),
            Payload::Video { path, .. } => Some((path.as_path(), MediaKind::Video)),
        }
    }
}

/// A fully validated message ready to be turned into an API request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    /// Numeric chat id or `@channelname`, passed through verbatim.
    pub chat_id: String,
    pub payload: Payload,
    pub parse_mode: Option<ParseMode>,
    /// Deliver without a notification sound.
    pub silent: bool,
}

impl Outgoing {
    pub fn new(chat_id: impl Into<String>, payload: Payload) -> Self {
        Self {
            chat_id: chat_id.into(),
            payload,
            parse_mode: None,
            silent: false,
        }
    }

    #[must_use]
    pub fn markdown(mut self, enabled: bool) -> Self {
        self.parse_mode = enabled.then_some(ParseMode::Markdown);
        self
    }

    #[must_use]
    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }
}
