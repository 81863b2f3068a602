//! Telegram Bot API client for sending text, photo, and video messages.

pub mod error;
pub mod message;
pub mod mime;
pub mod multipart;
pub mod request;
pub mod telegram;
pub mod upload;

pub use error::{SendError, SendErrorKind, SendResult};
pub use message::{Outgoing, ParseMode, Payload};
pub use telegram::{ClientOptions, SentMessage, TelegramClient};
