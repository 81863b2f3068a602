use std::fmt;

/// Categories of send failures. Each maps to one stable process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendErrorKind {
    /// Bad or missing command-line input
    Usage,
    /// Missing credential or other configuration problem
    Config,
    /// Upload file missing, unreadable, or rejected by pre-flight checks
    LocalFile,
    /// DNS, connect, TLS, or timeout failure
    Transport,
    /// Telegram answered with `ok: false` or a non-2xx status
    Api,
}

impl SendErrorKind {
    /// Process exit code for this category.
    pub fn exit_code(self) -> i32 {
        match self {
            SendErrorKind::Usage => 2,
            SendErrorKind::Config => 3,
            SendErrorKind::LocalFile => 4,
            SendErrorKind::Transport => 5,
            SendErrorKind::Api => 6,
        }
    }
}

impl fmt::Display for SendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendErrorKind::Usage => write!(f, "usage"),
            SendErrorKind::Config => write!(f, "config"),
            SendErrorKind::LocalFile => write!(f, "local_file"),
            SendErrorKind::Transport => write!(f, "transport"),
            SendErrorKind::Api => write!(f, "api"),
        }
    }
}

/// Structured error with kind and details.
#[derive(Debug, Clone)]
pub struct SendError {
    /// Error category
    pub kind: SendErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional underlying cause (e.g., I/O or TLS error text)
    pub details: Option<String>,
}

impl SendError {
    pub fn new(kind: SendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(SendErrorKind::Usage, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(SendErrorKind::Config, message)
    }

    pub fn local_file(message: impl Into<String>) -> Self {
        Self::new(SendErrorKind::LocalFile, message)
    }

    /// Creates a transport error. The request URL is stripped from the cause
    /// because it embeds the bot token.
    pub fn transport(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Telegram request timed out"
        } else if err.is_connect() {
            "Failed to connect to Telegram"
        } else {
            "Telegram request failed"
        };
        let details = error_chain(&err.without_url());
        Self::new(SendErrorKind::Transport, message).with_details(details)
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::new(SendErrorKind::Api, message)
    }

    pub fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}: {}", self.message, details),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for SendError {}

pub type SendResult<T> = std::result::Result<T, SendError>;

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
