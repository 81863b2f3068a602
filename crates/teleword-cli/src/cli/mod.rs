//! CLI entry and dispatch.

use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use teleword_bot::telegram::DEFAULT_API_URL;
use teleword_bot::upload;
use teleword_bot::{ClientOptions, Outgoing, Payload, SendError, SentMessage, TelegramClient};

mod logging;
mod token;

use token::TOKEN_ENV;

/// Value of `text CONTENT` that reads the message from standard input.
const STDIN_MARKER: &str = "-";

#[derive(Parser)]
#[command(name = "teleword")]
#[command(version)]
#[command(about = "Send text, photo, or video messages to a Telegram chat")]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// Set Bot API token
    #[arg(long, value_name = "API_TOKEN")]
    token: Option<String>,

    /// Use Markdown formatting for text and captions
    #[arg(long)]
    markdown: bool,

    /// Do not notify the recipient of the message
    #[arg(long)]
    silent: bool,

    /// Skip local sanity checks on the upload file
    #[arg(long)]
    force: bool,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Log debug information to stderr
    #[arg(long)]
    verbose: bool,

    /// Seconds to wait for the connection to be established
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    connect_timeout: u64,

    /// Seconds to wait for the whole request, upload included
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: u64,

    /// Bot API base URL
    #[arg(
        long,
        value_name = "URL",
        env = "TELEGRAM_API_URL",
        default_value = DEFAULT_API_URL,
        hide = true
    )]
    api_url: String,

    /// ID of the chat that should receive the message (numeric or @channelname)
    #[arg(value_name = "CHAT_ID")]
    chat_id: String,

    #[command(subcommand)]
    command: MessageCommand,
}

#[derive(clap::Subcommand)]
enum MessageCommand {
    /// Text message
    Text {
        /// Text of the message ('-' to read it from stdin)
        #[arg(value_name = "CONTENT", allow_hyphen_values = true)]
        content: String,
    },
    /// Photo
    Photo {
        /// Path to the photo file
        #[arg(value_name = "FILE_PATH")]
        path: PathBuf,

        /// Caption for the photo
        #[arg(long, value_name = "TEXT")]
        caption: Option<String>,
    },
    /// Video file
    Video {
        /// Path to the video file
        #[arg(value_name = "FILE_PATH")]
        path: PathBuf,

        /// Caption for the video
        #[arg(long, value_name = "TEXT")]
        caption: Option<String>,

        /// This video file supports streaming
        #[arg(long)]
        streaming: bool,
    },
}

impl MessageCommand {
    fn into_payload(self) -> Result<Payload, SendError> {
        Ok(match self {
            MessageCommand::Text { content } => Payload::Text {
                text: read_text(content)?,
            },
            MessageCommand::Photo { path, caption } => Payload::Photo { path, caption },
            MessageCommand::Video {
                path,
                caption,
                streaming,
            } => Payload::Video {
                path,
                caption,
                streaming,
            },
        })
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let payload = cli.command.into_payload()?;

    // The environment is read once here and the token passed down explicitly.
    let env_token = std::env::var(TOKEN_ENV).ok();
    let resolved = token::resolve_bot_token(
        cli.token.as_deref(),
        env_token.as_deref(),
        &token::token_file_candidates(),
    );
    let secrets = resolved
        .as_ref()
        .map(|(token, _)| vec![token.clone()])
        .unwrap_or_default();
    logging::init(cli.verbose, secrets);

    let (bot_token, source) = resolved?;
    tracing::debug!(?source, "Resolved bot token");

    let options = ClientOptions {
        base_url: cli.api_url,
        insecure: cli.insecure,
        connect_timeout: Duration::from_secs(cli.connect_timeout),
        timeout: Duration::from_secs(cli.timeout),
    };
    let message = Outgoing::new(cli.chat_id, payload)
        .markdown(cli.markdown)
        .silent(cli.silent);

    if let Some((path, kind)) = message.payload.upload() {
        if cli.force {
            tracing::debug!(path = %path.display(), "Skipping upload checks (--force)");
        } else {
            upload::preflight(path, kind)?;
        }
    }

    let client = TelegramClient::with_options(bot_token, &options)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("create tokio runtime")?;
    let result = runtime.block_on(client.send(&message))?;

    if let Ok(sent) = serde_json::from_value::<SentMessage>(result) {
        tracing::debug!(
            message_id = sent.message_id,
            chat = ?sent.chat.map(|chat| chat.id),
            "Telegram accepted the message"
        );
    }
    println!("Sent {} to Telegram.", message.payload.noun());
    Ok(())
}

/// One-line usage synopsis, as clap prints it for its own errors.
pub fn usage() -> String {
    Cli::command().render_usage().to_string()
}

fn read_text(content: String) -> Result<String, SendError> {
    let text = if content == STDIN_MARKER {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).map_err(|err| {
            SendError::local_file("Failed to read message text from stdin")
                .with_details(err.to_string())
        })?;
        buffer
    } else {
        content
    };

    if text.trim().is_empty() {
        return Err(SendError::usage("text must not be empty"));
    }
    Ok(text)
}
