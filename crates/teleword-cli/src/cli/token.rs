//! Bot token resolution.

use std::fs;
use std::path::{Path, PathBuf};

use teleword_bot::SendError;

pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
const TOKEN_FILE_NAME: &str = ".teleword_token";

/// Where the resolved token came from. Logged instead of the token itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    Flag,
    Env,
    File(PathBuf),
}

/// Token files checked after the flag and the environment, in order.
pub fn token_file_candidates() -> Vec<PathBuf> {
    candidates_for_home(dirs::home_dir())
}

fn candidates_for_home(home: Option<PathBuf>) -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(TOKEN_FILE_NAME)];
    if let Some(home) = home {
        candidates.push(home.join(TOKEN_FILE_NAME));
    }
    candidates
}

/// `--token` wins over `TELEGRAM_BOT_TOKEN`, which wins over token files.
/// Blank values count as absent.
///
/// # Errors
/// Returns a configuration error when no source yields a token.
pub fn resolve_bot_token(
    flag: Option<&str>,
    env: Option<&str>,
    files: &[PathBuf],
) -> Result<(String, TokenSource), SendError> {
    if let Some(token) = normalize_optional(flag) {
        return Ok((token, TokenSource::Flag));
    }

    if let Some(token) = normalize_optional(env) {
        return Ok((token, TokenSource::Env));
    }

    for path in files {
        if let Some(token) = read_token_file(path) {
            return Ok((token, TokenSource::File(path.clone())));
        }
    }

    Err(SendError::config(format!(
        "Bot API token is required (use --token, set {TOKEN_ENV}, or write it to ~/{TOKEN_FILE_NAME})"
    )))
}

fn read_token_file(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    match fs::read_to_string(path) {
        Ok(contents) => normalize_string(&contents),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Cannot read token file");
            None
        }
    }
}

fn normalize_optional(input: Option<&str>) -> Option<String> {
    input.and_then(normalize_string)
}

fn normalize_string(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
