//! Local upload files: pre-flight checks and loading.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use crate::error::{SendError, SendResult};
use crate::mime;

/// Bot API upload limit for photos.
pub const PHOTO_SIZE_LIMIT: u64 = 10 * 1024 * 1024;
/// Bot API upload limit for other files, videos included.
pub const VIDEO_SIZE_LIMIT: u64 = 50 * 1024 * 1024;

const SNIFF_LEN: usize = 8192;

/// Media family an upload is expected to belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// Multipart field name Telegram expects for the file.
    pub fn field_name(self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
        }
    }

    pub fn size_limit(self) -> u64 {
        match self {
            MediaKind::Photo => PHOTO_SIZE_LIMIT,
            MediaKind::Video => VIDEO_SIZE_LIMIT,
        }
    }

    fn mime_prefix(self) -> &'static str {
        match self {
            MediaKind::Photo => "image/",
            MediaKind::Video => "video/",
        }
    }
}

/// File contents ready for a multipart file part.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Validates an upload before any network activity: the path must be a
/// readable regular file within the size limit whose extension or magic
/// bytes match the expected media family.
///
/// # Errors
/// Returns a local file error describing the first failed check.
pub fn preflight(path: &Path, kind: MediaKind) -> SendResult<()> {
    let display = path.display();
    let metadata = fs::metadata(path).map_err(|err| {
        SendError::local_file(format!("file not found: {display}")).with_details(err.to_string())
    })?;
    if !metadata.is_file() {
        return Err(SendError::local_file(format!("not a regular file: {display}")));
    }

    let limit = kind.size_limit();
    if metadata.len() > limit {
        return Err(SendError::local_file(format!(
            "File is too big for upload ({} MB), limit is {} MB",
            metadata.len() / (1024 * 1024),
            limit / (1024 * 1024)
        )));
    }

    let mut head = Vec::with_capacity(SNIFF_LEN);
    File::open(path)
        .and_then(|file| file.take(SNIFF_LEN as u64).read_to_end(&mut head))
        .map_err(|err| {
            SendError::local_file(format!("cannot read file: {display}"))
                .with_details(err.to_string())
        })?;

    let by_extension = mime::mime_type_for_extension(path);
    let by_content = mime::sniff_mime(&head);
    let prefix = kind.mime_prefix();
    let matches = [by_extension, by_content]
        .iter()
        .flatten()
        .any(|mime| mime.starts_with(prefix));
    if !matches {
        let found = by_extension.or(by_content).unwrap_or("unknown");
        return Err(SendError::local_file(format!(
            "File should be a {} (expected {}*), found '{}'; use --force to send anyway",
            kind.field_name(),
            prefix,
            found
        )));
    }

    tracing::debug!(
        path = %path.display(),
        size = metadata.len(),
        extension_mime = by_extension.unwrap_or("-"),
        content_mime = by_content.unwrap_or("-"),
        "upload passed pre-flight checks"
    );
    Ok(())
}

/// Reads the whole file into memory.
///
/// # Errors
/// Returns a local file error if the file cannot be read.
pub fn load(path: &Path) -> SendResult<LoadedFile> {
    let bytes = fs::read(path).map_err(|err| {
        SendError::local_file(format!("cannot read file: {}", path.display()))
            .with_details(err.to_string())
    })?;
    let filename = mime::file_name_from_path(path).unwrap_or_else(|| "upload".to_string());
    Ok(LoadedFile {
        filename,
        content_type: mime::content_type_for_path(path),
        bytes,
    })
}
