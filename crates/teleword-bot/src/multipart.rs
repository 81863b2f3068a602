//! `multipart/form-data` encoding.
//!
//! Parts are written in insertion order. The boundary is a random token that is
//! checked against every part before use: a candidate that occurs anywhere in a
//! field value, a header, or raw file bytes is discarded and another one drawn.

use uuid::Uuid;

use crate::error::{SendError, SendResult};

const BOUNDARY_PREFIX: &str = "teleword-";
const MAX_BOUNDARY_ATTEMPTS: usize = 16;
const CRLF: &[u8] = b"\r\n";

/// One form part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Field {
        name: String,
        value: String,
    },
    File {
        name: String,
        filename: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

impl Part {
    fn name(&self) -> &str {
        match self {
            Part::Field { name, .. } | Part::File { name, .. } => name,
        }
    }

    fn contains(&self, needle: &[u8]) -> bool {
        let in_name = contains_bytes(self.name().as_bytes(), needle);
        match self {
            Part::Field { value, .. } => in_name || contains_bytes(value.as_bytes(), needle),
            Part::File {
                filename,
                content_type,
                bytes,
                ..
            } => {
                in_name
                    || contains_bytes(filename.as_bytes(), needle)
                    || contains_bytes(content_type.as_bytes(), needle)
                    || contains_bytes(bytes, needle)
            }
        }
    }
}

/// Encoded body plus the boundary it was framed with.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the `Content-Type` request header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Ordered collection of form parts.
#[derive(Debug, Clone, Default)]
pub struct MultipartBuilder {
    parts: Vec<Part>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part::Field {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(Part::File {
            name: name.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        });
        self
    }

    /// Encodes the parts with a fresh random boundary.
    ///
    /// # Errors
    /// Returns an error if no collision-free boundary was found.
    pub fn build(&self) -> SendResult<MultipartBody> {
        self.build_with(random_boundary)
    }

    /// Encodes the parts, drawing boundary candidates from `next_boundary`
    /// until one does not occur in any part.
    ///
    /// # Errors
    /// Returns an error if every candidate collided.
    pub fn build_with(
        &self,
        mut next_boundary: impl FnMut() -> String,
    ) -> SendResult<MultipartBody> {
        for _ in 0..MAX_BOUNDARY_ATTEMPTS {
            let boundary = next_boundary();
            if boundary.is_empty() {
                continue;
            }
            if self.parts.iter().any(|part| part.contains(boundary.as_bytes())) {
                tracing::debug!(%boundary, "multipart boundary collides with payload, redrawing");
                continue;
            }
            let bytes = self.encode(&boundary);
            return Ok(MultipartBody { boundary, bytes });
        }
        Err(SendError::local_file(
            "Could not pick a multipart boundary absent from the upload",
        ))
    }

    fn encode(&self, boundary: &str) -> Vec<u8> {
        let payload_len: usize = self
            .parts
            .iter()
            .map(|part| match part {
                Part::Field { value, .. } => value.len(),
                Part::File { bytes, .. } => bytes.len(),
            })
            .sum();
        let mut body = Vec::with_capacity(payload_len + self.parts.len() * 128 + 64);

        for part in &self.parts {
            body.extend_from_slice(b"--");
            body.extend_from_slice(boundary.as_bytes());
            body.extend_from_slice(CRLF);
            match part {
                Part::Field { name, value } => {
                    let disposition = format!(
                        "Content-Disposition: form-data; name=\"{}\"",
                        escape_quoted(name)
                    );
                    body.extend_from_slice(disposition.as_bytes());
                    body.extend_from_slice(CRLF);
                    body.extend_from_slice(CRLF);
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File {
                    name,
                    filename,
                    content_type,
                    bytes,
                } => {
                    let disposition = format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"",
                        escape_quoted(name),
                        escape_quoted(filename)
                    );
                    body.extend_from_slice(disposition.as_bytes());
                    body.extend_from_slice(CRLF);
                    body.extend_from_slice(format!("Content-Type: {content_type}").as_bytes());
                    body.extend_from_slice(CRLF);
                    body.extend_from_slice(CRLF);
                    body.extend_from_slice(bytes);
                }
            }
            body.extend_from_slice(CRLF);
        }

        body.extend_from_slice(b"--");
        body.extend_from_slice(boundary.as_bytes());
        body.extend_from_slice(b"--");
        body.extend_from_slice(CRLF);
        body
    }
}

/// `teleword-` followed by 32 random hex digits.
pub fn random_boundary() -> String {
    format!("{BOUNDARY_PREFIX}{}", Uuid::new_v4().simple())
}

// Quoted header parameters percent-encode `"`, CR and LF, as browsers do.
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() || haystack.len() < needle.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(boundary: &'static str) -> impl FnMut() -> String {
        move || boundary.to_string()
    }

    #[test]
    fn encodes_fields_then_file_in_order() {
        let body = MultipartBuilder::new()
            .text("chat_id", "42")
            .text("caption", "hi")
            .file("photo", "cat.png", "image/png", b"PNGDATA".to_vec())
            .build_with(fixed("XYZ"))
            .unwrap();

        let expected = concat!(
            "--XYZ\r\n",
            "Content-Disposition: form-data; name=\"chat_id\"\r\n",
            "\r\n",
            "42\r\n",
            "--XYZ\r\n",
            "Content-Disposition: form-data; name=\"caption\"\r\n",
            "\r\n",
            "hi\r\n",
            "--XYZ\r\n",
            "Content-Disposition: form-data; name=\"photo\"; filename=\"cat.png\"\r\n",
            "Content-Type: image/png\r\n",
            "\r\n",
            "PNGDATA\r\n",
            "--XYZ--\r\n",
        );
        assert_eq!(body.as_bytes(), expected.as_bytes());
        assert_eq!(body.content_type(), "multipart/form-data; boundary=XYZ");
    }

    #[test]
    fn colliding_boundary_is_redrawn() {
        let mut candidates = vec!["FRESH".to_string(), "EVIL".to_string()];
        let body = MultipartBuilder::new()
            .text("chat_id", "42")
            .file("video", "clip.mp4", "video/mp4", b"...EVIL...".to_vec())
            .build_with(move || candidates.pop().unwrap_or_default())
            .unwrap();
        assert_eq!(body.boundary(), "FRESH");
    }

    #[test]
    fn collision_in_field_value_is_detected() {
        let mut candidates = vec!["SAFE".to_string(), "caption-marker".to_string()];
        let body = MultipartBuilder::new()
            .text("caption", "this caption-marker is text")
            .build_with(move || candidates.pop().unwrap_or_default())
            .unwrap();
        assert_eq!(body.boundary(), "SAFE");
    }

    #[test]
    fn gives_up_when_every_candidate_collides() {
        let err = MultipartBuilder::new()
            .file("photo", "a.jpg", "image/jpeg", b"AAAA".to_vec())
            .build_with(fixed("AA"))
            .unwrap_err();
        assert_eq!(err.kind, crate::error::SendErrorKind::LocalFile);
    }

    #[test]
    fn random_boundary_never_appears_in_payload() {
        let mut noisy = Vec::new();
        for round in 0..64u32 {
            noisy.extend_from_slice(random_boundary().as_bytes());
            noisy.extend_from_slice(&round.to_le_bytes());
        }
        let builder = MultipartBuilder::new()
            .text("chat_id", "@channel")
            .text("caption", BOUNDARY_PREFIX)
            .file("video", "teleword-.mp4", "video/mp4", noisy.clone());

        for _ in 0..32 {
            let body = builder.build().unwrap();
            let needle = body.boundary().as_bytes();
            assert!(body.boundary().starts_with(BOUNDARY_PREFIX));
            assert_eq!(body.boundary().len(), BOUNDARY_PREFIX.len() + 32);
            assert!(!contains_bytes(&noisy, needle));
            assert!(!contains_bytes(BOUNDARY_PREFIX.as_bytes(), needle));
        }
    }

    #[test]
    fn quotes_and_newlines_in_names_are_escaped() {
        let body = MultipartBuilder::new()
            .file("photo", "we\"ird\r\nname.jpg", "image/jpeg", Vec::new())
            .build_with(fixed("B"))
            .unwrap();
        let text = String::from_utf8(body.into_bytes()).unwrap();
        assert!(text.contains("filename=\"we%22ird%0D%0Aname.jpg\""));
    }

    #[test]
    fn binary_content_is_copied_verbatim() {
        let bytes: Vec<u8> = (0..=255).collect();
        let body = MultipartBuilder::new()
            .file("photo", "raw.bin", "application/octet-stream", bytes.clone())
            .build()
            .unwrap();
        assert!(contains_bytes(body.as_bytes(), &bytes));
        assert!(body.as_bytes().ends_with(format!("--{}--\r\n", body.boundary()).as_bytes()));
    }
}
