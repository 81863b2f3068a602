//! Stderr logging with secret redaction.

use std::io::{self, Write};
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

const REDACTED: &str = "<REDACTED>";

/// Installs the global subscriber. `RUST_LOG` overrides the level chosen by
/// `--verbose`. Every secret is masked in the output.
pub fn init(verbose: bool, secrets: Vec<String>) {
    let default_filter = if verbose {
        "warn,teleword=debug,teleword_bot=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A second init (tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(Redacting::new(io::stderr, secrets))
        .try_init();
}

#[derive(Debug, Clone)]
pub struct Redactor {
    secrets: Arc<[String]>,
}

impl Redactor {
    pub fn new(secrets: Vec<String>) -> Self {
        let secrets: Vec<String> = secrets
            .into_iter()
            .filter(|secret| !secret.is_empty())
            .collect();
        Self {
            secrets: secrets.into(),
        }
    }

    pub fn redact(&self, text: &str) -> String {
        self.secrets
            .iter()
            .fold(text.to_string(), |acc, secret| acc.replace(secret.as_str(), REDACTED))
    }
}

/// [`MakeWriter`] wrapper that masks secrets before they reach `M`'s writer.
pub struct Redacting<M> {
    make_inner: M,
    redactor: Redactor,
}

impl<M> Redacting<M> {
    pub fn new(make_inner: M, secrets: Vec<String>) -> Self {
        Self {
            make_inner,
            redactor: Redactor::new(secrets),
        }
    }
}

impl<'a, M: MakeWriter<'a>> MakeWriter<'a> for Redacting<M> {
    type Writer = RedactingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: self.make_inner.make_writer(),
            redactor: self.redactor.clone(),
        }
    }
}

// The fmt layer hands over each formatted event in a single write, so a
// secret never straddles two calls.
pub struct RedactingWriter<W> {
    inner: W,
    redactor: Redactor,
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        self.inner.write_all(self.redactor.redact(&text).as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
