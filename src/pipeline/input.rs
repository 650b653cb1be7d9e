//! Input resolution: turn a user-supplied source into document text.
//!
//! The text arrives the way an editor surface would hand it over: decoded as
//! UTF-8 and with `\n` line endings only. Files are opened read-only; nothing
//! here ever writes back to the source.

use crate::error::Gpt2DocError;
use std::fmt;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Where the document text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Read everything from standard input.
    Stdin,
    /// Read a local text/Markdown file.
    File(PathBuf),
}

impl InputSource {
    /// `-` means stdin; anything else is a file path.
    pub fn parse(input: &str) -> Self {
        if input == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(PathBuf::from(input))
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Stdin => f.write_str("<stdin>"),
            InputSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Read the source to a string with normalised line endings.
pub async fn resolve_input(source: &InputSource) -> Result<String, Gpt2DocError> {
    let bytes = match source {
        InputSource::Stdin => {
            let mut buf = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buf)
                .await
                .map_err(|e| Gpt2DocError::InputRead {
                    source_name: source.to_string(),
                    source: e,
                })?;
            buf
        }
        InputSource::File(path) => match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Gpt2DocError::InputNotFound { path: path.clone() });
            }
            Err(e) => {
                return Err(Gpt2DocError::InputRead {
                    source_name: source.to_string(),
                    source: e,
                });
            }
        },
    };

    let text = String::from_utf8(bytes).map_err(|e| Gpt2DocError::InputNotUtf8 {
        source_name: source.to_string(),
        valid_up_to: e.utf8_error().valid_up_to(),
    })?;
    let text = strip_bom(&text);
    debug!("Read {} bytes from {}", text.len(), source);
    Ok(normalise_line_endings(text))
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{FEFF}').unwrap_or(text)
}

/// CRLF and lone CR → LF.
pub fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}
