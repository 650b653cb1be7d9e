//! Converter step: hand the normalised Markdown to pandoc.
//!
//! pandoc only reads from files when a reference document is involved, so the
//! Markdown is written to a [`tempfile::NamedTempFile`] first. The handle owns
//! the file: it is deleted when dropped, on the success path and on every
//! error path alike.

use crate::error::Gpt2DocError;
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Converter invoked when none is configured.
pub const DEFAULT_CONVERTER: &str = "pandoc";

/// Captured output of a converter run that exited successfully.
#[derive(Debug, Clone, Default)]
pub struct ConverterOutput {
    pub stdout: String,
    /// pandoc reports non-fatal warnings (missing fonts, unknown styles) here.
    pub stderr: String,
}

/// Write `markdown` as UTF-8 to a fresh `*.md` temp file.
pub fn write_temp_markdown(markdown: &str) -> Result<NamedTempFile, Gpt2DocError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("gpt2doc-")
        .suffix(".md")
        .tempfile()
        .map_err(Gpt2DocError::TempFileFailed)?;
    tmp.write_all(markdown.as_bytes())
        .and_then(|_| tmp.flush())
        .map_err(Gpt2DocError::TempFileFailed)?;
    debug!(
        "Wrote {} bytes of Markdown to {}",
        markdown.len(),
        tmp.path().display()
    );
    Ok(tmp)
}

/// Arguments passed to the converter: `<input> -o <output> --reference-doc=<template>`.
pub fn converter_args(input: &Path, output: &Path, template: &Path) -> Vec<OsString> {
    let mut reference_doc = OsString::from("--reference-doc=");
    reference_doc.push(template.as_os_str());
    vec![
        input.as_os_str().to_owned(),
        OsString::from("-o"),
        output.as_os_str().to_owned(),
        reference_doc,
    ]
}

/// Run `program` on `input`, producing `output` styled after `template`.
///
/// A non-zero exit becomes [`Gpt2DocError::ConversionFailed`] carrying the
/// converter's own diagnostics so the caller can show them verbatim.
pub async fn run_converter(
    program: &str,
    input: &Path,
    output: &Path,
    template: &Path,
) -> Result<ConverterOutput, Gpt2DocError> {
    let args = converter_args(input, output, template);
    debug!("Running {} {:?}", program, args);

    let out = tokio::process::Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Gpt2DocError::ConverterNotFound {
                    program: program.to_string(),
                }
            } else {
                Gpt2DocError::ConverterLaunchFailed {
                    program: program.to_string(),
                    source: e,
                }
            }
        })?;

    let stdout = String::from_utf8_lossy(&out.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();

    if !out.status.success() {
        let diagnostics = if stderr.is_empty() { stdout } else { stderr };
        return Err(Gpt2DocError::ConversionFailed {
            program: program.to_string(),
            status: out.status.code(),
            diagnostics,
        });
    }

    if !stderr.is_empty() {
        warn!("{} reported: {}", program, stderr);
    }
    Ok(ConverterOutput { stdout, stderr })
}
