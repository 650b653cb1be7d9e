//! Error type for the gpt2doc library.
//!
//! The normaliser itself never fails; every variant here comes from the
//! boundary around it: reading input, loading settings, preparing the output
//! location, or running the external converter. None of them touch the
//! caller's input text, so the user can fix the cause (pick a template, point
//! at a real directory) and retry with the same document.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the gpt2doc library.
#[derive(Debug, Error)]
pub enum Gpt2DocError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// Input could not be read.
    #[error("Failed to read input from {source_name}: {source}")]
    InputRead {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    /// Input bytes are not UTF-8.
    #[error("Input from {source_name} is not valid UTF-8 (first bad byte at offset {valid_up_to})")]
    InputNotUtf8 {
        source_name: String,
        valid_up_to: usize,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The reference/template document does not exist.
    #[error("Template document not found: '{path}'\nChoose one with --template <FILE.docx> (add --save-settings to remember it).")]
    TemplateNotFound { path: PathBuf },

    /// The output directory is missing and could not be created.
    #[error("Output directory '{path}' is not usable: {source}")]
    OutputDirUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Creating or writing the temporary Markdown file failed.
    #[error("Failed to write temporary Markdown file: {0}")]
    TempFileFailed(#[source] std::io::Error),

    // ── Converter errors ──────────────────────────────────────────────────
    /// The converter executable is not on PATH.
    #[error("Converter '{program}' was not found.\nInstall pandoc (https://pandoc.org/installing.html) or pass --converter <PATH>.")]
    ConverterNotFound { program: String },

    /// The converter exists but could not be started.
    #[error("Failed to start converter '{program}': {source}")]
    ConverterLaunchFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The converter ran and exited with a failure status.
    #[error("{program} exited with {}:\n{diagnostics}", exit_label(.status))]
    ConversionFailed {
        program: String,
        status: Option<i32>,
        diagnostics: String,
    },

    // ── Settings errors ───────────────────────────────────────────────────
    /// No platform configuration directory could be determined.
    #[error("Could not determine a configuration directory; set GPT2DOC_CONFIG_DIR")]
    NoConfigDir,

    /// The settings file exists but could not be read.
    #[error("Failed to read settings from '{path}': {source}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON for [`crate::settings::Settings`].
    #[error("Settings file '{path}' is malformed: {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The settings file could not be written.
    #[error("Failed to save settings to '{path}': {source}")]
    SettingsWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_failed_display() {
        let e = Gpt2DocError::ConversionFailed {
            program: "pandoc".into(),
            status: Some(64),
            diagnostics: "Could not find reference doc tpl.docx".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("status 64"), "got: {msg}");
        assert!(msg.contains("Could not find reference doc"), "got: {msg}");
    }

    #[test]
    fn conversion_failed_by_signal_display() {
        let e = Gpt2DocError::ConversionFailed {
            program: "pandoc".into(),
            status: None,
            diagnostics: String::new(),
        };
        assert!(e.to_string().contains("signal"));
    }

    #[test]
    fn template_not_found_display() {
        let e = Gpt2DocError::TemplateNotFound {
            path: PathBuf::from("/nope/Temple.docx"),
        };
        let msg = e.to_string();
        assert!(msg.contains("/nope/Temple.docx"));
        assert!(msg.contains("--template"));
    }

    #[test]
    fn converter_not_found_display() {
        let e = Gpt2DocError::ConverterNotFound {
            program: "pandoc".into(),
        };
        assert!(e.to_string().contains("pandoc"));
    }
}
