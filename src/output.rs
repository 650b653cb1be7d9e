//! Result types returned by [`crate::convert::convert`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything a successful conversion produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The normalised Markdown that was handed to the converter.
    pub markdown: String,
    /// Where the converted document was written.
    pub output_path: PathBuf,
    /// Non-fatal converter warnings, if it printed any.
    pub converter_warnings: Option<String>,
    pub stats: ConversionStats,
}

/// Sizes and timings for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Characters in the input text.
    pub input_chars: usize,
    /// Characters in the normalised Markdown.
    pub output_chars: usize,
    pub normalize_duration_ms: u64,
    pub convert_duration_ms: u64,
    pub total_duration_ms: u64,
}

impl ConversionStats {
    /// Characters removed by the normaliser.
    pub fn removed_chars(&self) -> usize {
        self.input_chars.saturating_sub(self.output_chars)
    }
}
