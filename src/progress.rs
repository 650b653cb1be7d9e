//! Progress-callback trait for conversion stage events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as [`crate::convert::convert`] moves through its four stages.
//!
//! # Example
//!
//! ```rust
//! use gpt2doc::{ConversionConfig, ConversionProgressCallback, ConversionStage};
//! use std::sync::Arc;
//!
//! struct StderrProgress;
//!
//! impl ConversionProgressCallback for StderrProgress {
//!     fn on_stage_start(&self, stage: ConversionStage) {
//!         eprintln!("[{}/{}] {}", stage.index(), ConversionStage::ALL.len(), stage);
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(StderrProgress) as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// The steps of a single conversion, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionStage {
    /// Running the normaliser over the input text.
    Normalize,
    /// Preparing the output directory and writing the temp Markdown file.
    WriteMarkdown,
    /// Running the external converter.
    RunConverter,
    /// Removing the temp Markdown file.
    Cleanup,
}

impl ConversionStage {
    pub const ALL: [ConversionStage; 4] = [
        ConversionStage::Normalize,
        ConversionStage::WriteMarkdown,
        ConversionStage::RunConverter,
        ConversionStage::Cleanup,
    ];

    /// 1-indexed position in [`Self::ALL`].
    pub fn index(self) -> usize {
        match self {
            ConversionStage::Normalize => 1,
            ConversionStage::WriteMarkdown => 2,
            ConversionStage::RunConverter => 3,
            ConversionStage::Cleanup => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConversionStage::Normalize => "Normalising text",
            ConversionStage::WriteMarkdown => "Writing temporary Markdown",
            ConversionStage::RunConverter => "Running converter",
            ConversionStage::Cleanup => "Removing temporary file",
        }
    }
}

impl fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Called by the conversion driver as it moves through each stage.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync`.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first stage.
    ///
    /// # Arguments
    /// * `total_stages` — number of stages that will run
    fn on_conversion_start(&self, total_stages: usize) {
        let _ = total_stages;
    }

    /// Called when a stage begins.
    fn on_stage_start(&self, stage: ConversionStage) {
        let _ = stage;
    }

    /// Called when a stage finishes without error.
    fn on_stage_complete(&self, stage: ConversionStage) {
        let _ = stage;
    }

    /// Called when a stage fails. No further events follow.
    ///
    /// # Arguments
    /// * `stage` — the stage that failed
    /// * `error` — human-readable error description, including any
    ///   converter diagnostics
    fn on_conversion_error(&self, stage: ConversionStage, error: &str) {
        let _ = (stage, error);
    }

    /// Called once after the output document has been written.
    fn on_conversion_complete(&self, output_path: &Path) {
        let _ = output_path;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCallback {
        events: Mutex<Vec<String>>,
    }

    impl ConversionProgressCallback for RecordingCallback {
        fn on_stage_start(&self, stage: ConversionStage) {
            self.events.lock().unwrap().push(format!("start {}", stage.index()));
        }

        fn on_conversion_error(&self, stage: ConversionStage, error: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("error {} {error}", stage.index()));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(4);
        cb.on_stage_start(ConversionStage::Normalize);
        cb.on_stage_complete(ConversionStage::Normalize);
        cb.on_conversion_error(ConversionStage::RunConverter, "boom");
        cb.on_conversion_complete(Path::new("out.docx"));
    }

    #[test]
    fn stage_indices_follow_order() {
        for (i, stage) in ConversionStage::ALL.iter().enumerate() {
            assert_eq!(stage.index(), i + 1);
        }
    }

    #[test]
    fn arc_dyn_callback_records_events() {
        let recorder = Arc::new(RecordingCallback::default());
        let cb: ProgressCallback = recorder.clone();
        cb.on_stage_start(ConversionStage::Normalize);
        cb.on_stage_complete(ConversionStage::Normalize);
        cb.on_stage_start(ConversionStage::WriteMarkdown);
        cb.on_conversion_error(ConversionStage::WriteMarkdown, "disk full");

        let events = recorder.events.lock().unwrap();
        assert_eq!(*events, vec!["start 1", "start 2", "error 2 disk full"]);
    }
}
