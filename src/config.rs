//! Configuration types for text-to-DOCX conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The record is passed explicitly into
//! [`crate::convert::convert`]; persisted preferences live in
//! [`crate::settings::Settings`] and are copied in with
//! [`ConversionConfigBuilder::settings`], never read behind the caller's back.

use crate::error::Gpt2DocError;
use crate::pipeline::pandoc::DEFAULT_CONVERTER;
use crate::progress::ProgressCallback;
use crate::settings::Settings;
use std::fmt;
use std::path::PathBuf;

/// Extension of the converted document.
pub const OUTPUT_EXTENSION: &str = "docx";

/// Configuration for one conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use gpt2doc::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .template_file("templates/report.docx")
///     .output_dir("out")
///     .filename_base("weekly")
///     .build()
///     .unwrap();
/// assert!(config.target_path().ends_with("weekly.docx"));
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Reference document passed to the converter as `--reference-doc`.
    pub template_file: PathBuf,

    /// Directory the converted document is written to.
    pub output_dir: PathBuf,

    /// Output file name without extension. Default: `output`.
    pub filename_base: String,

    /// Converter executable, looked up on `PATH` unless it is a path. Default: `pandoc`.
    pub converter: String,

    /// Create `output_dir` when it does not exist yet. Default: true.
    pub create_output_dir: bool,

    /// Optional stage-event sink.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            template_file: settings.template_file,
            output_dir: settings.output_dir,
            filename_base: settings.filename_base,
            converter: DEFAULT_CONVERTER.to_string(),
            create_output_dir: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("template_file", &self.template_file)
            .field("output_dir", &self.output_dir)
            .field("filename_base", &self.filename_base)
            .field("converter", &self.converter)
            .field("create_output_dir", &self.create_output_dir)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// `<output_dir>/<filename_base>.docx`
    pub fn target_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.filename_base, OUTPUT_EXTENSION))
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    /// Copy the three persisted options in.
    pub fn settings(mut self, settings: &Settings) -> Self {
        self.config.template_file = settings.template_file.clone();
        self.config.output_dir = settings.output_dir.clone();
        self.config.filename_base = settings.filename_base.clone();
        self
    }

    pub fn template_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.template_file = path.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn filename_base(mut self, name: impl Into<String>) -> Self {
        self.config.filename_base = name.into();
        self
    }

    pub fn converter(mut self, program: impl Into<String>) -> Self {
        self.config.converter = program.into();
        self
    }

    pub fn create_output_dir(mut self, v: bool) -> Self {
        self.config.create_output_dir = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Gpt2DocError> {
        let c = &self.config;
        let name = c.filename_base.trim();
        if name.is_empty() {
            return Err(Gpt2DocError::InvalidConfig(
                "Output file name must not be empty".into(),
            ));
        }
        if name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(Gpt2DocError::InvalidConfig(format!(
                "Output file name '{}' must be a plain name, not a path; use the output directory for the location",
                c.filename_base
            )));
        }
        if c.converter.trim().is_empty() {
            return Err(Gpt2DocError::InvalidConfig(
                "Converter program must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
