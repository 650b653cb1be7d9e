//! # gpt2doc
//!
//! Turn text copied out of an LLM chat into a clean Word document.
//!
//! Chat output looks like Markdown but carries artefacts pandoc renders badly:
//! LaTeX `\( … \)` / `\[ … \]` math, private-use citation markers, narrow
//! no-break spaces, hand-numbered headings and `---` dividers. This crate
//! rewrites those with a fixed, ordered set of pure text rules and then runs
//! pandoc against a reference `.docx` so the result picks up your styles.
//!
//! ## Pipeline Overview
//!
//! ```text
//! text
//!  │
//!  ├─ 1. Input      file or stdin, LF line endings
//!  ├─ 2. Normalize  6 ordered rewrite rules (pure, cannot fail)
//!  ├─ 3. Write      temp .md file (removed on every exit path)
//!  ├─ 4. Convert    pandoc <tmp.md> -o <out.docx> --reference-doc=<template>
//!  └─ 5. Output     DOCX path + normalised Markdown + timings
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use gpt2doc::normalize;
//!
//! let md = normalize("## 2.3 Methods\n\nWe minimise \\(f(x)\\).");
//! assert_eq!(md, "## Methods\n\nWe minimise $f(x)$.");
//! ```
//!
//! ```rust,no_run
//! use gpt2doc::{convert, ConversionConfig, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::load()?;
//!     let config = ConversionConfig::builder().settings(&settings).build()?;
//!     let output = convert("# 1. Intro\n\nHello \\(x\\)", &config).await?;
//!     println!("wrote {}", output.output_path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `gpt2doc` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod settings;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, OUTPUT_EXTENSION};
pub use convert::{convert, convert_file, convert_sync};
pub use error::Gpt2DocError;
pub use output::{ConversionOutput, ConversionStats};
pub use pipeline::input::{resolve_input, InputSource};
pub use pipeline::normalize::{normalize, NumberingScheme};
pub use progress::{
    ConversionProgressCallback, ConversionStage, NoopProgressCallback, ProgressCallback,
};
pub use settings::Settings;
