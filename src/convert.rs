//! Conversion entry points: normalise text, then turn it into a DOCX.
//!
//! The driver walks the four [`ConversionStage`]s in order and reports each one
//! to the configured progress callback. The caller's text is only ever read;
//! on any failure it is still intact for another attempt.

use crate::config::ConversionConfig;
use crate::error::Gpt2DocError;
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::input::{self, InputSource};
use crate::pipeline::{normalize, pandoc};
use crate::progress::{ConversionProgressCallback, ConversionStage};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Normalise `text` and convert it to a DOCX at [`ConversionConfig::target_path`].
///
/// # Errors
/// - [`Gpt2DocError::OutputDirUnavailable`] when the output directory cannot be used
/// - [`Gpt2DocError::TempFileFailed`] when the temp Markdown file cannot be written
/// - [`Gpt2DocError::TemplateNotFound`] when the reference document is missing
/// - converter errors ([`Gpt2DocError::ConverterNotFound`],
///   [`Gpt2DocError::ConversionFailed`], …) with the converter's diagnostics
pub async fn convert(
    text: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Gpt2DocError> {
    let total_start = Instant::now();
    let text = text.as_ref();
    let target = config.target_path();
    info!("Starting conversion → {}", target.display());
    notify(config, |cb| cb.on_conversion_start(ConversionStage::ALL.len()));

    // ── Stage 1: Normalise ───────────────────────────────────────────────
    stage_start(config, ConversionStage::Normalize);
    let normalize_start = Instant::now();
    let markdown = normalize::normalize(text);
    let normalize_duration_ms = normalize_start.elapsed().as_millis() as u64;
    debug!(
        "Normalised {} → {} bytes in {}ms",
        text.len(),
        markdown.len(),
        normalize_duration_ms
    );
    stage_complete(config, ConversionStage::Normalize);

    // ── Stage 2: Output dir + temp Markdown ──────────────────────────────
    stage_start(config, ConversionStage::WriteMarkdown);
    prepare_output_dir(config)
        .await
        .map_err(|e| fail(config, ConversionStage::WriteMarkdown, e))?;
    let temp_md = pandoc::write_temp_markdown(&markdown)
        .map_err(|e| fail(config, ConversionStage::WriteMarkdown, e))?;
    stage_complete(config, ConversionStage::WriteMarkdown);

    // ── Stage 3: Run converter ───────────────────────────────────────────
    stage_start(config, ConversionStage::RunConverter);
    let convert_start = Instant::now();
    ensure_template(&config.template_file)
        .await
        .map_err(|e| fail(config, ConversionStage::RunConverter, e))?;
    let converted = pandoc::run_converter(
        &config.converter,
        temp_md.path(),
        &target,
        &config.template_file,
    )
    .await
    .map_err(|e| fail(config, ConversionStage::RunConverter, e))?;
    let convert_duration_ms = convert_start.elapsed().as_millis() as u64;
    stage_complete(config, ConversionStage::RunConverter);

    // ── Stage 4: Cleanup ─────────────────────────────────────────────────
    stage_start(config, ConversionStage::Cleanup);
    temp_md
        .close()
        .map_err(|e| fail(config, ConversionStage::Cleanup, Gpt2DocError::TempFileFailed(e)))?;
    stage_complete(config, ConversionStage::Cleanup);

    let stats = ConversionStats {
        input_chars: text.chars().count(),
        output_chars: markdown.chars().count(),
        normalize_duration_ms,
        convert_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} in {}ms",
        target.display(),
        stats.total_duration_ms
    );
    notify(config, |cb| cb.on_conversion_complete(&target));

    Ok(ConversionOutput {
        markdown,
        output_path: target,
        converter_warnings: Some(converted.stderr).filter(|s| !s.is_empty()),
        stats,
    })
}

/// Read `source` and convert it. The source file is never modified.
pub async fn convert_file(
    source: &InputSource,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Gpt2DocError> {
    let text = input::resolve_input(source).await?;
    convert(text, config).await
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    text: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Gpt2DocError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Gpt2DocError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(text, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn prepare_output_dir(config: &ConversionConfig) -> Result<(), Gpt2DocError> {
    let dir = &config.output_dir;
    let result = if config.create_output_dir {
        tokio::fs::create_dir_all(dir).await
    } else {
        match tokio::fs::metadata(dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(std::io::Error::other("not a directory")),
            Err(e) => Err(e),
        }
    };
    result.map_err(|e| Gpt2DocError::OutputDirUnavailable {
        path: dir.clone(),
        source: e,
    })
}

async fn ensure_template(path: &Path) -> Result<(), Gpt2DocError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(Gpt2DocError::TemplateNotFound {
            path: path.to_path_buf(),
        }),
    }
}

fn notify(config: &ConversionConfig, event: impl FnOnce(&dyn ConversionProgressCallback)) {
    if let Some(ref cb) = config.progress_callback {
        event(cb.as_ref());
    }
}

fn stage_start(config: &ConversionConfig, stage: ConversionStage) {
    debug!("Stage {}/{}: {}", stage.index(), ConversionStage::ALL.len(), stage);
    notify(config, |cb| cb.on_stage_start(stage));
}

fn stage_complete(config: &ConversionConfig, stage: ConversionStage) {
    notify(config, |cb| cb.on_stage_complete(stage));
}

/// Report `err` against `stage` and hand it back for `?`.
fn fail(config: &ConversionConfig, stage: ConversionStage, err: Gpt2DocError) -> Gpt2DocError {
    notify(config, |cb| cb.on_conversion_error(stage, &err.to_string()));
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_template_fails_in_converter_stage() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConversionConfig::builder()
            .template_file(dir.path().join("missing.docx"))
            .output_dir(dir.path())
            .build()
            .unwrap();
        let err = convert("# 1. Title", &config).await.unwrap_err();
        assert!(matches!(err, Gpt2DocError::TemplateNotFound { .. }));
    }

    #[tokio::test]
    async fn output_dir_created_on_demand() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a").join("b");
        let config = ConversionConfig::builder()
            .template_file(dir.path().join("missing.docx"))
            .output_dir(&out)
            .build()
            .unwrap();
        // Fails later on the template, but the directory is already there.
        let _ = convert("text", &config).await;
        assert!(out.is_dir());
    }

    #[tokio::test]
    async fn missing_output_dir_rejected_when_not_creating() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConversionConfig::builder()
            .output_dir(dir.path().join("absent"))
            .create_output_dir(false)
            .build()
            .unwrap();
        let err = convert("text", &config).await.unwrap_err();
        assert!(matches!(err, Gpt2DocError::OutputDirUnavailable { .. }));
    }
}
