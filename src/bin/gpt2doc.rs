//! CLI binary for gpt2doc.
//!
//! A thin shim over the library crate that merges CLI flags with the saved
//! settings, maps them to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use gpt2doc::pipeline::normalize::normalize;
use gpt2doc::settings::{self, Settings};
use gpt2doc::{
    convert, resolve_input, ConversionConfig, ConversionProgressCallback, ConversionStage,
    InputSource, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar with a step per conversion stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(ConversionStage::ALL.len() as u64);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:24.green/238}] {pos}/{len}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.set_message("Starting…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: ConversionStage) {
        self.bar.set_message(format!("{stage}…"));
    }

    fn on_stage_complete(&self, _stage: ConversionStage) {
        self.bar.inc(1);
    }

    fn on_conversion_error(&self, stage: ConversionStage, _error: &str) {
        // The error itself is printed once by main via anyhow.
        self.bar.abandon_with_message(red(&format!("{stage} failed")));
    }

    fn on_conversion_complete(&self, _output_path: &Path) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r####"EXAMPLES:
  # Convert a file using the saved template/output settings
  gpt2doc answer.md

  # Paste from the clipboard (macOS / Wayland / X11)
  pbpaste | gpt2doc -
  wl-paste | gpt2doc -
  xclip -o -selection clipboard | gpt2doc -

  # Pick template, output directory and name for this run only
  gpt2doc answer.md --template ~/Templates/report.docx --output-dir ~/Documents --name weekly

  # ...and remember them for next time
  gpt2doc --template ~/Templates/report.docx --output-dir ~/Documents --save-settings

  # Only clean the text, print Markdown, skip pandoc
  gpt2doc --markdown-only answer.md > clean.md

WHAT GETS CLEANED (in this order):
  1. Narrow no-break spaces (U+202F)
  2. Citation markers U+E200 … U+E201 (with their content), stray U+E202
  3. Trailing spaces; blank-line runs capped at one blank line
  4. \( x \) → $x$   and   \[ x \] → $$x$$
  5. Heading numbers: "## 2.3 Methods" → "## Methods", "### 三、结论" → "### 结论"
  6. Lines consisting only of --- (three or more hyphens)

ENVIRONMENT VARIABLES:
  GPT2DOC_CONVERTER     Converter executable (default: pandoc)
  GPT2DOC_CONFIG_DIR    Directory holding settings.json
  RUST_LOG              Log filter, e.g. RUST_LOG=gpt2doc=trace
"####;

/// Convert LLM chat output to a Word document via pandoc.
#[derive(Parser, Debug)]
#[command(
    name = "gpt2doc",
    version,
    about = "Clean up LLM-generated Markdown and convert it to DOCX with pandoc",
    long_about = "Clean up text copied from an LLM chat (LaTeX math delimiters, citation markers, \
numbered headings, separator lines) and convert it to a Word document using pandoc and a \
reference .docx template.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input text file, or '-' to read from stdin (the default).
    input: Option<String>,

    /// Reference .docx whose styles the output uses.
    #[arg(short, long, env = "GPT2DOC_TEMPLATE")]
    template: Option<PathBuf>,

    /// Directory to write the .docx into.
    #[arg(short = 'd', long, env = "GPT2DOC_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Output file name without the .docx extension.
    #[arg(short, long, env = "GPT2DOC_NAME")]
    name: Option<String>,

    /// Converter executable.
    #[arg(long, env = "GPT2DOC_CONVERTER", default_value = "pandoc")]
    converter: String,

    /// Print the cleaned Markdown to stdout instead of converting.
    #[arg(short, long)]
    markdown_only: bool,

    /// Persist --template / --output-dir / --name as the new defaults.
    #[arg(long)]
    save_settings: bool,

    /// Print the effective settings and where they are stored.
    #[arg(long)]
    show_settings: bool,

    /// Output structured JSON instead of human-readable text.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "GPT2DOC_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "GPT2DOC_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "GPT2DOC_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.markdown_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Settings: saved values, overridden by flags ──────────────────────
    let mut settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            if !cli.quiet {
                eprintln!("{} {}", red("⚠"), dim(&format!("Ignoring saved settings: {e}")));
            }
            Settings::default()
        }
    };
    apply_overrides(&mut settings, &cli);

    if cli.save_settings {
        ConversionConfig::builder()
            .settings(&settings)
            .build()
            .context("Refusing to save invalid settings")?;
        let path = settings.save().context("Failed to save settings")?;
        if !cli.quiet {
            eprintln!("{} Settings saved to {}", green("✔"), bold(&path.display().to_string()));
        }
    }

    if cli.show_settings {
        print_settings(&settings, cli.json)?;
    }

    if cli.input.is_none() && (cli.save_settings || cli.show_settings) {
        return Ok(());
    }

    // ── Read input ───────────────────────────────────────────────────────
    let source = InputSource::parse(cli.input.as_deref().unwrap_or("-"));
    let text = resolve_input(&source)
        .await
        .with_context(|| format!("Failed to read {source}"))?;

    // ── Markdown-only mode ───────────────────────────────────────────────
    if cli.markdown_only {
        let markdown = normalize(&text);
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(markdown.as_bytes())
            .context("Failed to write to stdout")?;
        if !markdown.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, &settings, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert(&text, &config).await.context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        if let Some(ref warnings) = output.converter_warnings {
            eprintln!("{} {}", red("⚠"), dim(warnings));
        }
        eprintln!(
            "{}  {} chars → {} chars  {}ms  →  {}",
            green("✔"),
            output.stats.input_chars,
            output.stats.output_chars,
            output.stats.total_duration_ms,
            bold(&output.output_path.display().to_string()),
        );
    }

    Ok(())
}

fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(ref template) = cli.template {
        settings.template_file = template.clone();
    }
    if let Some(ref dir) = cli.output_dir {
        settings.output_dir = dir.clone();
    }
    if let Some(ref name) = cli.name {
        settings.filename_base = name.clone();
    }
}

fn print_settings(settings: &Settings, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(settings).context("Failed to serialise settings")?
        );
        return Ok(());
    }
    let stored_at = settings::settings_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "<no config directory>".to_string());
    println!("Settings file: {stored_at}");
    println!("Template:      {}", settings.template_file.display());
    println!("Output dir:    {}", settings.output_dir.display());
    println!("File name:     {}.{}", settings.filename_base, gpt2doc::OUTPUT_EXTENSION);
    Ok(())
}

/// Map settings and CLI args to `ConversionConfig`.
fn build_config(
    cli: &Cli,
    settings: &Settings,
    progress: Option<ProgressCallback>,
) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .settings(settings)
        .converter(cli.converter.clone());

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn long_help_lists_heading_rule() {
        assert!(AFTER_HELP.contains("\"## 2.3 Methods\" → \"## Methods\""));
        assert!(AFTER_HELP.contains("\"### 三、结论\" → \"### 结论\""));
        assert!(AFTER_HELP.trim_end().ends_with("RUST_LOG=gpt2doc=trace"));
    }

    #[test]
    fn flags_override_saved_settings() {
        let cli = Cli::parse_from(["gpt2doc", "-n", "weekly", "-d", "/tmp/out", "in.md"]);
        let mut settings = Settings::default();
        let template = settings.template_file.clone();
        apply_overrides(&mut settings, &cli);
        assert_eq!(settings.filename_base, "weekly");
        assert_eq!(settings.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(settings.template_file, template);
    }
}
