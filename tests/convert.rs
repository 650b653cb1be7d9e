//! Conversion-driver tests against a stand-in converter.
//!
//! A tiny shell script takes pandoc's place: it logs the arguments it was
//! given and either copies the Markdown to the output path or fails with a
//! pandoc-style diagnostic. No real pandoc is needed.

use gpt2doc::{
    convert, convert_file, convert_sync, ConversionConfig, ConversionProgressCallback,
    ConversionStage, Gpt2DocError, InputSource, Settings,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Serialises tests that write and then exec a script, so no other thread
/// forks while a script is still open for writing (ETXTBSY).
static EXEC_LOCK: Mutex<()> = Mutex::new(());

#[derive(Default)]
struct RecordingCallback {
    events: Mutex<Vec<String>>,
}

impl RecordingCallback {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ConversionProgressCallback for RecordingCallback {
    fn on_conversion_start(&self, total_stages: usize) {
        self.events.lock().unwrap().push(format!("begin {total_stages}"));
    }

    fn on_stage_complete(&self, stage: ConversionStage) {
        self.events.lock().unwrap().push(format!("done {}", stage.index()));
    }

    fn on_conversion_error(&self, stage: ConversionStage, _error: &str) {
        self.events.lock().unwrap().push(format!("error {}", stage.index()));
    }

    fn on_conversion_complete(&self, _output_path: &Path) {
        self.events.lock().unwrap().push("complete".to_string());
    }
}

struct Fixture {
    dir: tempfile::TempDir,
    template: PathBuf,
    args_log: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("Temple.docx");
        std::fs::write(&template, b"PK reference doc").unwrap();
        let args_log = dir.path().join("args.log");
        Self {
            dir,
            template,
            args_log,
        }
    }

    fn out_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    /// Write an executable converter stand-in whose body runs after the
    /// arguments are logged.
    #[cfg(unix)]
    fn converter(&self, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;
        let path = self.dir.path().join("fake-pandoc");
        let script = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\n{body}\n",
            self.args_log.display()
        );
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn logged_args(&self) -> Vec<String> {
        std::fs::read_to_string(&self.args_log)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn config(&self, converter: String) -> gpt2doc::ConversionConfigBuilder {
        let settings = Settings {
            template_file: self.template.clone(),
            output_dir: self.out_dir(),
            filename_base: "report".into(),
        };
        ConversionConfig::builder()
            .settings(&settings)
            .converter(converter)
    }
}

// ── Converter runs ───────────────────────────────────────────────────────────

#[cfg(unix)]
#[tokio::test]
async fn converts_normalised_markdown() {
    let _guard = EXEC_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let fx = Fixture::new();
    let converter = fx.converter("cp \"$1\" \"$3\"");
    let config = fx.config(converter).build().unwrap();

    let output = convert("# 1. Intro\n\nSee \\(x\\).\n\n---\n", &config)
        .await
        .expect("conversion should succeed");

    let target = fx.out_dir().join("report.docx");
    assert_eq!(output.output_path, target);
    assert_eq!(output.markdown, "# Intro\n\nSee $x$.");
    assert_eq!(std::fs::read_to_string(&target).unwrap(), output.markdown);
    assert!(output.converter_warnings.is_none());
    assert_eq!(output.stats.output_chars, output.markdown.chars().count());

    let args = fx.logged_args();
    assert_eq!(args.len(), 4, "args: {args:?}");
    assert!(args[0].ends_with(".md"), "temp file should be .md: {}", args[0]);
    assert_eq!(args[1], "-o");
    assert_eq!(args[2], target.to_string_lossy());
    assert_eq!(
        args[3],
        format!("--reference-doc={}", fx.template.display())
    );
    assert!(
        !Path::new(&args[0]).exists(),
        "temp Markdown should be removed after success"
    );
}

#[cfg(unix)]
#[tokio::test]
async fn converter_failure_reports_diagnostics_and_cleans_up() {
    let _guard = EXEC_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let fx = Fixture::new();
    let converter =
        fx.converter("echo 'Could not find reference doc' >&2\nexit 3");
    let recorder = Arc::new(RecordingCallback::default());
    let config = fx
        .config(converter)
        .progress_callback(recorder.clone())
        .build()
        .unwrap();

    let err = convert("text", &config).await.unwrap_err();
    match &err {
        Gpt2DocError::ConversionFailed {
            status,
            diagnostics,
            ..
        } => {
            assert_eq!(*status, Some(3));
            assert_eq!(diagnostics, "Could not find reference doc");
        }
        other => panic!("unexpected error: {other}"),
    }

    let args = fx.logged_args();
    assert!(
        !Path::new(&args[0]).exists(),
        "temp Markdown should be removed after failure"
    );
    assert!(!fx.out_dir().join("report.docx").exists());
    assert_eq!(
        recorder.events(),
        vec!["begin 4", "done 1", "done 2", "error 3"]
    );
}

#[cfg(unix)]
#[tokio::test]
async fn converter_warnings_are_surfaced() {
    let _guard = EXEC_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let fx = Fixture::new();
    let converter = fx.converter("echo '[WARNING] Missing character' >&2\ncp \"$1\" \"$3\"");
    let recorder = Arc::new(RecordingCallback::default());
    let config = fx
        .config(converter)
        .progress_callback(recorder.clone())
        .build()
        .unwrap();

    let output = convert("hello", &config).await.unwrap();
    assert_eq!(
        output.converter_warnings.as_deref(),
        Some("[WARNING] Missing character")
    );
    assert_eq!(
        recorder.events(),
        vec!["begin 4", "done 1", "done 2", "done 3", "done 4", "complete"]
    );
}

#[cfg(unix)]
#[tokio::test]
async fn input_file_is_left_untouched() {
    let _guard = EXEC_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let fx = Fixture::new();
    let converter = fx.converter("exit 1");
    let config = fx.config(converter).build().unwrap();

    let original = "## 2.3 Methods\r\n\r\n\\(a+b\\)\r\n";
    let input_path = fx.dir.path().join("answer.md");
    std::fs::write(&input_path, original).unwrap();

    let result = convert_file(&InputSource::File(input_path.clone()), &config).await;
    assert!(result.is_err());
    assert_eq!(std::fs::read_to_string(&input_path).unwrap(), original);
}

// ── Failures before the converter runs ───────────────────────────────────────

#[test]
fn missing_input_file() {
    let fx = Fixture::new();
    let config = fx.config("pandoc".into()).build().unwrap();
    let source = InputSource::File(fx.dir.path().join("nope.md"));
    let err = tokio_test::block_on(convert_file(&source, &config)).unwrap_err();
    assert!(matches!(err, Gpt2DocError::InputNotFound { .. }));
}

#[test]
fn sync_wrapper_reports_missing_template() {
    let fx = Fixture::new();
    let config = fx
        .config("pandoc".into())
        .template_file(fx.dir.path().join("absent.docx"))
        .build()
        .unwrap();
    let err = convert_sync("# 1. Title", &config).unwrap_err();
    assert!(matches!(err, Gpt2DocError::TemplateNotFound { .. }));
}
