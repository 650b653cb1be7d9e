//! Normalizer: deterministic cleanup of LLM-generated Markdown before it is
//! handed to the document converter.
//!
//! Chat models emit text that renders nicely in their own UI but trips up
//! pandoc:
//!
//! - narrow no-break spaces (U+202F) sprinkled through typeset numbers
//! - private-use citation markers (`U+E200 … U+E201`) wrapping source refs
//! - LaTeX `\( … \)` / `\[ … \]` math delimiters instead of `$` / `$$`
//! - hand-numbered headings (`## 2.3 Methods`, `### 三、结论`) that clash with
//!   the reference document's own heading numbering
//! - `---` divider lines between sections
//!
//! Each rule below is a pure `&str → String` function backed by a small rule
//! table, so a rule can be extended (another delimiter pair, another numeral
//! system) without touching its neighbours.
//!
//! ## Stage Order
//!
//! Stages run in the order listed in [`STAGES`]. Whitespace compaction runs
//! after marker removal so emptied lines count as blank, and heading
//! numbering is stripped only once formula delimiters are in their final
//! shape.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::trace;

/// Signature shared by every normalizer stage.
pub type StageFn = fn(&str) -> String;

/// The normalizer stages, in execution order.
pub const STAGES: [(&str, StageFn); 6] = [
    ("strip_control_chars", strip_control_chars),
    ("remove_citation_markers", remove_citation_markers),
    ("compact_whitespace", compact_whitespace),
    ("convert_formula_delimiters", convert_formula_delimiters),
    ("strip_heading_numbering", strip_heading_numbering),
    ("remove_separator_lines", remove_separator_lines),
];

/// Run the full normalizer over `input`.
///
/// Total over arbitrary Unicode input: a rule that finds nothing to rewrite
/// is a no-op, so this never fails.
pub fn normalize(input: &str) -> String {
    STAGES
        .iter()
        .fold(input.to_string(), |text, (name, stage)| {
            let out = stage(&text);
            trace!(
                stage = *name,
                before = text.len(),
                after = out.len(),
                "normalizer stage"
            );
            out
        })
}

// ── Stage 1: Control characters ──────────────────────────────────────────────

/// Code points deleted outright.
pub const STRIPPED_CHARS: &[char] = &['\u{202F}'];

pub fn strip_control_chars(input: &str) -> String {
    input.replace(STRIPPED_CHARS, "")
}

// ── Stage 2: Citation markers ────────────────────────────────────────────────

/// Opens a citation/annotation span.
pub const CITATION_START: char = '\u{E200}';
/// Closes a citation/annotation span.
pub const CITATION_END: char = '\u{E201}';
/// Every private-use marker that must not survive, matched or not.
pub const CITATION_MARKERS: [char; 3] = [CITATION_START, CITATION_END, '\u{E202}'];

static RE_CITATION_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\x{E200}.*?\x{E201}").unwrap());

/// Remove `U+E200 … U+E201` spans (interior included, across lines), then any
/// leftover marker code points.
pub fn remove_citation_markers(input: &str) -> String {
    RE_CITATION_SPAN
        .replace_all(input, "")
        .replace(CITATION_MARKERS, "")
}

// ── Stage 3: Whitespace compaction ───────────────────────────────────────────

static RE_TRAILING_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+\n").unwrap());

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Trim trailing spaces/tabs, then cap blank-line runs at one blank line.
pub fn compact_whitespace(input: &str) -> String {
    let s = trim_trailing_whitespace(input);
    collapse_blank_lines(&s)
}

fn trim_trailing_whitespace(input: &str) -> String {
    RE_TRAILING_WHITESPACE.replace_all(input, "\n").into_owned()
}

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").into_owned()
}

// ── Stage 4: Formula delimiters ──────────────────────────────────────────────

/// One LaTeX math delimiter pair and the Markdown fence that replaces it.
#[derive(Debug, Clone, Copy)]
pub struct FormulaRule {
    pub open: &'static str,
    pub close: &'static str,
    pub fence: &'static str,
    /// Whether the formula body may contain line breaks.
    pub multiline: bool,
}

impl FormulaRule {
    fn pattern(&self) -> String {
        let flags = if self.multiline { "(?s)" } else { "" };
        format!(
            r"{flags}{}\s*(.*?)\s*{}",
            regex::escape(self.open),
            regex::escape(self.close)
        )
    }
}

/// Applied in order: inline before display.
pub const FORMULA_RULES: [FormulaRule; 2] = [
    FormulaRule {
        open: r"\(",
        close: r"\)",
        fence: "$",
        multiline: false,
    },
    FormulaRule {
        open: r"\[",
        close: r"\]",
        fence: "$$",
        multiline: true,
    },
];

static RE_FORMULAS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    FORMULA_RULES
        .iter()
        .map(|rule| (Regex::new(&rule.pattern()).unwrap(), rule.fence))
        .collect()
});

/// `\( X \)` → `$X$` and `\[ X \]` → `$$X$$`, with X trimmed.
///
/// Whitespace inside the formula body is left as-is.
pub fn convert_formula_delimiters(input: &str) -> String {
    RE_FORMULAS
        .iter()
        .fold(input.to_string(), |text, (re, fence)| {
            re.replace_all(&text, |caps: &Captures<'_>| {
                format!("{fence}{}{fence}", caps[1].trim())
            })
            .into_owned()
        })
}

// ── Stage 5: Heading numbering ───────────────────────────────────────────────

/// Numeral systems recognised as a heading-number prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingScheme {
    /// `2`, `2.`, `2.3`, `2.3.1.`
    Arabic,
    /// `三`, `十二、`, `四，`
    Cjk,
}

static RE_ARABIC_NUMBERING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)*\.?[ \t]*").unwrap());

static RE_CJK_NUMBERING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[一二三四五六七八九十]+(?:、|[.,，])?[ \t]*").unwrap());

static RE_HEADING_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*#+[ \t]*)(.*)$").unwrap());

impl NumberingScheme {
    /// Tried in this order; the first match wins.
    pub const ALL: [NumberingScheme; 2] = [NumberingScheme::Arabic, NumberingScheme::Cjk];

    fn pattern(self) -> &'static Regex {
        match self {
            NumberingScheme::Arabic => Lazy::force(&RE_ARABIC_NUMBERING),
            NumberingScheme::Cjk => Lazy::force(&RE_CJK_NUMBERING),
        }
    }

    /// If `title` starts with a token of this scheme, return what follows the
    /// token and its trailing whitespace.
    pub fn strip_prefix(self, title: &str) -> Option<&str> {
        self.pattern().find(title).map(|m| &title[m.end()..])
    }

    /// Find the scheme `title` is numbered with, if any.
    pub fn detect(title: &str) -> Option<(NumberingScheme, &str)> {
        Self::ALL
            .iter()
            .find_map(|scheme| scheme.strip_prefix(title).map(|rest| (*scheme, rest)))
    }
}

/// Drop the numbering token from Markdown heading lines, keeping the `#` run
/// and the whitespace after it untouched. A heading that was only a number
/// keeps just its `#` run.
pub fn strip_heading_numbering(input: &str) -> String {
    RE_HEADING_LINE
        .replace_all(input, |caps: &Captures<'_>| {
            let marker = &caps[1];
            match NumberingScheme::detect(&caps[2]) {
                // Number-only heading: nothing follows, so no space after the `#` run.
                Some((_, rest)) if rest.trim_end_matches('\r').is_empty() => {
                    format!("{}{rest}", marker.trim_end_matches([' ', '\t']))
                }
                Some((_, rest)) => format!("{marker}{rest}"),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

// ── Stage 6: Separator lines ─────────────────────────────────────────────────

/// A line holding nothing but three or more hyphens (surrounding whitespace
/// allowed).
pub fn is_separator_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-')
}

/// Drop separator lines and rejoin with `\n`.
///
/// The blank lines that sat on either side of a dropped separator become
/// neighbours, so the blank-line cap is applied again.
pub fn remove_separator_lines(input: &str) -> String {
    let kept: Vec<&str> = input
        .lines()
        .filter(|line| !is_separator_line(line))
        .collect();
    collapse_blank_lines(&kept.join("\n"))
}

// ── Tests ────────────────────────────────────────────────────────────────────
