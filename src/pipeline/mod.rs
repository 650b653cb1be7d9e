//! Pipeline stages for text-to-DOCX conversion.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ normalize ──▶ pandoc
//! (file/stdin)  (rewrite rules)  (temp .md → docx)
//! ```
//!
//! 1. [`input`]     — read the user's text from a file or stdin
//! 2. [`normalize`] — the pure, ordered rewrite rules (citation markers, math
//!    delimiters, heading numbers, separators)
//! 3. [`pandoc`]    — write a temp Markdown file and run the converter; the
//!    only stage that spawns a process

pub mod input;
pub mod normalize;
pub mod pandoc;
