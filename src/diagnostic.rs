//! Positioned rule violations and their caret-annotated rendering.

use std::fmt;

const HIGHLIGHT: &str = "**";

/// How much a diagnostic matters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fails validation.
    Error,
    /// Advisory; never fails validation on its own.
    Warning,
}

impl Severity {
    /// Access `str` representation of Severity
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Byte range of the source line to underline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Underline {
    /// Byte offset of the first underlined character.
    pub start: usize,
    /// Length in bytes; a zero-length underline renders as a lone caret.
    pub len: usize,
}

/// A single rule violation, anchored to a line of a commit.
///
/// The [`Display`](fmt::Display) implementation renders:
///
/// ```text
/// <source>:<line>:<column>: error: <message>
///   <source line>
///   <spaces>^<dashes>
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Diagnostic {
    rule: String,
    severity: Severity,
    source: String,
    line: usize,
    column: usize,
    message: String,
    source_line: String,
    underline: Option<Underline>,
}

impl Diagnostic {
    /// Start an error for `rule`; anchored at line 1, column 0 until told otherwise.
    pub fn error(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule.into(), Severity::Error, message.into())
    }

    /// Start a warning for `rule`.
    pub fn warning(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule.into(), Severity::Warning, message.into())
    }

    fn new(rule: String, severity: Severity, message: String) -> Self {
        Self {
            rule,
            severity,
            source: String::new(),
            line: 1,
            column: 0,
            message,
            source_line: String::new(),
            underline: None,
        }
    }

    /// Attach the commit id, the 1-based line number, and the line's text.
    pub fn with_source(
        mut self,
        source: impl Into<String>,
        line: usize,
        source_line: impl Into<String>,
    ) -> Self {
        self.source = source.into();
        self.line = line;
        self.source_line = source_line.into();
        self
    }

    /// Anchor at `start` and underline `len` bytes from there.
    pub fn with_span(mut self, start: usize, len: usize) -> Self {
        self.column = start;
        self.underline = Some(Underline { start, len });
        self
    }

    /// Anchor at `column` without underlining anything.
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = column;
        self.underline = None;
        self
    }

    /// Id of the rule that produced this.
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Error or warning.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Commit hash or pull request reference.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 1-based line number.
    pub fn line(&self) -> usize {
        self.line
    }

    /// 0-based byte offset into the line.
    pub fn column(&self) -> usize {
        self.column
    }

    /// The requirement text, with the violated clause highlighted.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The line being reported on.
    pub fn source_line(&self) -> &str {
        &self.source_line
    }

    /// The highlighted span, if any.
    pub fn underline(&self) -> Option<Underline> {
        self.underline
    }

    fn caret(&self, underline: Underline, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.source_line.as_str();
        // Hand-built spans may run past the line; clamp them to it.
        let start = underline.start.min(line.len());
        let end = underline
            .start
            .saturating_add(underline.len)
            .clamp(start, line.len());
        // Byte offsets may not land on char boundaries if the diagnostic was
        // built by hand; fall back to the raw byte counts.
        let indent = line.get(..start).map_or(start, |s| s.chars().count());
        let width = line
            .get(start..end)
            .map_or(end - start, |s| s.chars().count());
        write!(
            f,
            "\n  {:indent$}^{}",
            "",
            "-".repeat(width.saturating_sub(1)),
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {}",
            self.source, self.line, self.column, self.severity, self.message
        )?;
        write!(f, "\n  {}", self.source_line)?;
        if let Some(underline) = self.underline {
            self.caret(underline, f)?;
        }
        Ok(())
    }
}

/// Wrap the first occurrence of `clause` within `text` in a highlight marker.
///
/// `text` is returned unchanged if it does not contain `clause`.
pub fn highlight(text: &str, clause: &str) -> String {
    match text.find(clause) {
        Some(start) if !clause.is_empty() => {
            let end = start + clause.len();
            format!(
                "{}{HIGHLIGHT}{}{HIGHLIGHT}{}",
                &text[..start],
                &text[start..end],
                &text[end..]
            )
        }
        _ => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_highlight() {
        assert_eq!(
            highlight("MUST be a noun, really", "a noun"),
            "MUST be **a noun**, really"
        );
        assert_eq!(highlight("no match here", "noun"), "no match here");
        assert_eq!(highlight("empty clause", ""), "empty clause");
    }

    #[test]
    fn test_format_with_underline() {
        let diagnostic = Diagnostic::error("structural-prefix", "Commits MUST be **x**.")
            .with_source("1a2b3c4", 1, "feat (scope): space")
            .with_span(4, 1);

        assert_eq!(
            diagnostic.to_string(),
            indoc! {"
                1a2b3c4:1:4: error: Commits MUST be **x**.
                  feat (scope): space
                      ^"
            }
        );
    }

    #[test]
    fn test_format_dashes() {
        let diagnostic = Diagnostic::error("type-allowlist", "A type MUST be allowed.")
            .with_source("#12", 1, "chore: unknown type")
            .with_span(0, 5);

        assert_eq!(
            diagnostic.to_string(),
            indoc! {"
                #12:1:0: error: A type MUST be allowed.
                  chore: unknown type
                  ^----"
            }
        );
    }

    #[test]
    fn test_format_zero_length_and_no_underline() {
        let diagnostic = Diagnostic::warning("w", "msg")
            .with_source("abc", 3, "feat:")
            .with_span(5, 0);
        assert_eq!(diagnostic.to_string(), "abc:3:5: warning: msg\n  feat:\n       ^");

        let diagnostic = Diagnostic::error("e", "msg")
            .with_source("abc", 1, "feat:")
            .with_column(2);
        assert_eq!(diagnostic.to_string(), "abc:1:2: error: msg\n  feat:");
    }

    #[test]
    fn test_caret_counts_chars() {
        let diagnostic = Diagnostic::error("e", "msg")
            .with_source("abc", 1, "é x")
            .with_span("é ".len(), 1);
        assert_eq!(diagnostic.column(), 3);
        assert_eq!(diagnostic.to_string(), "abc:1:3: error: msg\n  é x\n    ^");
    }

    #[test]
    fn test_span_past_line() {
        let diagnostic = Diagnostic::error("e", "m")
            .with_source("a", 1, "line")
            .with_span(usize::MAX, 1);
        assert_eq!(diagnostic.to_string().lines().nth(2), Some("      ^"));

        let diagnostic = Diagnostic::error("e", "m")
            .with_source("a", 1, "line")
            .with_span(1, usize::MAX);
        assert_eq!(diagnostic.to_string(), "a:1:1: error: m\n  line\n   ^--");
    }

    #[test]
    fn test_format_is_pure() {
        let diagnostic = Diagnostic::error("e", "msg")
            .with_source("abc", 1, "line")
            .with_span(1, 2);
        let before = diagnostic.clone();
        assert_eq!(diagnostic.to_string(), diagnostic.to_string());
        assert_eq!(diagnostic, before);
    }
}
