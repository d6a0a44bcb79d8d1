//! Commit inputs, the parsed element view, and the validated conventional view.

use std::fmt;
use std::ops::{Deref, Range};

use crate::parser;

/// A commit (or pull request) as supplied by a commit source.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RawCommit {
    /// Commit hash, or `#<number>` for a pull request.
    pub id: String,
    /// The first line of the message.
    pub subject: String,
    /// Everything after the subject and its blank separator line.
    pub body: String,
}

impl RawCommit {
    /// Piece together a commit from its parts.
    pub fn new(id: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Split a full commit message into subject and body.
    ///
    /// Blank lines between the subject and the body are dropped.
    pub fn from_message(id: impl Into<String>, message: &str) -> Self {
        let (subject, body) = message.split_once('\n').unwrap_or((message, ""));
        let body = body.trim_start_matches(&['\r', '\n'][..]).trim_end();
        Self::new(id, subject.trim_end_matches('\r'), body)
    }
}

/// One grammar slot of a subject line.
///
/// An absent slot still has an offset: the position where it would have
/// started.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Element<'a> {
    offset: usize,
    value: Option<&'a str>,
}

impl<'a> Element<'a> {
    fn new(line: &'a str, span: Range<usize>) -> Self {
        let offset = span.start;
        let value = line.get(span).filter(|v| !v.is_empty());
        Self { offset, value }
    }

    /// Byte offset into the subject.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes; `0` when absent.
    pub fn len(&self) -> usize {
        self.value.map_or(0, str::len)
    }

    /// Whether the slot is absent from the subject.
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// The slot's text, if present.
    pub const fn value(&self) -> Option<&'a str> {
        self.value
    }

    /// The slot's text, or `""`.
    pub fn as_str(&self) -> &'a str {
        self.value.unwrap_or("")
    }

    /// Offset just past the slot.
    pub fn end(&self) -> usize {
        self.offset + self.len()
    }
}

/// A subject line decomposed into its grammar elements.
///
/// Parsing never fails; a malformed subject simply has empty elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCommit<'a> {
    id: &'a str,
    subject: &'a str,
    body: &'a str,
    ty: Element<'a>,
    scope: Element<'a>,
    breaking: Element<'a>,
    separator: Element<'a>,
    spacing: Element<'a>,
    description: Element<'a>,
}

impl<'a> ParsedCommit<'a> {
    /// Decompose the subject of `raw`.
    ///
    /// Only the first line of `raw.subject` is considered.
    pub fn parse(raw: &'a RawCommit) -> Self {
        Self::from_parts(&raw.id, &raw.subject, &raw.body)
    }

    /// Decompose a subject without an owning [`RawCommit`].
    pub fn from_parts(id: &'a str, subject: &'a str, body: &'a str) -> Self {
        let subject = subject.lines().next().unwrap_or("");
        let layout = parser::layout(subject);
        Self {
            id,
            subject,
            body,
            ty: Element::new(subject, layout.type_),
            scope: Element::new(subject, layout.scope),
            breaking: Element::new(subject, layout.breaking),
            separator: Element::new(subject, layout.separator),
            spacing: Element::new(subject, layout.spacing),
            description: Element::new(subject, layout.description),
        }
    }

    /// The commit hash or pull request reference.
    pub fn id(&self) -> &'a str {
        self.id
    }

    /// The subject line.
    pub fn subject(&self) -> &'a str {
        self.subject
    }

    /// The raw body.
    pub fn body(&self) -> &'a str {
        self.body
    }

    /// Everything before the first `(`, `!` or `:`.
    pub fn type_(&self) -> Element<'a> {
        self.ty
    }

    /// The parenthesized scope, parentheses included.
    pub fn scope(&self) -> Element<'a> {
        self.scope
    }

    /// The `!` marker and any whitespace before it.
    pub fn breaking(&self) -> Element<'a> {
        self.breaking
    }

    /// The `:` and any whitespace before it.
    pub fn separator(&self) -> Element<'a> {
        self.separator
    }

    /// Whitespace after the separator.
    pub fn spacing(&self) -> Element<'a> {
        self.spacing
    }

    /// The rest of the subject.
    pub fn description(&self) -> Element<'a> {
        self.description
    }

    /// The six elements, left to right.
    pub fn elements(&self) -> [Element<'a>; 6] {
        [
            self.ty,
            self.scope,
            self.breaking,
            self.separator,
            self.spacing,
            self.description,
        ]
    }

    /// The scope with parentheses and surrounding whitespace stripped.
    pub fn scope_name(&self) -> Option<&'a str> {
        self.scope.value().map(|s| {
            s.strip_prefix('(')
                .and_then(|s| s.strip_suffix(')'))
                .unwrap_or(s)
                .trim()
        })
    }

    /// Whether the body's trailer block carries a breaking-change footer.
    pub fn has_breaking_footer(&self) -> bool {
        parser::breaking_lines(self.body)
            .iter()
            .any(|line| line.recognized())
    }
}

/// A commit that passed every structural check.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ConventionalCommit<'a> {
    #[serde(rename = "type")]
    ty: Type<'a>,
    scope: Option<Scope<'a>>,
    breaking: bool,
    description: &'a str,
}

impl<'a> ConventionalCommit<'a> {
    /// Only meaningful once the structural rules found nothing.
    pub(crate) fn derive(parsed: &ParsedCommit<'a>) -> Self {
        Self {
            ty: Type::new(parsed.type_().as_str().trim()),
            scope: parsed.scope_name().map(Scope::new),
            breaking: !parsed.breaking().is_empty() || parsed.has_breaking_footer(),
            description: parsed.description().as_str(),
        }
    }

    /// The type of the commit.
    pub fn type_(&self) -> Type<'a> {
        self.ty
    }

    /// The optional scope of the commit.
    pub fn scope(&self) -> Option<Scope<'a>> {
        self.scope
    }

    /// A flag to signal that the commit contains breaking changes.
    ///
    /// This flag is set either when the commit has an exclamation mark after
    /// the message type and scope, e.g.:
    /// ```text
    /// feat(scope)!: this is a breaking change
    /// ```
    ///
    /// Or when the `BREAKING CHANGE: ` footer is defined:
    /// ```text
    /// feat: my commit description
    ///
    /// BREAKING CHANGE: this is a breaking change
    /// ```
    pub fn breaking(&self) -> bool {
        self.breaking
    }

    /// The commit description.
    pub fn description(&self) -> &'a str {
        self.description
    }
}

impl fmt::Display for ConventionalCommit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_().as_str())?;

        if let Some(scope) = &self.scope() {
            write!(f, "({scope})")?;
        }
        if self.breaking {
            f.write_str("!")?;
        }

        write!(f, ": {}", self.description())
    }
}

macro_rules! unicase_components {
    ($($ty:ident),+) => (
        $(
            /// A component of the conventional commit, compared case-insensitively.
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $ty<'a>(unicase::UniCase<&'a str>);

            impl<'a> $ty<'a> {
                /// Wrap an already-validated value.
                pub const fn new(value: &'a str) -> Self {
                    $ty(unicase::UniCase::unicode(value))
                }

                /// Access `str` representation
                pub fn as_str(&self) -> &'a str {
                    self.0.into_inner()
                }
            }

            impl Deref for $ty<'_> {
                type Target = str;

                fn deref(&self) -> &Self::Target {
                    self.as_str()
                }
            }

            impl PartialEq<&'_ str> for $ty<'_> {
                fn eq(&self, other: &&str) -> bool {
                    *self == $ty::new(*other)
                }
            }

            impl fmt::Display for $ty<'_> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.fmt(f)
                }
            }

            impl serde::Serialize for $ty<'_> {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: serde::Serializer,
                {
                    serializer.serialize_str(self)
                }
            }
        )+
    )
}

unicase_components![Type, Scope];

/// Types with a version bump attached
impl Type<'static> {
    /// Commit type when introducing new features (correlates with `minor` in semver)
    pub const FEAT: Type<'static> = Type::new("feat");
    /// Commit type when patching a bug (correlates with `patch` in semver)
    pub const FIX: Type<'static> = Type::new("fix");
}

/// Whether validation skips this subject entirely.
///
/// Autosquash markers (`fixup! `, `squash! `, `amend! `) and the merge
/// phrasings of git, GitHub and Bitbucket are excluded, regardless of case or
/// surrounding quotes.
pub fn is_excluded(subject: &str) -> bool {
    parser::is_excluded(subject)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use serde_test::Token;

    fn parsed(subject: &str) -> ParsedCommit<'_> {
        ParsedCommit::from_parts("abc1234", subject, "")
    }

    #[test]
    fn test_from_message() {
        let raw = RawCommit::from_message(
            "abc",
            indoc! {"
                feat: message

                BREAKING CHANGE: breaking change
            "},
        );
        assert_eq!(raw.subject, "feat: message");
        assert_eq!(raw.body, "BREAKING CHANGE: breaking change");

        let raw = RawCommit::from_message("abc", "fix: only a subject");
        assert_eq!(raw.subject, "fix: only a subject");
        assert_eq!(raw.body, "");

        let raw = RawCommit::from_message("abc", "fix: crlf\r\n\r\nbody\r\n");
        assert_eq!(raw.subject, "fix: crlf");
        assert_eq!(raw.body, "body");
    }

    #[test]
    fn test_elements() {
        let commit = parsed("feat(my scope)!: hello world");

        assert_eq!(commit.type_().value(), Some("feat"));
        assert_eq!(commit.scope().value(), Some("(my scope)"));
        assert_eq!(commit.scope().offset(), 4);
        assert_eq!(commit.breaking().offset(), 14);
        assert_eq!(commit.separator().offset(), 15);
        assert_eq!(commit.spacing().len(), 1);
        assert_eq!(commit.description().value(), Some("hello world"));
        assert_eq!(commit.description().end(), commit.subject().len());
        assert_eq!(commit.scope_name(), Some("my scope"));
    }

    #[test]
    fn test_absent_elements_keep_their_position() {
        let commit = parsed("fix: x");

        assert!(commit.scope().is_empty());
        assert_eq!(commit.scope().offset(), 3);
        assert_eq!(commit.scope().len(), 0);
        assert_eq!(commit.breaking().offset(), 3);
        assert_eq!(commit.separator().offset(), 3);
        assert_eq!(commit.scope_name(), None);

        let mut end = 0;
        for element in commit.elements() {
            assert_eq!(element.offset(), end);
            end = element.end();
        }
    }

    #[test]
    fn test_only_first_line() {
        let commit = parsed("feat: first\nsecond");
        assert_eq!(commit.subject(), "feat: first");
        assert_eq!(commit.description().as_str(), "first");
    }

    #[test]
    fn test_derive() {
        let commit = parsed("Feat(Parser)!: add thing");
        let conventional = ConventionalCommit::derive(&commit);

        assert_eq!(conventional.type_(), Type::FEAT);
        assert_eq!(conventional.type_().as_str(), "Feat");
        assert_eq!(conventional.scope().unwrap(), "parser");
        assert!(conventional.breaking());
        assert_eq!(conventional.description(), "add thing");
        assert_eq!(conventional.to_string(), "Feat(Parser)!: add thing");
    }

    #[test]
    fn test_breaking_footer() {
        let body = indoc! {"
            Explain the change.

            BREAKING-CHANGE: config keys renamed
        "};
        let commit = ParsedCommit::from_parts("abc", "fix: rename keys", body);
        assert!(commit.has_breaking_footer());
        assert!(ConventionalCommit::derive(&commit).breaking());

        let commit = ParsedCommit::from_parts("abc", "fix: x", "breaking change: lowercase");
        assert!(!commit.has_breaking_footer());
    }

    #[test]
    fn test_commit_serialize() {
        let commit = parsed("fix(cli): hello world");
        let conventional = ConventionalCommit::derive(&commit);
        serde_test::assert_ser_tokens(
            &conventional,
            &[
                Token::Struct {
                    name: "ConventionalCommit",
                    len: 4,
                },
                Token::Str("type"),
                Token::Str("fix"),
                Token::Str("scope"),
                Token::Some,
                Token::Str("cli"),
                Token::Str("breaking"),
                Token::Bool(false),
                Token::Str("description"),
                Token::Str("hello world"),
                Token::StructEnd,
            ],
        );
    }
}
