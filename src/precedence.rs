//! Semantic-version precedence of commits and pull requests.

use std::fmt;

use crate::check::Checked;
use crate::commit::{ConventionalCommit, Type};
use crate::diagnostic::{highlight, Diagnostic};

/// The version bump a commit implies, ordered from least to most significant.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Precedence {
    /// No release needed.
    #[default]
    None,
    /// `fix`: a PATCH release.
    Fix,
    /// `feat`: a MINOR release.
    Feat,
    /// `!` or a breaking-change footer: a MAJOR release.
    Breaking,
}

impl Precedence {
    /// The precedence of a single commit or pull request.
    ///
    /// ```rust
    /// use commit_compliance::{Linter, Precedence, RawCommit};
    ///
    /// let raw = RawCommit::new("abc1234", "Fix(cli): handle empty input", "");
    /// let checked = Linter::default().check(&raw).unwrap();
    /// let commit = checked.conventional().unwrap();
    ///
    /// assert_eq!(Precedence::of(commit), Precedence::Fix);
    /// ```
    pub fn of(commit: &ConventionalCommit<'_>) -> Self {
        if commit.breaking() {
            Precedence::Breaking
        } else if commit.type_() == Type::FEAT {
            Precedence::Feat
        } else if commit.type_() == Type::FIX {
            Precedence::Fix
        } else {
            Precedence::None
        }
    }

    /// The matching Semantic Versioning component, if any.
    pub fn bump(self) -> Option<&'static str> {
        match self {
            Precedence::None => None,
            Precedence::Fix => Some("patch"),
            Precedence::Feat => Some("minor"),
            Precedence::Breaking => Some("major"),
        }
    }

    /// Access `str` representation of Precedence
    pub fn as_str(self) -> &'static str {
        match self {
            Precedence::None => "none",
            Precedence::Fix => "fix",
            Precedence::Feat => "feat",
            Precedence::Breaking => "breaking",
        }
    }
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Id of the diagnostic raised by [`compare_precedence`].
pub const RULE_ID: &str = "pull-request-precedence";

/// The requirement checked by [`compare_precedence`].
pub const REQUIREMENT: &str = "A pull request MUST correlate with a Semantic Versioning identifier (MAJOR.MINOR.PATCH) with the same or higher precedence than its associated commits.";

/// The highest precedence among `commits`.
///
/// Commits without a [`ConventionalCommit`] view count as
/// [`Precedence::None`].
pub fn highest<'c, 'a: 'c>(commits: impl IntoIterator<Item = &'c Checked<'a>>) -> Precedence {
    commits
        .into_iter()
        .filter_map(Checked::conventional)
        .map(Precedence::of)
        .max()
        .unwrap_or_default()
}

/// Check that a pull request bumps the version at least as much as its commits.
///
/// Returns nothing when the pull request itself is structurally invalid:
/// its structural diagnostics already explain the failure.
pub fn compare_precedence(
    pull_request: &Checked<'_>,
    commits: &[Checked<'_>],
) -> Option<Diagnostic> {
    let pr_level = Precedence::of(pull_request.conventional()?);
    let commits_level = highest(commits);
    if pr_level >= commits_level {
        return None;
    }

    tracing::debug!(
        pull_request = pull_request.id(),
        %pr_level,
        %commits_level,
        "pull request precedence lower than its commits"
    );
    let parsed = pull_request.parsed();
    let ty = parsed.type_();
    Some(
        Diagnostic::error(RULE_ID, highlight(REQUIREMENT, "the same or higher precedence"))
            .with_source(parsed.id(), 1, parsed.subject())
            .with_span(ty.offset(), ty.len()),
    )
}
