//! Validation of single commits and of pull requests against their commits.

use std::fmt;

use crate::commit::{is_excluded, ConventionalCommit, ParsedCommit, RawCommit};
use crate::diagnostic::{Diagnostic, Severity};
use crate::precedence::{compare_precedence, Precedence};
use crate::rules::{self, Rule};
use crate::Config;

/// Outcome of validating one commit's errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict<'a> {
    /// No errors.
    Valid(ConventionalCommit<'a>),
    /// At least one error.
    Invalid {
        /// Errors in rule evaluation order.
        errors: Vec<Diagnostic>,
        /// Present when only policy rules failed: the commit is well-formed
        /// but not permitted.
        commit: Option<ConventionalCommit<'a>>,
    },
}

/// A validated commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checked<'a> {
    parsed: ParsedCommit<'a>,
    verdict: Verdict<'a>,
    warnings: Vec<Diagnostic>,
}

impl<'a> Checked<'a> {
    /// Commit hash or pull request reference.
    pub fn id(&self) -> &'a str {
        self.parsed.id()
    }

    /// The element decomposition the rules ran on.
    pub fn parsed(&self) -> &ParsedCommit<'a> {
        &self.parsed
    }

    /// Valid, or the errors.
    pub fn verdict(&self) -> &Verdict<'a> {
        &self.verdict
    }

    /// Whether no rule reported an error.
    pub fn is_valid(&self) -> bool {
        matches!(self.verdict, Verdict::Valid(_))
    }

    /// Errors in rule evaluation order; empty when valid.
    pub fn errors(&self) -> &[Diagnostic] {
        match &self.verdict {
            Verdict::Valid(_) => &[],
            Verdict::Invalid { errors, .. } => errors,
        }
    }

    /// Advisory findings; these never make a commit invalid.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// The conventional view, when the structural rules passed.
    ///
    /// Also available for commits that only failed an allow-list.
    pub fn conventional(&self) -> Option<&ConventionalCommit<'a>> {
        match &self.verdict {
            Verdict::Valid(commit) => Some(commit),
            Verdict::Invalid { commit, .. } => commit.as_ref(),
        }
    }

    /// The version bump this commit implies; [`Precedence::None`] when it
    /// is structurally invalid.
    pub fn precedence(&self) -> Precedence {
        self.conventional().map_or(Precedence::None, Precedence::of)
    }

    /// Every error rendered with [`Diagnostic`]'s `Display`.
    pub fn messages(&self) -> Vec<String> {
        self.errors().iter().map(ToString::to_string).collect()
    }
}

/// A pull request validated together with its commits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PullRequestCheck<'a> {
    /// `None` when the title is a merge or autosquash subject.
    pub pull_request: Option<Checked<'a>>,
    /// Commits in input order, excluded ones dropped.
    pub commits: Vec<Checked<'a>>,
    /// Raised when the pull request implies a smaller bump than its commits.
    pub precedence: Option<Diagnostic>,
}

impl PullRequestCheck<'_> {
    /// All errors: the pull request's, each commit's, then the precedence
    /// error.
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.pull_request
            .iter()
            .chain(&self.commits)
            .flat_map(Checked::errors)
            .chain(&self.precedence)
            .collect()
    }

    /// All advisory findings.
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.pull_request
            .iter()
            .chain(&self.commits)
            .flat_map(Checked::warnings)
            .collect()
    }

    /// Whether no error was found anywhere.
    pub fn is_valid(&self) -> bool {
        self.pull_request
            .iter()
            .chain(&self.commits)
            .all(Checked::is_valid)
            && self.precedence.is_none()
    }
}

/// The validation context: a [`Config`] plus the ordered rules to run.
///
/// ```rust
/// use commit_compliance::{Config, Linter, RawCommit};
///
/// let linter = Linter::new(Config::new().with_types(["feat", "fix"]));
///
/// let raw = RawCommit::new("1a2b3c4", "feat(parser)!: drop legacy syntax", "");
/// let checked = linter.check(&raw).unwrap();
/// assert!(checked.is_valid());
/// assert!(checked.conventional().unwrap().breaking());
///
/// let raw = RawCommit::new("5d6e7f8", "chore: tidy", "");
/// let checked = linter.check(&raw).unwrap();
/// assert_eq!(checked.errors()[0].rule(), "type-allowlist");
///
/// let raw = RawCommit::new("9a8b7c6", "Merge branch 'main' into topic", "");
/// assert!(linter.check(&raw).is_none());
/// ```
pub struct Linter {
    config: Config,
    rules: Vec<Box<dyn Rule>>,
}

impl Linter {
    /// The canonical rules under `config`.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            rules: rules::defaults(),
        }
    }

    /// Append a rule, evaluated after the existing ones.
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// The policy in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Validate one commit.
    ///
    /// Returns `None` for merge and autosquash commits, which are not
    /// validated at all.
    pub fn check<'a>(&self, raw: &'a RawCommit) -> Option<Checked<'a>> {
        if is_excluded(&raw.subject) {
            tracing::debug!(id = %raw.id, subject = %raw.subject, "skipping excluded commit");
            return None;
        }

        let parsed = ParsedCommit::parse(raw);
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut blocked = false;
        let mut found = Vec::new();
        for rule in &self.rules {
            rule.check(&parsed, &self.config, &mut found);
            for diagnostic in found.drain(..) {
                match diagnostic.severity() {
                    Severity::Error => {
                        blocked |= rule.class().blocks_derivation();
                        errors.push(diagnostic);
                    }
                    Severity::Warning => warnings.push(diagnostic),
                }
            }
        }

        let commit = (!blocked).then(|| ConventionalCommit::derive(&parsed));
        let verdict = match commit {
            Some(commit) if errors.is_empty() => Verdict::Valid(commit),
            commit => {
                tracing::debug!(id = %raw.id, errors = errors.len(), "commit is not compliant");
                Verdict::Invalid { errors, commit }
            }
        };

        Some(Checked {
            parsed,
            verdict,
            warnings,
        })
    }

    /// Validate every commit, in input order, dropping excluded ones.
    pub fn check_all<'a>(&self, commits: &'a [RawCommit]) -> Vec<Checked<'a>> {
        commits.iter().filter_map(|raw| self.check(raw)).collect()
    }

    /// Validate a pull request's title and body, its commits, and that its
    /// precedence is at least that of its commits.
    pub fn check_pull_request<'a>(
        &self,
        pull_request: &'a RawCommit,
        commits: &'a [RawCommit],
    ) -> PullRequestCheck<'a> {
        let pull_request = self.check(pull_request);
        let commits = self.check_all(commits);
        let precedence = pull_request
            .as_ref()
            .and_then(|pr| compare_precedence(pr, &commits));
        PullRequestCheck {
            pull_request,
            commits,
            precedence,
        }
    }
}

impl Default for Linter {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl fmt::Debug for Linter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Linter")
            .field("config", &self.config)
            .field("rules", &self.rules)
            .finish()
    }
}
