//! The ordered set of requirement rules applied to a parsed commit.

use std::fmt;

use crate::commit::{Element, ParsedCommit};
use crate::diagnostic::{highlight, Diagnostic, Severity};
use crate::parser;
use crate::Config;

/// How a rule's findings affect validation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum RuleClass {
    /// Malformed type, separator or spacing.
    Structural,
    /// Grammatically placed but meaningless, e.g. a scope that is not a noun.
    Semantic,
    /// Well-formed, but not permitted by the [`Config`].
    Policy,
    /// Worth pointing out, never fails validation.
    Advisory,
}

impl RuleClass {
    /// Whether an error from this class prevents deriving a
    /// [`ConventionalCommit`](crate::ConventionalCommit).
    pub fn blocks_derivation(self) -> bool {
        matches!(self, RuleClass::Structural | RuleClass::Semantic)
    }

    /// The severity of findings in this class.
    pub fn severity(self) -> Severity {
        match self {
            RuleClass::Advisory => Severity::Warning,
            RuleClass::Structural | RuleClass::Semantic | RuleClass::Policy => Severity::Error,
        }
    }
}

/// A single independent check over a parsed commit.
///
/// Rules hold no state of their own; policy comes in through `config`.
pub trait Rule: Send + Sync {
    /// Stable identifier, used in diagnostics.
    fn id(&self) -> &'static str;

    /// How findings of this rule are treated.
    fn class(&self) -> RuleClass;

    /// Push one diagnostic per violation onto `diagnostics`.
    fn check(&self, commit: &ParsedCommit<'_>, config: &Config, diagnostics: &mut Vec<Diagnostic>);
}

impl fmt::Debug for dyn Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Rule").field(&self.id()).finish()
    }
}

/// The canonical rule set, in evaluation order.
pub fn defaults() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(StructuralPrefix),
        Box::new(ScopeNoun),
        Box::new(DescriptionRequired),
        Box::new(ScopeAllowlist),
        Box::new(TypeAllowlist),
        Box::new(BreakingFooter),
    ]
}

fn subject_diagnostic(
    rule: &dyn Rule,
    commit: &ParsedCommit<'_>,
    message: String,
    start: usize,
    len: usize,
) -> Diagnostic {
    let diagnostic = match rule.class().severity() {
        Severity::Error => Diagnostic::error(rule.id(), message),
        Severity::Warning => Diagnostic::warning(rule.id(), message),
    };
    diagnostic
        .with_source(commit.id(), 1, commit.subject())
        .with_span(start, len)
}

fn is_noun(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_alphabetic)
}

/// Exactly one whitespace character, however many bytes it takes.
fn is_single_char(element: Element<'_>) -> bool {
    element.as_str().chars().count() == 1
}

/// Leading and trailing whitespace of an element, as absolute spans.
fn padding(element: Element<'_>) -> (Option<(usize, usize)>, Option<(usize, usize)>) {
    let value = element.as_str();
    let leading = value.len() - value.trim_start().len();
    let trailing = value.len() - value.trim_end().len();
    if value.trim().is_empty() {
        let all = (!value.is_empty()).then(|| (element.offset(), value.len()));
        return (all, None);
    }
    (
        (leading > 0).then(|| (element.offset(), leading)),
        (trailing > 0).then(|| (element.end() - trailing, trailing)),
    )
}

/// `type(scope)!: ` prefix.
#[derive(Copy, Clone, Debug, Default)]
pub struct StructuralPrefix;

impl StructuralPrefix {
    /// The requirement checked.
    pub const REQUIREMENT: &'static str = "Commits MUST be prefixed with a type, which consists of a noun, feat, fix, etc., followed by the OPTIONAL scope, OPTIONAL !, and REQUIRED terminal colon and space.";

    const MISSING_TYPE: &'static str = "prefixed with a type";
    const NOT_A_NOUN: &'static str = "which consists of a noun";
    const TYPE_PADDING: &'static str = "followed by";
    const BREAKING_PADDING: &'static str = "OPTIONAL !";
    const MISSING_COLON: &'static str = "REQUIRED terminal colon";
    const COLON_PADDING: &'static str = "terminal colon";
    const SPACE: &'static str = "and space";

    fn emit(
        &self,
        commit: &ParsedCommit<'_>,
        clause: &str,
        (start, len): (usize, usize),
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        diagnostics.push(subject_diagnostic(
            self,
            commit,
            highlight(Self::REQUIREMENT, clause),
            start,
            len,
        ));
    }
}

impl Rule for StructuralPrefix {
    fn id(&self) -> &'static str {
        "structural-prefix"
    }

    fn class(&self) -> RuleClass {
        RuleClass::Structural
    }

    fn check(&self, commit: &ParsedCommit<'_>, _: &Config, diagnostics: &mut Vec<Diagnostic>) {
        let ty = commit.type_();
        let name = ty.as_str().trim();
        if name.is_empty() {
            self.emit(commit, Self::MISSING_TYPE, (ty.offset(), ty.len()), diagnostics);
        } else {
            let (leading, trailing) = padding(ty);
            if let Some(span) = leading {
                self.emit(commit, Self::MISSING_TYPE, span, diagnostics);
            }
            if !is_noun(name) {
                let start = ty.offset() + leading.map_or(0, |(_, len)| len);
                self.emit(commit, Self::NOT_A_NOUN, (start, name.len()), diagnostics);
            }
            if let Some(span) = trailing {
                self.emit(commit, Self::TYPE_PADDING, span, diagnostics);
            }
        }

        if let (Some(span), _) = padding(commit.breaking()) {
            self.emit(commit, Self::BREAKING_PADDING, span, diagnostics);
        }

        let separator = commit.separator();
        if separator.is_empty() {
            self.emit(commit, Self::MISSING_COLON, (separator.offset(), 0), diagnostics);
        } else {
            if let (Some(span), _) = padding(separator) {
                self.emit(commit, Self::COLON_PADDING, span, diagnostics);
            }
            let spacing = commit.spacing();
            if !is_single_char(spacing) {
                self.emit(commit, Self::SPACE, (spacing.offset(), spacing.len()), diagnostics);
            }
        }
    }
}

/// `(scope)` must be a noun.
#[derive(Copy, Clone, Debug, Default)]
pub struct ScopeNoun;

impl ScopeNoun {
    /// The requirement checked.
    pub const REQUIREMENT: &'static str = "A scope MAY be provided after a type. A scope MUST consist of a noun describing a section of the codebase surrounded by parenthesis, e.g., fix(parser):";
}

impl Rule for ScopeNoun {
    fn id(&self) -> &'static str {
        "scope-noun"
    }

    fn class(&self) -> RuleClass {
        RuleClass::Semantic
    }

    fn check(&self, commit: &ParsedCommit<'_>, _: &Config, diagnostics: &mut Vec<Diagnostic>) {
        let scope = commit.scope();
        let Some(value) = scope.value() else {
            return;
        };
        let inner = &value[1..value.len() - 1];
        if value.contains(char::is_whitespace) || !is_noun(inner) {
            diagnostics.push(subject_diagnostic(
                self,
                commit,
                highlight(Self::REQUIREMENT, "a noun"),
                scope.offset(),
                scope.len(),
            ));
        }
    }
}

/// A description after `: `.
#[derive(Copy, Clone, Debug, Default)]
pub struct DescriptionRequired;

impl DescriptionRequired {
    /// The requirement checked.
    pub const REQUIREMENT: &'static str = "A description MUST immediately follow the colon and space after the type/scope prefix. The description is a short summary of the code changes, e.g., fix: array parsing issue when multiple spaces were contained in string.";
}

impl Rule for DescriptionRequired {
    fn id(&self) -> &'static str {
        "description-required"
    }

    fn class(&self) -> RuleClass {
        RuleClass::Semantic
    }

    fn check(&self, commit: &ParsedCommit<'_>, _: &Config, diagnostics: &mut Vec<Diagnostic>) {
        if commit.separator().is_empty() {
            return;
        }
        let spacing = commit.spacing();
        if !is_single_char(spacing) || commit.description().is_empty() {
            diagnostics.push(subject_diagnostic(
                self,
                commit,
                highlight(Self::REQUIREMENT, "immediately follow the colon and space"),
                spacing.offset(),
                spacing.len(),
            ));
        }
    }
}

fn listing(set: &std::collections::BTreeSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Scope must be one of [`Config::allowed_scopes`], when configured.
#[derive(Copy, Clone, Debug, Default)]
pub struct ScopeAllowlist;

impl Rule for ScopeAllowlist {
    fn id(&self) -> &'static str {
        "scope-allowlist"
    }

    fn class(&self) -> RuleClass {
        RuleClass::Policy
    }

    fn check(&self, commit: &ParsedCommit<'_>, config: &Config, diagnostics: &mut Vec<Diagnostic>) {
        if config.allowed_scopes().is_empty() {
            return;
        }
        if commit
            .scope_name()
            .is_some_and(|scope| config.allows_scope(scope))
        {
            return;
        }
        let text = format!(
            "A scope MUST be one of the following nouns: {}.",
            listing(config.allowed_scopes())
        );
        let scope = commit.scope();
        diagnostics.push(subject_diagnostic(
            self,
            commit,
            highlight(&text, "one of the following nouns"),
            scope.offset(),
            scope.len(),
        ));
    }
}

/// Type must be one of [`Config::allowed_types`], when configured.
#[derive(Copy, Clone, Debug, Default)]
pub struct TypeAllowlist;

impl Rule for TypeAllowlist {
    fn id(&self) -> &'static str {
        "type-allowlist"
    }

    fn class(&self) -> RuleClass {
        RuleClass::Policy
    }

    fn check(&self, commit: &ParsedCommit<'_>, config: &Config, diagnostics: &mut Vec<Diagnostic>) {
        let ty = commit.type_();
        let name = ty.as_str().trim();
        if config.allows_type(name) {
            return;
        }
        let text = format!(
            "A type MUST be one of the following nouns: {}.",
            listing(config.allowed_types())
        );
        let start = ty.offset() + (ty.len() - ty.as_str().trim_start().len());
        diagnostics.push(subject_diagnostic(
            self,
            commit,
            highlight(&text, "one of the following nouns"),
            start,
            name.len(),
        ));
    }
}

/// Breaking-change footers that will be ignored.
#[derive(Copy, Clone, Debug, Default)]
pub struct BreakingFooter;

impl BreakingFooter {
    /// The requirement checked.
    pub const REQUIREMENT: &'static str = "A breaking change footer MUST use the uppercase token BREAKING CHANGE and appear in the trailer block at the end of the body, otherwise it is ignored.";

    /// Body line `i` (0-based) is line `i + 3` of the message.
    const BODY_LINE_OFFSET: usize = 3;
}

impl Rule for BreakingFooter {
    fn id(&self) -> &'static str {
        "breaking-footer"
    }

    fn class(&self) -> RuleClass {
        RuleClass::Advisory
    }

    fn check(&self, commit: &ParsedCommit<'_>, _: &Config, diagnostics: &mut Vec<Diagnostic>) {
        for line in parser::breaking_lines(commit.body()) {
            let clause = if !line.exact {
                "uppercase token BREAKING CHANGE"
            } else if !line.in_trailers {
                "appear in the trailer block at the end of the body"
            } else {
                continue;
            };
            diagnostics.push(
                Diagnostic::warning(self.id(), highlight(Self::REQUIREMENT, clause))
                    .with_source(
                        commit.id(),
                        line.index + Self::BODY_LINE_OFFSET,
                        line.line,
                    )
                    .with_span(0, line.token.len()),
            );
        }
    }
}
