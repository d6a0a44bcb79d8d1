use std::ops::Range;

use winnow::ascii::Caseless;
use winnow::combinator::{alt, opt, trace};
use winnow::stream::LocatingSlice;
use winnow::token::{literal, take_till, take_while};
use winnow::ModalResult;
use winnow::Parser;

type Input<'i> = LocatingSlice<&'i str>;

/// Byte spans of every grammar slot of a subject line.
///
/// Slots are laid out contiguously: each span starts where the previous one
/// ends, absent slots being empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Layout {
    pub(crate) type_: Range<usize>,
    pub(crate) scope: Range<usize>,
    pub(crate) breaking: Range<usize>,
    pub(crate) separator: Range<usize>,
    pub(crate) spacing: Range<usize>,
    pub(crate) description: Range<usize>,
}

impl Layout {
    /// Everything is description; used if the grammar ever rejects a line.
    fn unparsed(len: usize) -> Self {
        Self {
            type_: 0..0,
            scope: 0..0,
            breaking: 0..0,
            separator: 0..0,
            spacing: 0..0,
            description: 0..len,
        }
    }
}

/// Decompose a single subject line.
///
/// Never fails: a malformed line yields empty slots, which the rules then
/// report on.
pub(crate) fn layout(line: &str) -> Layout {
    let mut input = LocatingSlice::new(line);
    let layout = summary
        .parse_next(&mut input)
        .unwrap_or_else(|_| Layout::unparsed(line.len()));
    tracing::trace!(?layout, line, "parsed subject");
    layout
}

// <whitespace>      ::= <any Unicode whitespace>
fn is_whitespace(c: char) -> bool {
    c.is_whitespace()
}

// <summary>         ::= <type>, [<scope>], [<breaking>], [<separator>], <spacing>, <description>
fn summary(i: &mut Input<'_>) -> ModalResult<Layout> {
    trace(
        "summary",
        (
            trace("type", type_),
            trace("scope", scope),
            trace("breaking", exclamation_mark),
            trace("separator", separator),
            trace("spacing", spacing),
            trace("description", description),
        ),
    )
    .map(
        |(type_, scope, breaking, separator, spacing, description)| Layout {
            type_,
            scope,
            breaking,
            separator,
            spacing,
            description,
        },
    )
    .parse_next(i)
}

// <type>            ::= <any UTF8-octets except "(" or "!" or ":">*
fn type_(i: &mut Input<'_>) -> ModalResult<Range<usize>> {
    take_till(0.., ['(', '!', ':']).span().parse_next(i)
}

// <scope>           ::= "(", <any UTF8-octets except ")">*, ")"
fn scope(i: &mut Input<'_>) -> ModalResult<Range<usize>> {
    opt(('(', take_till(0.., ')'), ')')).span().parse_next(i)
}

// <breaking>        ::= <whitespace>*, "!"
fn exclamation_mark(i: &mut Input<'_>) -> ModalResult<Range<usize>> {
    opt((take_while(0.., is_whitespace), '!'))
        .span()
        .parse_next(i)
}

// <separator>       ::= <whitespace>*, ":"
fn separator(i: &mut Input<'_>) -> ModalResult<Range<usize>> {
    opt((take_while(0.., is_whitespace), ':'))
        .span()
        .parse_next(i)
}

// <spacing>         ::= <whitespace>*
fn spacing(i: &mut Input<'_>) -> ModalResult<Range<usize>> {
    take_while(0.., is_whitespace).span().parse_next(i)
}

// <description>     ::= <any UTF8-octets>*
fn description(i: &mut Input<'_>) -> ModalResult<Range<usize>> {
    take_while(0.., |_: char| true).span().parse_next(i)
}

// <excluded>        ::= "fixup! " | "squash! " | "amend! "
//                    |  "Merge pull request" | "Merge branch"
//                    |  "Merge remote-tracking branch" | "Merged in"
fn exclusion_marker<'i>(i: &mut &'i str) -> ModalResult<&'i str> {
    alt((
        literal(Caseless("fixup! ")),
        literal(Caseless("squash! ")),
        literal(Caseless("amend! ")),
        literal(Caseless("Merge pull request")),
        literal(Caseless("Merge remote-tracking branch")),
        literal(Caseless("Merge branch")),
        literal(Caseless("Merged in")),
    ))
    .parse_next(i)
}

/// Whether the subject is an autosquash marker or a merge commit.
///
/// Leading quotes are ignored, so a quoted `"Merge branch 'x'"` still
/// matches.
pub(crate) fn is_excluded(subject: &str) -> bool {
    let mut i =
        subject.trim_start_matches(|c: char| is_whitespace(c) || matches!(c, '"' | '\'' | '`'));
    exclusion_marker.parse_next(&mut i).is_ok()
}

// <breaking-token>  ::= "BREAKING CHANGE" | "BREAKING-CHANGE"
fn breaking_token<'i>(i: &mut &'i str) -> ModalResult<&'i str> {
    alt(("BREAKING CHANGE", "BREAKING-CHANGE")).parse_next(i)
}

fn miscased_breaking_token<'i>(i: &mut &'i str) -> ModalResult<&'i str> {
    alt((
        literal(Caseless("BREAKING CHANGE")),
        literal(Caseless("BREAKING-CHANGE")),
    ))
    .parse_next(i)
}

// <token>           ::= <any UTF8-octets except whitespace or parens or ":" or "!" or "#">+
fn token<'i>(i: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| {
        !is_whitespace(c) && !matches!(c, '(' | ')' | ':' | '!' | '#')
    })
    .parse_next(i)
}

// <footer-separator> ::= ":" | " #"
fn footer_separator<'i>(i: &mut &'i str) -> ModalResult<&'i str> {
    alt((":", " #")).parse_next(i)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FooterKind {
    Breaking,
    MiscasedBreaking,
    Other,
}

/// Classify the start of a body line as a footer, if it is one.
fn footer_kind(line: &str) -> Option<(FooterKind, &str)> {
    let mut i = line;
    if let Ok((t, _)) = (breaking_token, footer_separator).parse_next(&mut i) {
        return Some((FooterKind::Breaking, t));
    }
    let mut i = line;
    if let Ok((t, _)) = (miscased_breaking_token, footer_separator).parse_next(&mut i) {
        return Some((FooterKind::MiscasedBreaking, t));
    }
    let mut i = line;
    if let Ok((t, _)) = (token, footer_separator).parse_next(&mut i) {
        return Some((FooterKind::Other, t));
    }
    None
}

/// A body line that starts with a breaking-change token, in any case.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct BreakingLine<'a> {
    /// 0-based line index within the body.
    pub(crate) index: usize,
    pub(crate) line: &'a str,
    pub(crate) token: &'a str,
    pub(crate) exact: bool,
    pub(crate) in_trailers: bool,
}

impl BreakingLine<'_> {
    /// Only an exact-case token inside the trailer block counts.
    pub(crate) fn recognized(&self) -> bool {
        self.exact && self.in_trailers
    }
}

/// Locate breaking-change footer tokens in a commit body.
///
/// The trailer block starts at the first footer line that opens a paragraph
/// and runs to the end of the body.
pub(crate) fn breaking_lines(body: &str) -> Vec<BreakingLine<'_>> {
    let mut found = Vec::new();
    let mut in_trailers = false;
    let mut prior_is_empty = true;
    for (index, line) in body.lines().enumerate() {
        let kind = footer_kind(line);
        if prior_is_empty && kind.is_some() {
            in_trailers = true;
        }
        match kind {
            Some((FooterKind::Breaking, t)) | Some((FooterKind::MiscasedBreaking, t)) => {
                found.push(BreakingLine {
                    index,
                    line,
                    token: t,
                    exact: matches!(kind, Some((FooterKind::Breaking, _))),
                    in_trailers,
                });
            }
            Some((FooterKind::Other, _)) | None => {}
        }
        prior_is_empty = line.trim().is_empty();
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn slots(line: &str) -> [&str; 6] {
        let l = layout(line);
        [
            &line[l.type_],
            &line[l.scope],
            &line[l.breaking],
            &line[l.separator],
            &line[l.spacing],
            &line[l.description],
        ]
    }

    #[test]
    fn test_summary() {
        assert_eq!(slots("feat: add"), ["feat", "", "", ":", " ", "add"]);
        assert_eq!(
            slots("feat(parser)!: add"),
            ["feat", "(parser)", "!", ":", " ", "add"]
        );
        assert_eq!(slots("fix!: bug"), ["fix", "", "!", ":", " ", "bug"]);
        assert_eq!(
            slots("feat (scope): space"),
            ["feat ", "(scope)", "", ":", " ", "space"]
        );
        assert_eq!(
            slots("feat(scope) !  : x"),
            ["feat", "(scope)", " !", "  :", " ", "x"]
        );
        assert_eq!(slots("feat():  y"), ["feat", "()", "", ":", "  ", "y"]);
        assert_eq!(
            slots("(scope): missing type"),
            ["", "(scope)", "", ":", " ", "missing type"]
        );
        assert_eq!(slots("feat:"), ["feat", "", "", ":", "", ""]);
        assert_eq!(slots("feat:    "), ["feat", "", "", ":", "    ", ""]);
        assert_eq!(slots(""), ["", "", "", "", "", ""]);
    }

    #[test]
    fn test_unterminated_scope() {
        assert_eq!(slots("feat(a: b"), ["feat", "", "", "", "", "(a: b"]);
        assert_eq!(
            slots("Hello World"),
            ["Hello World", "", "", "", "", ""]
        );
    }

    #[test]
    fn test_contiguous() {
        for line in ["feat (x) ! : y", "a(b)c", "::!!((", "üíÉ(üèΩ)!: ok"] {
            let l = layout(line);
            assert_eq!(l.type_.start, 0);
            assert_eq!(l.type_.end, l.scope.start);
            assert_eq!(l.scope.end, l.breaking.start);
            assert_eq!(l.breaking.end, l.separator.start);
            assert_eq!(l.separator.end, l.spacing.start);
            assert_eq!(l.spacing.end, l.description.start);
            assert_eq!(l.description.end, line.len());
        }
    }

    #[test]
    fn test_excluded() {
        assert!(is_excluded("fixup! feat: x"));
        assert!(is_excluded("squash! fix: y"));
        assert!(is_excluded("Merge pull request #123 from branch"));
        assert!(is_excluded("Merge branch 'x' into 'main'"));
        assert!(is_excluded("merge BRANCH 'x'"));
        assert!(is_excluded("\"Merge branch 'x'\""));
        assert!(is_excluded("Merged in feature/x (pull request #4)"));
        assert!(is_excluded("Merge remote-tracking branch 'origin/main'"));

        assert!(!is_excluded("feat: merge branch handling"));
        assert!(!is_excluded("fixup!: nope"));
        assert!(!is_excluded("Merging things"));
    }

    #[test]
    fn test_footer_kind() {
        assert_eq!(
            footer_kind("BREAKING CHANGE: oops"),
            Some((FooterKind::Breaking, "BREAKING CHANGE"))
        );
        assert_eq!(
            footer_kind("BREAKING-CHANGE: oops"),
            Some((FooterKind::Breaking, "BREAKING-CHANGE"))
        );
        assert_eq!(
            footer_kind("breaking change: oops"),
            Some((FooterKind::MiscasedBreaking, "breaking change"))
        );
        assert_eq!(
            footer_kind("Co-Authored-By: Lisa"),
            Some((FooterKind::Other, "Co-Authored-By"))
        );
        assert_eq!(footer_kind("Closes #12"), Some((FooterKind::Other, "Closes")));
        assert_eq!(footer_kind("just some text"), None);
        assert_eq!(footer_kind("BREAKING CHANGE"), None);
    }

    #[test]
    fn test_breaking_lines() {
        let body = indoc! {"
            Some explanation.
            BREAKING CHANGE: glued to the paragraph

            Reviewed-by: Z
            BREAKING CHANGE: a real one
            breaking-change: wrong case
        "};
        let found = breaking_lines(body);
        assert_eq!(found.len(), 3);

        assert_eq!(found[0].index, 1);
        assert!(found[0].exact);
        assert!(!found[0].in_trailers);
        assert!(!found[0].recognized());

        assert_eq!(found[1].index, 4);
        assert!(found[1].recognized());

        assert_eq!(found[2].index, 5);
        assert_eq!(found[2].token, "breaking-change");
        assert!(!found[2].exact);
        assert!(found[2].in_trailers);
    }

    #[test]
    fn test_body_starting_with_footer() {
        let found = breaking_lines("BREAKING CHANGE: drops the v1 API");
        assert_eq!(found.len(), 1);
        assert!(found[0].recognized());
        assert!(breaking_lines("").is_empty());
    }
}
