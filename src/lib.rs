//! Compliance checks for the [Conventional Commit] specification.
//!
//! Subjects are decomposed into positioned grammar elements, run through an
//! ordered set of rules, and every violation is reported as a
//! [`Diagnostic`] pointing at the exact offending characters.
//!
//! [conventional commit]: https://www.conventionalcommits.org
//!
//! # Example
//!
//! ```rust
//! use commit_compliance::{Config, Linter, RawCommit};
//!
//! let linter = Linter::new(Config::new().with_scopes(["parser", "cli"]));
//!
//! let raw = RawCommit::new("1a2b3c4", "feat (parser): add tested usage example", "");
//! let checked = linter.check(&raw).unwrap();
//!
//! // Malformed input is data, not an error: it yields diagnostics.
//! assert!(!checked.is_valid());
//! assert_eq!(
//!     checked.messages()[0],
//!     "1a2b3c4:1:4: error: Commits MUST be prefixed with a type, which consists of a noun, \
//!      feat, fix, etc., **followed by** the OPTIONAL scope, OPTIONAL !, and REQUIRED \
//!      terminal colon and space.\n  feat (parser): add tested usage example\n      ^",
//! );
//!
//! // A pull request must bump the version at least as much as its commits.
//! let pr = RawCommit::new("#12", "fix(cli): tidy output", "");
//! let commits = [RawCommit::new("5d6e7f8", "feat(cli)!: drop --legacy", "")];
//! let result = linter.check_pull_request(&pr, &commits);
//! assert_eq!(result.errors()[0].rule(), "pull-request-precedence");
//! ```

#![warn(missing_docs)]

mod check;
mod commit;
mod config;
mod diagnostic;
mod error;
mod parser;
pub mod precedence;
pub mod rules;

pub use check::{Checked, Linter, PullRequestCheck, Verdict};
pub use commit::{is_excluded, ConventionalCommit, Element, ParsedCommit, RawCommit, Scope, Type};
pub use config::Config;
pub use diagnostic::{highlight, Diagnostic, Severity, Underline};
pub use error::{Error, ErrorKind};
pub use precedence::{compare_precedence, Precedence};
pub use rules::{Rule, RuleClass};
