//! Project policy: which types and scopes a commit may use.

use std::collections::BTreeSet;
use std::path::Path;

use unicase::UniCase;

use crate::{Error, ErrorKind};

/// Allow-lists applied on top of the Conventional Commit grammar.
///
/// An empty set means "no restriction", not "forbid everything".
///
/// ```rust
/// let config = commit_compliance::Config::from_json(
///     r#"{ "allowedTypes": ["feat", "fix"], "allowedScopes": [] }"#,
/// )
/// .unwrap();
///
/// assert!(config.allows_type("FEAT"));
/// assert!(!config.allows_type("chore"));
/// assert!(config.allows_scope("anything"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    allowed_types: BTreeSet<String>,
    allowed_scopes: BTreeSet<String>,
}

impl Config {
    /// No restrictions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict commit types to `types`.
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_types = normalize(types);
        self
    }

    /// Restrict commit scopes to `scopes`; commits must then carry a scope.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_scopes = normalize(scopes);
        self
    }

    /// Parse a JSON document with `allowedTypes` and `allowedScopes` keys.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| Error::new(ErrorKind::InvalidConfig).set_source(err))?;
        Ok(Self {
            allowed_types: normalize(config.allowed_types),
            allowed_scopes: normalize(config.allowed_scopes),
        })
    }

    /// Read and parse a JSON configuration file.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .set_context(Box::new(path.display().to_string()))
                .set_source(err)
        })?;
        let config = Self::from_json(&json)
            .map_err(|err| err.set_context(Box::new(path.display().to_string())))?;
        tracing::debug!(
            path = %path.display(),
            types = config.allowed_types.len(),
            scopes = config.allowed_scopes.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Split a comma or whitespace separated list, as passed by action inputs.
    ///
    /// ```rust
    /// assert_eq!(
    ///     commit_compliance::Config::parse_list("feat, fix\nchore"),
    ///     ["feat", "fix", "chore"]
    /// );
    /// ```
    pub fn parse_list(input: &str) -> Vec<String> {
        input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// The allowed types; empty when unrestricted.
    pub fn allowed_types(&self) -> &BTreeSet<String> {
        &self.allowed_types
    }

    /// The allowed scopes; empty when unrestricted.
    pub fn allowed_scopes(&self) -> &BTreeSet<String> {
        &self.allowed_scopes
    }

    /// Whether `ty` passes the type allow-list, ignoring case.
    pub fn allows_type(&self, ty: &str) -> bool {
        contains(&self.allowed_types, ty)
    }

    /// Whether `scope` passes the scope allow-list, ignoring case.
    pub fn allows_scope(&self, scope: &str) -> bool {
        contains(&self.allowed_scopes, scope)
    }
}

fn normalize<I, S>(items: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items
        .into_iter()
        .map(Into::into)
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}

fn contains(set: &BTreeSet<String>, value: &str) -> bool {
    let value = UniCase::new(value);
    set.is_empty() || set.iter().any(|s| UniCase::new(s.as_str()) == value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_unrestricted() {
        let config = Config::new();
        assert!(config.allows_type("anything"));
        assert!(config.allows_scope(""));
    }

    #[test]
    fn test_builders_normalize() {
        let config = Config::new()
            .with_types([" feat ", "", "fix"])
            .with_scopes(vec!["cli".to_owned()]);

        assert_eq!(
            config.allowed_types().iter().collect::<Vec<_>>(),
            ["feat", "fix"]
        );
        assert!(config.allows_type("Fix"));
        assert!(!config.allows_type("docs"));
        assert!(config.allows_scope("CLI"));
        assert!(!config.allows_scope("action"));
    }

    #[test]
    fn test_from_json() {
        let config = Config::from_json(
            r#"{ "allowedTypes": ["feat"], "allowedScopes": ["action", " cli "] }"#,
        )
        .unwrap();
        assert_eq!(
            config,
            Config::new().with_types(["feat"]).with_scopes(["action", "cli"])
        );

        assert_eq!(Config::from_json("{}").unwrap(), Config::new());
    }

    #[test]
    fn test_from_json_errors() {
        let err = Config::from_json(r#"{ "allowedTypes": "feat" }"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);

        let err = Config::from_json(r#"{ "allowed_types": [] }"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);

        let err = Config::from_json("not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_from_path() {
        let path = std::env::temp_dir().join(format!(
            "commit-compliance-config-{}.json",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{ "allowedScopes": ["parser"] }"#).unwrap();
        drop(file);

        let config = Config::from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(config.allows_scope("parser"));
        assert!(config.allowed_types().is_empty());

        let err = Config::from_path(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(Config::parse_list(""), Vec::<String>::new());
        assert_eq!(Config::parse_list(" feat ,, fix "), ["feat", "fix"]);
    }
}
