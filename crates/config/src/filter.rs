//! Repository filters.
//!
//! Filters are regular expressions searched (not anchored) in a repository's
//! name or description. They are compiled once when the configuration is
//! loaded, so a bad pattern stops the program at startup instead of in the
//! middle of a fetch.

use ghwatch_protocol::RepoRecord;
use regex::Regex;
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Which field of a record a filter matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    /// The repository name (without owner).
    Name,
    /// The description.
    Description,
}

/// Compiled repository filters.
///
/// # Examples
///
/// ```
/// use ghwatch_config::RepoFilter;
/// use ghwatch_protocol::RepoRecord;
///
/// let filter = RepoFilter::compile(&["^awesome-".to_string()], &[]).unwrap();
/// let record = RepoRecord::from_trend("someone/awesome-lists", "", "", "");
/// assert!(filter.matches(&record));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RepoFilter {
    name: Vec<Regex>,
    description: Vec<Regex>,
}

impl RepoFilter {
    /// Compiles name and description patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidFilter`] for the first pattern that is
    /// not a valid regular expression.
    pub fn compile(name_patterns: &[String], description_patterns: &[String]) -> Result<Self> {
        Ok(Self {
            name: compile_all(name_patterns)?,
            description: compile_all(description_patterns)?,
        })
    }

    /// Returns the first filter matching `record`, if any.
    #[must_use]
    pub fn matched(&self, record: &RepoRecord) -> Option<(FilterField, &str)> {
        if let Some(re) = self.name.iter().find(|re| re.is_match(&record.repo)) {
            debug!(
                full_name = %record.full_name,
                pattern = re.as_str(),
                "repo name matched filter, skipped"
            );
            return Some((FilterField::Name, re.as_str()));
        }

        let description = record.description.as_deref()?;
        let re = self.description.iter().find(|re| re.is_match(description))?;
        debug!(
            full_name = %record.full_name,
            pattern = re.as_str(),
            "description matched filter, skipped"
        );
        Some((FilterField::Description, re.as_str()))
    }

    /// Returns whether any filter matches `record`.
    #[must_use]
    pub fn matches(&self, record: &RepoRecord) -> bool {
        self.matched(record).is_some()
    }

    /// Returns whether no filters are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.description.is_empty()
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidFilter {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(full_name: &str, description: Option<&str>) -> RepoRecord {
        let mut record = RepoRecord::from_trend(full_name, "Rust", "", "");
        record.description = description.map(str::to_string);
        record
    }

    #[test]
    fn name_filter_matches_repo_not_owner() {
        let filter = RepoFilter::compile(&["dotfiles".to_string()], &[]).unwrap();
        assert!(filter.matches(&record("me/dotfiles", None)));
        assert!(!filter.matches(&record("dotfiles/tool", None)));
    }

    #[test]
    fn description_filter_is_unanchored_search() {
        let filter = RepoFilter::compile(&[], &["(?i)tutorial".to_string()]).unwrap();
        assert_eq!(
            filter.matched(&record("a/b", Some("A Rust Tutorial for beginners"))),
            Some((FilterField::Description, "(?i)tutorial"))
        );
    }

    #[test]
    fn description_filter_skips_missing_description() {
        let filter = RepoFilter::compile(&[], &[".*".to_string()]).unwrap();
        assert!(!filter.matches(&record("a/b", None)));
    }

    #[test]
    fn name_filter_wins_over_description() {
        let filter = RepoFilter::compile(&["b".to_string()], &["x".to_string()]).unwrap();
        assert_eq!(
            filter.matched(&record("a/b", Some("x"))).map(|(field, _)| field),
            Some(FilterField::Name)
        );
    }

    #[test]
    fn invalid_pattern_fails_compilation() {
        let err =
            RepoFilter::compile(&["ok".to_string(), "[unclosed".to_string()], &[]).unwrap_err();
        match err {
            ConfigError::InvalidFilter { pattern, .. } => assert_eq!(pattern, "[unclosed"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_filter_matches_nothing() {
        let filter = RepoFilter::default();
        assert!(filter.is_empty());
        assert!(!filter.matches(&record("a/b", Some("anything"))));
    }
}
