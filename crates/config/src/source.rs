//! Fetch source definitions.
//!
//! Each entry of the `fetches` list describes one feed to poll and how often:
//!
//! ```json5
//! {
//!   fetches: [
//!     { key: "new-rust", type: "search", interval: 86400,
//!       q: "language:rust created:>2024-01-01", sort: "stars", per_page: 50 },
//!     { key: "trend-daily", type: "trend", interval: 43200,
//!       languages: "accept_languages", period: "daily" },
//!     { key: "cghp", type: "r/coolgithubprojects", interval: 3600 },
//!   ],
//! }
//! ```
//!
//! Unknown `type` values still parse (as [`SourceKind::Unknown`]) so a typo
//! only disables that one source.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Keyword selecting the global accepted-language list for a trend source.
pub const ACCEPT_LANGUAGES: &str = "accept_languages";

/// Default search sort order.
pub const DEFAULT_SORT: &str = "best";

/// Default number of search results per request.
pub const DEFAULT_PER_PAGE: u32 = 100;

/// A configured feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchSource {
    /// Unique key used for the last-fetch cursor.
    pub key: String,

    /// Minimum seconds between two fetches of this source.
    pub interval: u64,

    /// Source type and its parameters.
    #[serde(flatten)]
    pub kind: SourceKind,
}

/// Source types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SourceKind {
    /// GitHub repository search.
    #[serde(rename = "search")]
    Search {
        /// Search query.
        q: String,
        /// Sort order.
        #[serde(default = "default_sort")]
        sort: String,
        /// Results per request.
        #[serde(default = "default_per_page")]
        per_page: u32,
    },

    /// Per-language trending RSS feeds.
    #[serde(rename = "trend")]
    Trend {
        /// Languages to poll.
        languages: TrendLanguages,
        /// Trend period segment of the feed URL (e.g. `daily`).
        period: String,
    },

    /// The r/coolgithubprojects JSON feed.
    #[serde(rename = "r/coolgithubprojects")]
    CoolGithubProjects,

    /// Any other `type`.
    #[serde(other)]
    Unknown,
}

fn default_sort() -> String {
    DEFAULT_SORT.to_string()
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl SourceKind {
    /// Returns the `type` string as written in the config.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Search { .. } => "search",
            Self::Trend { .. } => "trend",
            Self::CoolGithubProjects => "r/coolgithubprojects",
            Self::Unknown => "unknown",
        }
    }
}

/// Languages polled by a trend source.
///
/// Written either as a list of names or as the string `"accept_languages"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrendLanguages {
    /// Use the global accepted-language list.
    AcceptLanguages,
    /// An explicit list.
    List(Vec<String>),
}

impl TrendLanguages {
    /// Resolves to concrete language names.
    ///
    /// # Examples
    ///
    /// ```
    /// use ghwatch_config::TrendLanguages;
    ///
    /// let accept = vec!["Rust".to_string()];
    /// assert_eq!(TrendLanguages::AcceptLanguages.resolve(&accept), vec!["Rust"]);
    /// let list = TrendLanguages::List(vec!["Go".to_string(), String::new()]);
    /// assert_eq!(list.resolve(&accept), vec!["Go", ""]);
    /// ```
    #[must_use]
    pub fn resolve<'a>(&'a self, accept_languages: &'a [String]) -> Vec<&'a str> {
        match self {
            Self::AcceptLanguages => accept_languages.iter().map(String::as_str).collect(),
            Self::List(languages) => languages.iter().map(String::as_str).collect(),
        }
    }
}

impl Serialize for TrendLanguages {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::AcceptLanguages => serializer.serialize_str(ACCEPT_LANGUAGES),
            Self::List(languages) => languages.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TrendLanguages {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, SeqAccess, Visitor};

        struct TrendLanguagesVisitor;

        impl<'de> Visitor<'de> for TrendLanguagesVisitor {
            type Value = TrendLanguages;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a list of language names or \"accept_languages\"")
            }

            fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                if v == ACCEPT_LANGUAGES {
                    Ok(TrendLanguages::AcceptLanguages)
                } else {
                    // A bare name polls just that language
                    Ok(TrendLanguages::List(vec![v.to_string()]))
                }
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut languages = Vec::new();
                while let Some(language) = seq.next_element::<String>()? {
                    languages.push(language);
                }
                Ok(TrendLanguages::List(languages))
            }
        }

        deserializer.deserialize_any(TrendLanguagesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_search_with_defaults() {
        let source: FetchSource = serde_json::from_str(
            r#"{"key": "s", "type": "search", "interval": 60, "q": "stars:>10"}"#,
        )
        .unwrap();
        assert_eq!(source.key, "s");
        assert_eq!(source.interval, 60);
        assert_eq!(
            source.kind,
            SourceKind::Search {
                q: "stars:>10".to_string(),
                sort: "best".to_string(),
                per_page: 100,
            }
        );
    }

    #[test]
    fn deserialize_trend_with_accept_languages() {
        let source: FetchSource = serde_json::from_str(
            r#"{
                "key": "t",
                "type": "trend",
                "interval": 1,
                "languages": "accept_languages",
                "period": "daily"
            }"#,
        )
        .unwrap();
        assert_eq!(
            source.kind,
            SourceKind::Trend {
                languages: TrendLanguages::AcceptLanguages,
                period: "daily".to_string(),
            }
        );
    }

    #[test]
    fn deserialize_trend_with_list() {
        let source: FetchSource = serde_json::from_str(
            r#"{
                "key": "t",
                "type": "trend",
                "interval": 1,
                "languages": ["C++", ""],
                "period": "weekly"
            }"#,
        )
        .unwrap();
        match source.kind {
            SourceKind::Trend { languages, .. } => {
                assert_eq!(languages, TrendLanguages::List(vec!["C++".to_string(), String::new()]));
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn deserialize_social_feed() {
        let source: FetchSource = serde_json::from_str(
            r#"{"key": "c", "type": "r/coolgithubprojects", "interval": 3600}"#,
        )
        .unwrap();
        assert_eq!(source.kind, SourceKind::CoolGithubProjects);
        assert_eq!(source.kind.type_name(), "r/coolgithubprojects");
    }

    #[test]
    fn deserialize_unknown_type() {
        let source: FetchSource = serde_json::from_str(
            r#"{"key": "x", "type": "gitlab", "interval": 5, "q": "ignored"}"#,
        )
        .unwrap();
        assert_eq!(source.kind, SourceKind::Unknown);
    }

    #[test]
    fn serialize_trend_languages() {
        assert_eq!(
            serde_json::to_string(&TrendLanguages::AcceptLanguages).unwrap(),
            r#""accept_languages""#
        );
        assert_eq!(
            serde_json::to_string(&TrendLanguages::List(vec!["Go".to_string()])).unwrap(),
            r#"["Go"]"#
        );
    }
}
