//! Tag Filter - series selection by tag values
//!
//! A filter is a conjunction of clauses, each matching one tag either by
//! exact value or by a regular expression over the whole value.
//!
//! # Example
//! ```
//! use strata::store::TagFilter;
//!
//! let filter = TagFilter::new()
//!     .eq("module", "inventory")
//!     .eq("type", "r")
//!     .matches("mtypes", r".*\|heap\|.*")
//!     .unwrap();
//!
//! assert_eq!(filter.to_string(), r"module:inventory,type:r,mtypes~.*\|heap\|.*");
//! ```

use crate::store::error::StoreResult;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;

/// How one tag value is matched
#[derive(Debug, Clone)]
pub enum TagMatcher {
    /// Value must equal the string
    Exact(String),
    /// Value must fully match the pattern
    Pattern(Regex),
}

impl TagMatcher {
    pub fn is_match(&self, value: &str) -> bool {
        match self {
            TagMatcher::Exact(expected) => expected == value,
            TagMatcher::Pattern(regex) => regex.is_match(value),
        }
    }
}

/// Conjunction of tag clauses
#[derive(Debug, Clone, Default)]
pub struct TagFilter {
    clauses: Vec<(String, TagMatcher, String)>,
}

impl TagFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require an exact tag value
    pub fn eq(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        self.clauses
            .push((key.into(), TagMatcher::Exact(value.clone()), value));
        self
    }

    /// Require the tag value to fully match a regular expression
    pub fn matches(mut self, key: impl Into<String>, pattern: &str) -> StoreResult<Self> {
        let anchored = Regex::new(&format!("^(?:{})$", pattern))?;
        self.clauses
            .push((key.into(), TagMatcher::Pattern(anchored), pattern.to_string()));
        Ok(self)
    }

    /// Check a series' tags; a missing tag never matches
    pub fn matches_tags(&self, tags: &HashMap<String, String>) -> bool {
        self.clauses.iter().all(|(key, matcher, _)| {
            tags.get(key)
                .map(|value| matcher.is_match(value))
                .unwrap_or(false)
        })
    }

    /// Iterate over `(key, matcher)` clauses
    pub fn clauses(&self) -> impl Iterator<Item = (&str, &TagMatcher)> {
        self.clauses
            .iter()
            .map(|(key, matcher, _)| (key.as_str(), matcher))
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, matcher, source)) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            match matcher {
                TagMatcher::Exact(_) => write!(f, "{}:{}", key, source)?,
                TagMatcher::Pattern(_) => write!(f, "{}~{}", key, source)?,
            }
        }
        Ok(())
    }
}
