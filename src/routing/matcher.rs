//! Path pattern matching.
//!
//! # Responsibilities
//! - Compile route patterns once at registration
//! - Match request paths from the start of the string
//! - Expose captured groups to handlers
//!
//! # Design Decisions
//! - Patterns are anchored at the start only; a trailing `$` is up to the
//!   route author (`/api/nodes` also matches `/api/nodes/foo`)
//! - Matching is case-sensitive

use regex::Regex;

/// A compiled, start-anchored path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})", pattern))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as registered.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Captured groups when `path` matches; unmatched groups are `None`.
    pub fn captures(&self, path: &str) -> Option<PathCaptures> {
        self.regex.captures(path).map(|caps| PathCaptures {
            groups: caps
                .iter()
                .skip(1)
                .map(|group| group.map(|m| m.as_str().to_string()))
                .collect(),
        })
    }
}

/// Groups captured by a matching pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathCaptures {
    groups: Vec<Option<String>>,
}

impl PathCaptures {
    /// Group by 1-based index, as in the pattern source.
    pub fn get(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.groups.get(i))
            .and_then(|group| group.as_deref())
    }

    pub fn first(&self) -> Option<&str> {
        self.get(1)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
