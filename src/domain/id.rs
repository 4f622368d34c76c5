//! Path-style node identifiers.
//!
//! An identifier such as `gen.0.1.2` is a generation prefix (`gen`) followed by
//! zero or more non-negative integer segments. The prefix only matters for
//! display; every relation between ids is decided on the segments alone.

use std::cmp::Ordering;
use std::fmt;

use regex::Regex;

use crate::domain::error::{DomainError, DomainResult};

pub const DEFAULT_SEPARATOR: &str = ".";
pub const DEFAULT_GENERATION_PREFIX: &str = "gen";

/// Separator, generation prefix and canonical root id used to read and write ids.
#[derive(Debug, Clone)]
pub struct IdScheme {
    separator: String,
    separator_regex: Regex,
    generation_prefix: String,
    root: NodeId,
}

impl Default for IdScheme {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            separator_regex: Regex::new(&regex::escape(DEFAULT_SEPARATOR))
                .expect("escaped literal is a valid regex"),
            generation_prefix: DEFAULT_GENERATION_PREFIX.to_string(),
            root: NodeId {
                text: DEFAULT_GENERATION_PREFIX.to_string(),
                prefix_len: DEFAULT_GENERATION_PREFIX.len(),
                segments: Vec::new(),
            },
        }
    }
}

impl IdScheme {
    pub fn new(separator: &str, generation_prefix: &str, root_id: &str) -> DomainResult<Self> {
        if separator.is_empty() {
            return Err(DomainError::InvalidScheme("separator must not be empty".into()));
        }
        if generation_prefix.is_empty() {
            return Err(DomainError::InvalidScheme(
                "generation prefix must not be empty".into(),
            ));
        }
        if generation_prefix.contains(separator) {
            return Err(DomainError::InvalidScheme(format!(
                "generation prefix '{}' contains the separator '{}'",
                generation_prefix, separator
            )));
        }
        let separator_regex = Regex::new(&regex::escape(separator))
            .map_err(|e| DomainError::InvalidScheme(e.to_string()))?;

        let mut scheme = Self {
            separator: separator.to_string(),
            separator_regex,
            generation_prefix: generation_prefix.to_string(),
            root: NodeId::default(),
        };
        scheme.root = scheme
            .parse(root_id)
            .map_err(|e| DomainError::InvalidScheme(format!("root id: {}", e)))?;
        Ok(scheme)
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn generation_prefix(&self) -> &str {
        &self.generation_prefix
    }

    /// Canonical id used for a synthesized root.
    pub fn root_id(&self) -> &NodeId {
        &self.root
    }

    /// Parse text into an identifier: drop the leading generation token, keep integer segments.
    pub fn parse(&self, text: &str) -> DomainResult<NodeId> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::InvalidId {
                id: text.to_string(),
                reason: "empty id".into(),
            });
        }

        let mut tokens = self.separator_regex.split(text);
        let prefix = tokens.next().unwrap_or_default();
        if prefix.is_empty() {
            return Err(DomainError::InvalidId {
                id: text.to_string(),
                reason: "missing generation prefix".into(),
            });
        }

        let segments = tokens
            .map(|token| {
                let invalid = || DomainError::InvalidId {
                    id: text.to_string(),
                    reason: format!("segment '{}' is not a non-negative integer", token),
                };
                // usize::from_str also takes a leading '+'
                if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                token.parse::<usize>().map_err(|_| invalid())
            })
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(NodeId {
            text: text.to_string(),
            prefix_len: prefix.len(),
            segments,
        })
    }
}

/// A parsed node identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodeId {
    text: String,
    prefix_len: usize,
    segments: Vec<usize>,
}

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn prefix(&self) -> &str {
        &self.text[..self.prefix_len]
    }

    pub fn segments(&self) -> &[usize] {
        &self.segments
    }

    /// Number of segments; the root has depth zero.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn last_segment(&self) -> Option<usize> {
        self.segments.last().copied()
    }

    /// `self` is exactly one level above `other` and a prefix of it.
    pub fn is_parent_of(&self, other: &NodeId) -> bool {
        self.depth() + 1 == other.depth() && self.is_ancestor_of(other)
    }

    /// `self` is strictly shorter than `other` and a segment-wise prefix of it.
    pub fn is_ancestor_of(&self, other: &NodeId) -> bool {
        self.depth() < other.depth() && other.segments.starts_with(&self.segments)
    }

    /// Id of the child at `segment`, rendered with the scheme separator.
    pub fn child(&self, segment: usize, scheme: &IdScheme) -> NodeId {
        let mut segments = self.segments.clone();
        segments.push(segment);
        NodeId {
            text: format!("{}{}{}", self.text, scheme.separator(), segment),
            prefix_len: self.prefix_len,
            segments,
        }
    }
}

impl Ord for NodeId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments
            .cmp(&other.segments)
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialOrd for NodeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}
