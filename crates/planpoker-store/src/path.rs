//! Hierarchical key paths.
//!
//! A [`StorePath`] is a sequence of key segments, written `rooms/abc/meta`.
//! The empty path is the root of the store.

use std::fmt;

use crate::StoreError;

/// Characters the backend refuses inside a single key.
const FORBIDDEN: &[char] = &['/', '.', '#', '$', '[', ']'];

/// Returns `true` if `key` can be used as one path segment.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.chars().any(|c| FORBIDDEN.contains(&c) || c.is_control())
}

/// A location in the store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// The root of the store.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a `/`-separated path. Leading and trailing slashes are
    /// ignored; empty inner segments are not.
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            if !is_valid_key(segment) {
                return Err(StoreError::InvalidPath(raw.to_string()));
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Returns this path extended by one segment.
    ///
    /// The segment is not validated here; identifiers that end up in
    /// paths are validated when they are constructed.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns `true` if `self` equals `other` or lies above it.
    pub fn is_ancestor_of(&self, other: &StorePath) -> bool {
        other.segments.starts_with(&self.segments)
    }

    /// Returns `true` if a write at one path can change the value at the
    /// other.
    pub fn overlaps(&self, other: &StorePath) -> bool {
        self.is_ancestor_of(other) || other.is_ancestor_of(self)
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        write!(f, "{}", self.segments.join("/"))
    }
}
