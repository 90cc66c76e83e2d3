//! Route matching logic.
//!
//! # Responsibilities
//! - Compile a route pattern into literal and capture segments
//! - Match a request path segment by segment
//! - Bind capture segments to the path's values
//!
//! # Design Decisions
//! - Pattern and path are split on `/`; segment counts must be equal
//! - Trailing slashes are significant (they add an empty segment)
//! - `{name}` captures exactly one segment, which may be empty
//! - Literal segments match case-sensitively
//! - No regex or wildcards to guarantee O(n) matching

use crate::routing::params::PathParams;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Capture(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        // "{}" has no name and stays a literal.
        if raw.len() > 2 && raw.starts_with('{') && raw.ends_with('}') {
            Segment::Capture(raw[1..raw.len() - 1].to_string())
        } else {
            Segment::Literal(raw.to_string())
        }
    }
}

/// A compiled route pattern such as `/api/v1/subscription/{id}`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        let raw = pattern.into();
        let segments = raw.split('/').map(Segment::parse).collect();
        Self { raw, segments }
    }

    /// The pattern as it was registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match `path` against this pattern, returning the captured parameters.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let mut params = PathParams::new();
        let mut parts = path.split('/');

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
                Segment::Capture(name) => params.insert(name, part),
            }
        }

        // Path has more segments than the pattern.
        if parts.next().is_some() {
            return None;
        }

        Some(params)
    }
}
