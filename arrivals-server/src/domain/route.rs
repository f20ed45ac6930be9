//! Route identifier type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid route identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid route id: {reason}")]
pub struct InvalidRouteId {
    reason: &'static str,
}

/// A route (line) identifier such as `A`, `7` or `GS`.
///
/// Feeds and clients disagree on case, so route ids are normalized to
/// upper case at construction. Two `RouteId`s built from `"g"` and `"G"`
/// are equal and hash identically.
///
/// # Examples
///
/// ```
/// use arrivals_server::domain::RouteId;
///
/// let g = RouteId::parse("g").unwrap();
/// assert_eq!(g.as_str(), "G");
/// assert_eq!(g, RouteId::parse("G").unwrap());
///
/// // Blank ids are rejected
/// assert!(RouteId::parse("  ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    /// Parse a route id, trimming whitespace and upper-casing it.
    pub fn parse(s: &str) -> Result<Self, InvalidRouteId> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(InvalidRouteId {
                reason: "must not be empty",
            });
        }

        if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(InvalidRouteId {
                reason: "must not contain whitespace",
            });
        }

        Ok(RouteId(trimmed.to_uppercase()))
    }

    /// Returns the normalized route id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteId({})", self.0)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case() {
        assert_eq!(RouteId::parse("a").unwrap().as_str(), "A");
        assert_eq!(RouteId::parse("gs").unwrap().as_str(), "GS");
        assert_eq!(RouteId::parse("7").unwrap().as_str(), "7");
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(RouteId::parse(" L ").unwrap().as_str(), "L");
    }

    #[test]
    fn reject_blank() {
        assert!(RouteId::parse("").is_err());
        assert!(RouteId::parse("   ").is_err());
    }

    #[test]
    fn reject_inner_whitespace() {
        assert!(RouteId::parse("A C").is_err());
    }

    #[test]
    fn case_variants_are_equal() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(RouteId::parse("g").unwrap());
        assert!(set.contains(&RouteId::parse("G").unwrap()));
    }

    #[test]
    fn serializes_as_plain_string() {
        let route = RouteId::parse("nqrw").unwrap();
        assert_eq!(serde_json::to_string(&route).unwrap(), "\"NQRW\"");
    }
}
