//! Common types used across the platform

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How strictly staff status updates are checked against the lifecycle ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Statuses only move forward; terminal states are closed
    #[default]
    ForwardOnly,
    /// Any staff-settable status may be set at any time
    Permissive,
}

impl TransitionPolicy {
    pub fn from_enforce_flag(enforce_forward_only: bool) -> Self {
        if enforce_forward_only {
            TransitionPolicy::ForwardOnly
        } else {
            TransitionPolicy::Permissive
        }
    }
}

/// Returned when a stored or submitted string does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Search filter shared by list endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListFilter {
    pub status: Option<String>,
    pub search: Option<String>,
}

impl ListFilter {
    /// Case-insensitive substring match against any of the given fields
    pub fn matches_search(&self, fields: &[Option<&str>]) -> bool {
        let term = match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => term.to_lowercase(),
            _ => return true,
        };

        fields
            .iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_flag() {
        assert_eq!(TransitionPolicy::from_enforce_flag(true), TransitionPolicy::ForwardOnly);
        assert_eq!(TransitionPolicy::from_enforce_flag(false), TransitionPolicy::Permissive);
        assert_eq!(TransitionPolicy::default(), TransitionPolicy::ForwardOnly);
    }

    #[test]
    fn test_search_matches_any_field() {
        let filter = ListFilter {
            status: None,
            search: Some("ord-17".to_string()),
        };
        assert!(filter.matches_search(&[Some("ORD-1700000000000-abc"), None]));
        assert!(!filter.matches_search(&[Some("PO-1"), Some("jane@example.com")]));
    }

    #[test]
    fn test_empty_search_matches_everything() {
        let filter = ListFilter {
            status: None,
            search: Some("   ".to_string()),
        };
        assert!(filter.matches_search(&[None]));
        assert!(ListFilter::default().matches_search(&[]));
    }
}
