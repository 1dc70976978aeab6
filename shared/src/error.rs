//! Errors raised by the lifecycle rules

use thiserror::Error;

use crate::models::Role;

/// Rejection of a requested status change
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The caller's role may never request this status
    #[error("role '{role}' may not set status '{requested}'")]
    RoleNotPermitted {
        role: Role,
        requested: &'static str,
    },

    /// The role may request the status, but not from the current one
    #[error("cannot move from '{from}' to '{to}'")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
}

impl TransitionError {
    pub fn is_permission_error(&self) -> bool {
        matches!(self, TransitionError::RoleNotPermitted { .. })
    }
}
