use crate::policy::PolicyError;
use crate::types::{AssignmentId, BranchId, RoleId, TenantId, UserId};
use chrono::NaiveDate;
use thiserror::Error;

/// Boxed error type for store backends.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Crate result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by store and catalog collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Uniqueness violation on the (user, tenant, role, branch) tuple.
    #[error(
        "assignment conflict: user {user} already holds role {role} in tenant {tenant} (branch: {branch:?})"
    )]
    Conflict {
        user: UserId,
        tenant: TenantId,
        role: RoleId,
        branch: Option<BranchId>,
    },
    /// Unknown assignment id on a revoke.
    #[error("assignment {0} not found")]
    AssignmentNotFound(AssignmentId),
    /// Backend failure wrapper.
    #[error("store backend error: {0}")]
    Backend(#[source] BoxError),
}

/// Errors returned by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Store or catalog error wrapper.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    /// Invalid identifier input.
    #[error("invalid id: {0}")]
    InvalidId(String),
    /// Invalid permission code input.
    #[error("invalid permission code: {0}")]
    InvalidPermission(String),
    /// Validity window with `from` after `to`.
    #[error("invalid validity window: from {from} is after to {to}")]
    InvalidWindow { from: NaiveDate, to: NaiveDate },
    /// Multiple equally-specific active assignments; treated as a data bug,
    /// never silently tie-broken.
    #[error("ambiguous active assignments for user {user} in tenant {tenant}: {ids:?}")]
    AmbiguousAssignments {
        user: UserId,
        tenant: TenantId,
        ids: Vec<AssignmentId>,
    },
    /// Policy evaluation failure.
    #[error(transparent)]
    Policy(#[from] PolicyError),
}
