use crate::assignment::RoleAssignment;
use crate::error::StoreError;
use crate::types::{AssignmentId, RoleId, TenantId, UserId};
use async_trait::async_trait;

/// Persistence interface for role assignments.
///
/// Implementations own the uniqueness invariant: at most one non-revoked row
/// per (user, tenant, role, branch) tuple, enforced atomically inside
/// [`save`](AssignmentStore::save). They do not own any date logic — window
/// filtering happens in the resolver, so stores stay clock-free and
/// "as-of" behavior stays testable.
#[async_trait]
pub trait AssignmentStore {
    /// Returns all rows with `active = true` for a user within a tenant,
    /// regardless of validity window.
    async fn find_active_assignments(
        &self,
        user: UserId,
        tenant: TenantId,
    ) -> std::result::Result<Vec<RoleAssignment>, StoreError>;

    /// Returns every row ever created for a role, revoked history included.
    /// Used for "how many users hold this role" reporting.
    async fn find_assignments_by_role(
        &self,
        role: RoleId,
    ) -> std::result::Result<Vec<RoleAssignment>, StoreError>;

    /// Persists a new assignment or a date-window edit of an existing one.
    ///
    /// Fails with [`StoreError::Conflict`] when another non-revoked row
    /// already occupies the same (user, tenant, role, branch) tuple.
    async fn save(
        &self,
        assignment: RoleAssignment,
    ) -> std::result::Result<RoleAssignment, StoreError>;

    /// Soft-revokes an assignment, stamping the audit fields.
    ///
    /// Idempotent: revoking an already-revoked assignment is a no-op.
    async fn revoke(
        &self,
        id: AssignmentId,
        revoked_by: UserId,
    ) -> std::result::Result<(), StoreError>;
}
