use crate::assignment::RoleAssignment;
use crate::role::PermissionGrant;
use crate::types::{RoleId, TenantId, UserId};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Cache interface for catalog grants and assignment rows.
///
/// Grants are keyed per (tenant, role) and live until explicitly
/// invalidated. Assignment rows are keyed per (tenant, user, calendar day):
/// the day in the key bounds cache cardinality while keeping same-day
/// checks correct, since validity windows are date-granular.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets cached grants for a role.
    async fn get_grants(&self, tenant: &TenantId, role: &RoleId) -> Option<Vec<PermissionGrant>>;

    /// Sets cached grants for a role.
    async fn set_grants(&self, tenant: &TenantId, role: &RoleId, grants: Vec<PermissionGrant>);

    /// Gets cached active assignment rows for a user on a calendar day.
    async fn get_assignments(
        &self,
        tenant: &TenantId,
        user: &UserId,
        day: NaiveDate,
    ) -> Option<Vec<RoleAssignment>>;

    /// Sets cached active assignment rows for a user on a calendar day.
    async fn set_assignments(
        &self,
        tenant: &TenantId,
        user: &UserId,
        day: NaiveDate,
        rows: Vec<RoleAssignment>,
    );

    /// Invalidates cached assignments for a user, all days.
    async fn invalidate_user(&self, tenant: &TenantId, user: &UserId);

    /// Invalidates cached grants for a role.
    async fn invalidate_role(&self, tenant: &TenantId, role: &RoleId);

    /// Invalidates everything cached for a tenant.
    async fn invalidate_tenant(&self, tenant: &TenantId);
}

/// No-op cache implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

#[async_trait]
impl Cache for NoCache {
    async fn get_grants(&self, _tenant: &TenantId, _role: &RoleId) -> Option<Vec<PermissionGrant>> {
        None
    }

    async fn set_grants(&self, _tenant: &TenantId, _role: &RoleId, _grants: Vec<PermissionGrant>) {}

    async fn get_assignments(
        &self,
        _tenant: &TenantId,
        _user: &UserId,
        _day: NaiveDate,
    ) -> Option<Vec<RoleAssignment>> {
        None
    }

    async fn set_assignments(
        &self,
        _tenant: &TenantId,
        _user: &UserId,
        _day: NaiveDate,
        _rows: Vec<RoleAssignment>,
    ) {
    }

    async fn invalidate_user(&self, _tenant: &TenantId, _user: &UserId) {}

    async fn invalidate_role(&self, _tenant: &TenantId, _role: &RoleId) {}

    async fn invalidate_tenant(&self, _tenant: &TenantId) {}
}
