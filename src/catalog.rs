use crate::error::StoreError;
use crate::role::{PermissionGrant, Role};
use crate::store::AssignmentStore;
use crate::types::RoleId;
use async_trait::async_trait;

/// Read-only lookup of roles and the permissions attached to them.
///
/// Results are cheap to fetch or cacheable. The engine treats them as
/// immutable snapshots for the duration of one decision — each check fetches
/// once and never re-reads mid-call, so a decision stays consistent even
/// while the catalog is being edited concurrently.
#[async_trait]
pub trait RoleCatalog {
    /// Looks up a role by id.
    async fn get_role(&self, role: RoleId) -> std::result::Result<Option<Role>, StoreError>;

    /// Returns the permission grants attached to a role.
    async fn get_grants(
        &self,
        role: RoleId,
    ) -> std::result::Result<Vec<PermissionGrant>, StoreError>;
}

/// Composite collaborator trait consumed by the engine.
pub trait Directory: AssignmentStore + RoleCatalog + Send + Sync {}

impl<T> Directory for T where T: AssignmentStore + RoleCatalog + Send + Sync {}
