use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use crate::assignment::RoleAssignment;
use crate::catalog::RoleCatalog;
use crate::error::StoreError;
use crate::role::{PermissionGrant, Role};
use crate::store::AssignmentStore;
use crate::types::{AssignmentId, RoleId, TenantId, UserId};

/// In-memory store and catalog implementation for tests and demos.
///
/// Upholds the same invariants a production store must: the uniqueness check
/// in `save` runs under the write lock, and revoke is a soft, idempotent
/// flag flip that keeps history.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    assignments: RwLock<HashMap<AssignmentId, RoleAssignment>>,
    roles: RwLock<HashMap<RoleId, Role>>,
    grants: RwLock<HashMap<RoleId, Vec<PermissionGrant>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a role.
    pub fn put_role(&self, role: Role) {
        let mut guard = self.inner.roles.write().expect("poisoned lock");
        guard.insert(role.id.clone(), role);
    }

    /// Attaches a grant to its role, replacing any grant with the same
    /// permission code so the (role, code) pair stays unique.
    pub fn put_grant(&self, grant: PermissionGrant) {
        let mut guard = self.inner.grants.write().expect("poisoned lock");
        let grants = guard.entry(grant.role.clone()).or_default();
        grants.retain(|existing| existing.code != grant.code);
        grants.push(grant);
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn find_active_assignments(
        &self,
        user: UserId,
        tenant: TenantId,
    ) -> std::result::Result<Vec<RoleAssignment>, StoreError> {
        let guard = self.inner.assignments.read().expect("poisoned lock");
        Ok(guard
            .values()
            .filter(|assignment| {
                assignment.active && assignment.user == user && assignment.tenant == tenant
            })
            .cloned()
            .collect())
    }

    async fn find_assignments_by_role(
        &self,
        role: RoleId,
    ) -> std::result::Result<Vec<RoleAssignment>, StoreError> {
        let guard = self.inner.assignments.read().expect("poisoned lock");
        Ok(guard
            .values()
            .filter(|assignment| assignment.role == role)
            .cloned()
            .collect())
    }

    async fn save(
        &self,
        assignment: RoleAssignment,
    ) -> std::result::Result<RoleAssignment, StoreError> {
        let mut guard = self.inner.assignments.write().expect("poisoned lock");

        // Uniqueness check and insert happen under one write lock; a row may
        // replace itself (date-window edits keep the same id).
        let conflicting = guard.values().any(|existing| {
            existing.id != assignment.id
                && existing.active
                && existing.scope_key() == assignment.scope_key()
        });
        if conflicting && assignment.active {
            return Err(StoreError::Conflict {
                user: assignment.user,
                tenant: assignment.tenant,
                role: assignment.role,
                branch: assignment.branch,
            });
        }

        guard.insert(assignment.id.clone(), assignment.clone());
        Ok(assignment)
    }

    async fn revoke(
        &self,
        id: AssignmentId,
        revoked_by: UserId,
    ) -> std::result::Result<(), StoreError> {
        let mut guard = self.inner.assignments.write().expect("poisoned lock");
        let Some(assignment) = guard.get_mut(&id) else {
            return Err(StoreError::AssignmentNotFound(id));
        };
        if !assignment.active {
            return Ok(());
        }
        assignment.active = false;
        assignment.revoked_by = Some(revoked_by);
        assignment.revoked_at = Some(Utc::now().date_naive());
        Ok(())
    }
}

#[async_trait]
impl RoleCatalog for MemoryStore {
    async fn get_role(&self, role: RoleId) -> std::result::Result<Option<Role>, StoreError> {
        let guard = self.inner.roles.read().expect("poisoned lock");
        Ok(guard.get(&role).cloned())
    }

    async fn get_grants(
        &self,
        role: RoleId,
    ) -> std::result::Result<Vec<PermissionGrant>, StoreError> {
        let guard = self.inner.grants.read().expect("poisoned lock");
        Ok(guard.get(&role).cloned().unwrap_or_default())
    }
}
