use crate::assignment::RoleAssignment;
use crate::cache::{Cache, NoCache};
use crate::catalog::Directory;
use crate::decision::{Decision, Reason};
use crate::error::{Error, Result, StoreError};
use crate::evaluator::{self, ResourceContext};
use crate::permission::PermissionCode;
use crate::resolver;
use crate::role::PermissionGrant;
use crate::types::{AssignmentId, BranchId, RoleId, TenantId, UserId};
use chrono::{NaiveDate, Utc};
#[cfg(feature = "timeout")]
use std::time::Duration;
use tracing::{error, info};
#[cfg(feature = "timeout")]
use tracing::warn;

/// Authorization engine with pluggable store/catalog and optional cache.
///
/// This is the single entry point for authorization checks. Callers invoke
/// [`can_user`](Engine::can_user) and never the resolver or evaluator
/// directly, which keeps every decision flowing through one auditable
/// choke point.
#[derive(Debug)]
pub struct Engine<S, C = NoCache> {
    store: S,
    cache: C,
    #[cfg(feature = "timeout")]
    decision_timeout: Option<Duration>,
}

/// Builder for [`Engine`].
pub struct EngineBuilder<S, C = NoCache> {
    store: S,
    cache: C,
    #[cfg(feature = "timeout")]
    decision_timeout: Option<Duration>,
}

impl<S> EngineBuilder<S, NoCache> {
    /// Creates a new builder with default configuration.
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: NoCache,
            #[cfg(feature = "timeout")]
            decision_timeout: None,
        }
    }
}

impl<S, C> EngineBuilder<S, C> {
    /// Sets the cache implementation.
    pub fn cache<C2: Cache>(self, cache: C2) -> EngineBuilder<S, C2> {
        EngineBuilder {
            store: self.store,
            cache,
            #[cfg(feature = "timeout")]
            decision_timeout: self.decision_timeout,
        }
    }

    /// Sets a deadline for one decision. A check that exceeds it denies with
    /// [`Reason::Timeout`] instead of hanging the caller.
    #[cfg(feature = "timeout")]
    pub fn decision_timeout(mut self, timeout: Duration) -> Self {
        self.decision_timeout = Some(timeout);
        self
    }

    /// Builds the engine.
    pub fn build(self) -> Engine<S, C> {
        Engine {
            store: self.store,
            cache: self.cache,
            #[cfg(feature = "timeout")]
            decision_timeout: self.decision_timeout,
        }
    }
}

impl<S, C> Engine<S, C>
where
    S: Directory,
    C: Cache,
{
    /// Decides whether a user may exercise a permission on a resource.
    ///
    /// `branch` scopes the check to one branch; `None` means an unscoped,
    /// tenant-level check where branch-scoped assignments are not eligible.
    /// `as_of` defaults to today.
    ///
    /// This never returns an error: every internal failure (store outage,
    /// ambiguous data, unevaluable policy, timeout) folds into a denied
    /// [`Decision`] whose reason carries the diagnostic.
    pub async fn can_user(
        &self,
        user: UserId,
        tenant: TenantId,
        branch: Option<BranchId>,
        code: PermissionCode,
        resource: &ResourceContext,
        as_of: Option<NaiveDate>,
    ) -> Decision {
        let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());

        #[cfg(feature = "timeout")]
        if let Some(timeout) = self.decision_timeout {
            let check = self.decide(&user, &tenant, branch.as_ref(), &code, resource, as_of);
            return match tokio::time::timeout(timeout, check).await {
                Ok(decision) => decision,
                Err(_) => {
                    warn!(%user, %tenant, %code, ?timeout, "authorization check timed out; denying");
                    Decision::deny(Reason::Timeout)
                }
            };
        }

        self.decide(&user, &tenant, branch.as_ref(), &code, resource, as_of)
            .await
    }

    async fn decide(
        &self,
        user: &UserId,
        tenant: &TenantId,
        branch: Option<&BranchId>,
        code: &PermissionCode,
        resource: &ResourceContext,
        as_of: NaiveDate,
    ) -> Decision {
        let rows = match self.fetch_assignments(user, tenant, as_of).await {
            Ok(rows) => rows,
            Err(err) => {
                error!(%user, %tenant, %err, "assignment store failed; denying");
                return Decision::deny(Reason::StoreUnavailable);
            }
        };

        let assignment = match resolver::select_effective(rows, branch, as_of) {
            Ok(Some(assignment)) => assignment,
            Ok(None) => return Decision::deny(Reason::NoRole),
            Err(Error::AmbiguousAssignments { user, tenant, ids }) => {
                error!(%user, %tenant, ?ids, "ambiguous active assignments; denying");
                return Decision::deny(Reason::AmbiguousAssignments);
            }
            Err(err) => {
                error!(%user, %tenant, %err, "assignment resolution failed; denying");
                return Decision::deny(Reason::StoreUnavailable);
            }
        };

        match self.store.get_role(assignment.role.clone()).await {
            Ok(Some(role)) if role.active => {}
            Ok(_) => return Decision::deny(Reason::RoleInactive),
            Err(err) => {
                error!(%user, %tenant, role = %assignment.role, %err, "role catalog failed; denying");
                return Decision::deny(Reason::StoreUnavailable);
            }
        }

        let grants = match self.fetch_grants(tenant, &assignment.role).await {
            Ok(grants) => grants,
            Err(err) => {
                error!(%user, %tenant, role = %assignment.role, %err, "grant lookup failed; denying");
                return Decision::deny(Reason::StoreUnavailable);
            }
        };

        evaluator::evaluate(&assignment, &grants, code, resource)
    }

    async fn fetch_assignments(
        &self,
        user: &UserId,
        tenant: &TenantId,
        day: NaiveDate,
    ) -> std::result::Result<Vec<RoleAssignment>, StoreError> {
        if let Some(cached) = self.cache.get_assignments(tenant, user, day).await {
            return Ok(cached);
        }
        let rows = self
            .store
            .find_active_assignments(user.clone(), tenant.clone())
            .await?;
        self.cache
            .set_assignments(tenant, user, day, rows.clone())
            .await;
        Ok(rows)
    }

    async fn fetch_grants(
        &self,
        tenant: &TenantId,
        role: &RoleId,
    ) -> std::result::Result<Vec<PermissionGrant>, StoreError> {
        if let Some(cached) = self.cache.get_grants(tenant, role).await {
            return Ok(cached);
        }
        let grants = self.store.get_grants(role.clone()).await?;
        self.cache.set_grants(tenant, role, grants.clone()).await;
        Ok(grants)
    }

    /// Administrative grant. Unlike [`can_user`](Engine::can_user) this
    /// propagates failure — a conflicting assignment surfaces to the
    /// administrator as [`StoreError::Conflict`], never retried here.
    pub async fn grant(&self, assignment: RoleAssignment) -> Result<RoleAssignment> {
        let saved = self.store.save(assignment).await?;
        info!(
            assignment = %saved.id,
            user = %saved.user,
            tenant = %saved.tenant,
            role = %saved.role,
            branch = ?saved.branch,
            "role granted"
        );
        self.cache.invalidate_user(&saved.tenant, &saved.user).await;
        Ok(saved)
    }

    /// Administrative revoke; idempotent at the store level.
    ///
    /// `tenant` and `user` identify the cache entries to drop, since the
    /// store-level revoke works on the opaque assignment id alone.
    pub async fn revoke(
        &self,
        tenant: &TenantId,
        user: &UserId,
        id: AssignmentId,
        revoked_by: UserId,
    ) -> Result<()> {
        self.store.revoke(id.clone(), revoked_by).await?;
        info!(assignment = %id, %user, %tenant, "role revoked");
        self.cache.invalidate_user(tenant, user).await;
        Ok(())
    }

    /// Invalidation signal: a role or its grants were edited.
    pub async fn invalidate_role(&self, tenant: &TenantId, role: &RoleId) {
        self.cache.invalidate_role(tenant, role).await;
    }

    /// Invalidation signal: a user's assignments changed out of band.
    pub async fn invalidate_user(&self, tenant: &TenantId, user: &UserId) {
        self.cache.invalidate_user(tenant, user).await;
    }

    /// Invalidation signal: tenant-wide catalog or assignment change.
    pub async fn invalidate_tenant(&self, tenant: &TenantId) {
        self.cache.invalidate_tenant(tenant).await;
    }
}
