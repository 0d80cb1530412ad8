use crate::assignment::RoleAssignment;
use crate::decision::{Decision, Reason};
use crate::permission::{PermissionCode, Scope};
use crate::policy::PolicyInput;
use crate::role::PermissionGrant;
use crate::types::{BranchId, TenantId, UserId};
use std::collections::HashMap;
use tracing::error;

/// Attributes of the resource an authorization check is about.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceContext {
    pub tenant: TenantId,
    /// Owning user, when the resource has one. Required by SELF-scoped grants.
    pub owner: Option<UserId>,
    /// Branch the resource belongs to, when branch-partitioned.
    pub branch: Option<BranchId>,
    /// Free-form attributes consulted by ABAC policies.
    pub attrs: HashMap<String, String>,
}

impl ResourceContext {
    /// Creates a context for a resource within a tenant.
    pub fn new(tenant: TenantId) -> Self {
        Self {
            tenant,
            owner: None,
            branch: None,
            attrs: HashMap::new(),
        }
    }

    /// Sets the owning user.
    pub fn with_owner(mut self, owner: UserId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Sets the resource's branch.
    pub fn with_branch(mut self, branch: BranchId) -> Self {
        self.branch = Some(branch);
        self
    }

    /// Adds a free-form attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }
}

/// Evaluates a resolved assignment against a requested permission.
///
/// The grant lookup is exact-match on the permission code. The scope check
/// and the grant's policy (when present) combine with AND semantics, so a
/// policy can only narrow what the scope already allows. An unevaluable
/// policy denies with [`Reason::PolicyEvaluationError`].
pub(crate) fn evaluate(
    assignment: &RoleAssignment,
    grants: &[PermissionGrant],
    code: &PermissionCode,
    resource: &ResourceContext,
) -> Decision {
    let Some(grant) = grants.iter().find(|grant| grant.code == *code) else {
        return Decision::deny_matched(Reason::PermissionNotGranted, assignment.clone(), None);
    };

    if !scope_allows(assignment, grant.scope, resource) {
        return Decision::deny_matched(
            Reason::ScopeMismatch,
            assignment.clone(),
            Some(grant.clone()),
        );
    }

    if let Some(policy) = &grant.policy {
        let actor = actor_attributes(assignment);
        let resource_attrs = resource_attributes(resource);
        let input = PolicyInput {
            actor: &actor,
            resource: &resource_attrs,
        };
        match policy.evaluate(&input) {
            Ok(true) => {}
            Ok(false) => {
                return Decision::deny_matched(
                    Reason::PolicyRejected,
                    assignment.clone(),
                    Some(grant.clone()),
                );
            }
            Err(err) => {
                error!(
                    role = %grant.role,
                    code = %grant.code,
                    %err,
                    "grant policy could not be evaluated; failing closed"
                );
                return Decision::deny_matched(
                    Reason::PolicyEvaluationError,
                    assignment.clone(),
                    Some(grant.clone()),
                );
            }
        }
    }

    Decision::allow(assignment.clone(), grant.clone())
}

fn scope_allows(assignment: &RoleAssignment, scope: Scope, resource: &ResourceContext) -> bool {
    match scope {
        Scope::SelfOnly => resource.owner.as_ref() == Some(&assignment.user),
        Scope::Branch => match &assignment.branch {
            Some(branch) => resource.branch.as_ref() == Some(branch),
            // Tenant-wide assignment: any branch of the same tenant.
            None => resource.branch.is_some() && resource.tenant == assignment.tenant,
        },
        Scope::Tenant => resource.tenant == assignment.tenant,
        Scope::All => true,
    }
}

fn actor_attributes(assignment: &RoleAssignment) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    attrs.insert("user".to_string(), assignment.user.as_str().to_string());
    attrs.insert("tenant".to_string(), assignment.tenant.as_str().to_string());
    attrs.insert("role".to_string(), assignment.role.as_str().to_string());
    if let Some(branch) = &assignment.branch {
        attrs.insert("branch".to_string(), branch.as_str().to_string());
    }
    attrs
}

fn resource_attributes(resource: &ResourceContext) -> HashMap<String, String> {
    let mut attrs = resource.attrs.clone();
    attrs.insert("tenant".to_string(), resource.tenant.as_str().to_string());
    if let Some(owner) = &resource.owner {
        attrs.insert("owner".to_string(), owner.as_str().to_string());
    }
    if let Some(branch) = &resource.branch {
        attrs.insert("branch".to_string(), branch.as_str().to_string());
    }
    attrs
}
