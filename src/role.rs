use crate::permission::{PermissionCode, Scope};
use crate::policy::Policy;
use crate::types::{RoleId, TemplateId, TenantId, UserId};
use chrono::NaiveDate;

/// Named bundle of permissions within one tenant.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Role {
    pub id: RoleId,
    /// `None` marks a system-level role not owned by any tenant.
    pub tenant: Option<TenantId>,
    pub name: String,
    /// Soft-delete flag; inactive roles deny at decision time.
    pub active: bool,
    pub display_order: i32,
    /// Back-reference to the template this role was cloned from, kept for
    /// diagnostics only. Cloned roles never re-sync with their template.
    pub template: Option<TemplateId>,
}

impl Role {
    /// Creates an active tenant role.
    pub fn new(id: RoleId, tenant: TenantId, name: impl Into<String>) -> Self {
        Self {
            id,
            tenant: Some(tenant),
            name: name.into(),
            active: true,
            display_order: 0,
            template: None,
        }
    }

    /// Sets the display ordering used by administrative listings.
    pub fn with_display_order(mut self, display_order: i32) -> Self {
        self.display_order = display_order;
        self
    }

    /// Clones a role from a global template for one tenant.
    ///
    /// Grants are copied by value; later edits to the template never
    /// retroactively change roles already cloned from it. Template grants
    /// carry no policy, so cloned grants start without one and can be
    /// customized afterwards.
    pub fn from_template(
        id: RoleId,
        tenant: TenantId,
        template: &RoleTemplate,
        granted_by: UserId,
        granted_on: NaiveDate,
    ) -> (Self, Vec<PermissionGrant>) {
        let role = Self {
            id: id.clone(),
            tenant: Some(tenant),
            name: template.name.clone(),
            active: true,
            display_order: template.display_order,
            template: Some(template.id.clone()),
        };
        let grants = template
            .grants
            .iter()
            .map(|grant| {
                PermissionGrant::new(
                    id.clone(),
                    grant.code.clone(),
                    grant.scope,
                    granted_by.clone(),
                    granted_on,
                )
            })
            .collect();
        (role, grants)
    }
}

/// One permission attached to a role.
///
/// The (role, code) pair is unique within a catalog.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PermissionGrant {
    pub role: RoleId,
    pub code: PermissionCode,
    pub scope: Scope,
    /// Optional ABAC condition; narrows the scope, never widens it.
    pub policy: Option<Policy>,
    pub granted_by: UserId,
    pub granted_on: NaiveDate,
}

impl PermissionGrant {
    /// Creates a grant without a policy.
    pub fn new(
        role: RoleId,
        code: PermissionCode,
        scope: Scope,
        granted_by: UserId,
        granted_on: NaiveDate,
    ) -> Self {
        Self {
            role,
            code,
            scope,
            policy: None,
            granted_by,
            granted_on,
        }
    }

    /// Attaches an ABAC policy to the grant.
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = Some(policy);
        self
    }
}

/// Permission carried by a role template. Templates hold no policies.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemplateGrant {
    pub code: PermissionCode,
    pub scope: Scope,
}

/// Global role prototype cloned into tenants at role-creation time.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoleTemplate {
    pub id: TemplateId,
    pub name: String,
    pub display_order: i32,
    pub grants: Vec<TemplateGrant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn teacher_template() -> RoleTemplate {
        RoleTemplate {
            id: TemplateId::try_from("tpl_teacher").unwrap(),
            name: "Teacher".to_string(),
            display_order: 3,
            grants: vec![
                TemplateGrant {
                    code: PermissionCode::try_from("ENROLLMENT_CREATE").unwrap(),
                    scope: Scope::Branch,
                },
                TemplateGrant {
                    code: PermissionCode::try_from("ENROLLMENT_READ").unwrap(),
                    scope: Scope::Tenant,
                },
            ],
        }
    }

    #[test]
    fn from_template_copies_grants_by_value() {
        let mut template = teacher_template();
        let (role, grants) = Role::from_template(
            RoleId::try_from("role_teacher").unwrap(),
            TenantId::try_from("tenant_1").unwrap(),
            &template,
            UserId::try_from("admin_1").unwrap(),
            date(2025, 1, 1),
        );

        assert_eq!(role.template, Some(template.id.clone()));
        assert_eq!(grants.len(), 2);
        assert!(grants.iter().all(|grant| grant.policy.is_none()));

        // Editing the template afterwards must not leak into the clone.
        template.grants.clear();
        assert_eq!(grants.len(), 2);
    }

    #[test]
    fn from_template_keeps_template_display_order() {
        let template = teacher_template();
        let (role, _) = Role::from_template(
            RoleId::try_from("role_teacher").unwrap(),
            TenantId::try_from("tenant_1").unwrap(),
            &template,
            UserId::try_from("admin_1").unwrap(),
            date(2025, 1, 1),
        );

        assert_eq!(role.display_order, 3);
        assert!(role.active);
    }
}
