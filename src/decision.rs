use crate::assignment::RoleAssignment;
use crate::role::PermissionGrant;
use std::fmt;

/// Why a decision came out the way it did.
///
/// Denial reasons carry enough detail for logging and alerting without
/// leaking policy internals to the end user.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reason {
    /// Scope and policy checks passed.
    Allowed,
    /// No effective assignment for the user/tenant/branch/date.
    NoRole,
    /// The resolved assignment points at a missing or deactivated role.
    RoleInactive,
    /// The role carries no grant for the requested permission code.
    PermissionNotGranted,
    /// The grant's scope does not reach the resource.
    ScopeMismatch,
    /// The grant's policy evaluated to false.
    PolicyRejected,
    /// The grant's policy could not be evaluated; fails closed and is
    /// surfaced to operators as a data-quality problem.
    PolicyEvaluationError,
    /// Multiple equally-specific active assignments; a data-integrity bug.
    AmbiguousAssignments,
    /// A collaborator call failed; the check fails closed.
    StoreUnavailable,
    /// A collaborator call exceeded the decision deadline.
    Timeout,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reason::Allowed => "ALLOWED",
            Reason::NoRole => "NO_ROLE",
            Reason::RoleInactive => "ROLE_INACTIVE",
            Reason::PermissionNotGranted => "PERMISSION_NOT_GRANTED",
            Reason::ScopeMismatch => "SCOPE_MISMATCH",
            Reason::PolicyRejected => "POLICY_REJECTED",
            Reason::PolicyEvaluationError => "POLICY_EVALUATION_ERROR",
            Reason::AmbiguousAssignments => "AMBIGUOUS_ASSIGNMENTS",
            Reason::StoreUnavailable => "STORE_UNAVAILABLE",
            Reason::Timeout => "TIMEOUT",
        };
        f.write_str(name)
    }
}

/// Outcome of one authorization check. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decision {
    pub allowed: bool,
    /// The effective assignment the decision was based on, when one resolved.
    pub matched_assignment: Option<RoleAssignment>,
    /// The grant that matched the requested permission code, when one did.
    pub matched_grant: Option<PermissionGrant>,
    pub reason: Reason,
}

impl Decision {
    pub(crate) fn allow(assignment: RoleAssignment, grant: PermissionGrant) -> Self {
        Self {
            allowed: true,
            matched_assignment: Some(assignment),
            matched_grant: Some(grant),
            reason: Reason::Allowed,
        }
    }

    pub(crate) fn deny(reason: Reason) -> Self {
        Self {
            allowed: false,
            matched_assignment: None,
            matched_grant: None,
            reason,
        }
    }

    pub(crate) fn deny_matched(
        reason: Reason,
        assignment: RoleAssignment,
        grant: Option<PermissionGrant>,
    ) -> Self {
        Self {
            allowed: false,
            matched_assignment: Some(assignment),
            matched_grant: grant,
            reason,
        }
    }

    /// Whether the check passed.
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }
}
