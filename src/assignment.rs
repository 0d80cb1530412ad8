use crate::error::{Error, Result};
use crate::types::{AssignmentId, BranchId, RoleId, TenantId, UserId};
use chrono::NaiveDate;

/// Date interval during which an assignment is in force.
///
/// Both ends are inclusive; a missing `to` means open-ended validity.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidityWindow {
    from: NaiveDate,
    to: Option<NaiveDate>,
}

impl ValidityWindow {
    /// Creates a bounded or open-ended window; rejects `from > to`.
    pub fn new(from: NaiveDate, to: Option<NaiveDate>) -> Result<Self> {
        if let Some(to) = to
            && from > to
        {
            return Err(Error::InvalidWindow { from, to });
        }
        Ok(Self { from, to })
    }

    /// Creates an open-ended window starting at `from`.
    pub fn open_from(from: NaiveDate) -> Self {
        Self { from, to: None }
    }

    /// Start date.
    pub fn from(&self) -> NaiveDate {
        self.from
    }

    /// End date, if bounded.
    pub fn to(&self) -> Option<NaiveDate> {
        self.to
    }

    /// Whether `as_of` falls inside the window.
    pub fn contains(&self, as_of: NaiveDate) -> bool {
        self.from <= as_of && self.to.is_none_or(|to| as_of <= to)
    }
}

/// One grant of a role to a user: "user holds role in tenant, optionally
/// scoped to a branch, during the validity window".
///
/// Assignments are never physically deleted. A revoke flips `active` and
/// stamps the audit fields so history stays queryable.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoleAssignment {
    /// Opaque identity, immutable once created.
    pub id: AssignmentId,
    pub user: UserId,
    pub tenant: TenantId,
    pub role: RoleId,
    /// `None` means the assignment applies to every branch of the tenant.
    pub branch: Option<BranchId>,
    pub window: ValidityWindow,
    /// Suspension flag, independent of the date window.
    pub active: bool,
    pub assigned_by: UserId,
    pub reason: Option<String>,
    pub revoked_by: Option<UserId>,
    pub revoked_at: Option<NaiveDate>,
}

impl RoleAssignment {
    /// Creates an active, unrevoked assignment.
    pub fn new(
        id: AssignmentId,
        user: UserId,
        tenant: TenantId,
        role: RoleId,
        branch: Option<BranchId>,
        window: ValidityWindow,
        assigned_by: UserId,
    ) -> Self {
        Self {
            id,
            user,
            tenant,
            role,
            branch,
            window,
            active: true,
            assigned_by,
            reason: None,
            revoked_by: None,
            revoked_at: None,
        }
    }

    /// Attaches a human-readable grant reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Whether the assignment is in force at `as_of`: not suspended and
    /// inside its validity window.
    pub fn is_effective(&self, as_of: NaiveDate) -> bool {
        self.active && self.window.contains(as_of)
    }

    /// Uniqueness tuple: at most one non-revoked assignment may exist per key.
    pub(crate) fn scope_key(&self) -> (&UserId, &TenantId, &RoleId, Option<&BranchId>) {
        (&self.user, &self.tenant, &self.role, self.branch.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assignment(window: ValidityWindow) -> RoleAssignment {
        RoleAssignment::new(
            AssignmentId::try_from("asg_1").unwrap(),
            UserId::try_from("user_7").unwrap(),
            TenantId::try_from("tenant_1").unwrap(),
            RoleId::try_from("role_teacher").unwrap(),
            None,
            window,
            UserId::try_from("admin_1").unwrap(),
        )
    }

    #[test]
    fn window_should_reject_from_after_to() {
        let result = ValidityWindow::new(date(2025, 6, 1), Some(date(2025, 3, 1)));
        assert!(matches!(result, Err(Error::InvalidWindow { .. })));
    }

    #[test]
    fn window_contains_both_inclusive_ends() {
        let window = ValidityWindow::new(date(2025, 3, 1), Some(date(2025, 6, 1))).unwrap();

        assert!(window.contains(date(2025, 3, 1)));
        assert!(window.contains(date(2025, 6, 1)));
        assert!(!window.contains(date(2025, 2, 28)));
        assert!(!window.contains(date(2025, 6, 2)));
    }

    #[test]
    fn open_ended_window_contains_far_future_dates() {
        let window = ValidityWindow::open_from(date(2025, 1, 1));

        assert!(window.contains(date(2025, 1, 1)));
        assert!(window.contains(date(2099, 12, 31)));
        assert!(!window.contains(date(2024, 12, 31)));
    }

    #[test]
    fn suspended_assignment_is_not_effective_inside_its_window() {
        let mut assignment = assignment(ValidityWindow::open_from(date(2025, 1, 1)));
        assert!(assignment.is_effective(date(2025, 4, 1)));

        assignment.active = false;
        assert!(!assignment.is_effective(date(2025, 4, 1)));
    }
}
