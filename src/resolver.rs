use crate::assignment::RoleAssignment;
use crate::error::Error;
use crate::types::BranchId;
use chrono::NaiveDate;

/// Selects the single effective assignment among a user's active rows.
///
/// Pure over its inputs: the caller fetches the rows, so as-of behavior is
/// testable without a clock or a store. Selection order:
///
/// 1. Drop rows whose validity window does not contain `as_of` or that are
///    suspended.
/// 2. When a branch is requested, branch-specific rows hard-override
///    tenant-wide rows regardless of dates. Rows scoped to *other* branches
///    are never eligible.
/// 3. Without a requested branch only tenant-wide rows are eligible — a
///    branch-scoped assignment must not leak into an unscoped check.
/// 4. Within the winning partition the most recent `effective_from` wins.
///    A tie among different roles is [`Error::AmbiguousAssignments`]: the
///    caller logs it and fails closed instead of guessing.
pub(crate) fn select_effective(
    candidates: Vec<RoleAssignment>,
    branch: Option<&BranchId>,
    as_of: NaiveDate,
) -> Result<Option<RoleAssignment>, Error> {
    let eligible: Vec<RoleAssignment> = candidates
        .into_iter()
        .filter(|assignment| assignment.is_effective(as_of))
        .collect();

    let pool: Vec<RoleAssignment> = match branch {
        Some(branch) => {
            let (branch_rows, rest): (Vec<_>, Vec<_>) = eligible
                .into_iter()
                .partition(|assignment| assignment.branch.as_ref() == Some(branch));
            if branch_rows.is_empty() {
                rest.into_iter()
                    .filter(|assignment| assignment.branch.is_none())
                    .collect()
            } else {
                branch_rows
            }
        }
        None => eligible
            .into_iter()
            .filter(|assignment| assignment.branch.is_none())
            .collect(),
    };

    let Some(latest) = pool.iter().map(|assignment| assignment.window.from()).max() else {
        return Ok(None);
    };
    let mut winners: Vec<RoleAssignment> = pool
        .into_iter()
        .filter(|assignment| assignment.window.from() == latest)
        .collect();

    if winners.len() > 1 {
        let first = &winners[0];
        return Err(Error::AmbiguousAssignments {
            user: first.user.clone(),
            tenant: first.tenant.clone(),
            ids: winners
                .iter()
                .map(|assignment| assignment.id.clone())
                .collect(),
        });
    }
    Ok(winners.pop())
}
