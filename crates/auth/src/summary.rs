//! The resolved, per-user permission view.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use newsroom_core::{GroupId, StageId, UserId, WorkflowId};

use crate::grant::{Grant, Subject};

/// Workflow and stage sets for one origin (direct or group-inherited).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginAccess {
    pub read_workflows: BTreeSet<WorkflowId>,
    pub read_stages: BTreeSet<StageId>,
    pub write_workflows: BTreeSet<WorkflowId>,
    pub write_stages: BTreeSet<StageId>,
}

/// Consolidated permission summary for one user.
///
/// Pure data produced by the resolver. Direct (`user`) and inherited (`group`)
/// access are kept apart so callers can show where access comes from; the
/// merged view is [`effective_access`], computed when asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermissionSummary {
    pub user_id: UserId,
    pub user: OriginAccess,
    pub group: OriginAccess,
    /// Groups the user belongs to, whether or not they grant anything.
    pub memberships: BTreeSet<GroupId>,
    /// Which group contributes which access. After normalisation the `group`
    /// sets are exactly the targets listed here, per access kind.
    pub group_provenance: BTreeSet<Grant>,
}

/// Groups that contributed at least one entry to the summary's group sets.
pub fn contributing_groups(summary: &UserPermissionSummary) -> BTreeSet<GroupId> {
    summary
        .group_provenance
        .iter()
        .filter_map(|grant| match grant.subject {
            Subject::Group(id) => Some(id),
            Subject::User(_) => None,
        })
        .collect()
}

/// Union of both origins. Never stored on the summary.
pub fn effective_access(summary: &UserPermissionSummary) -> OriginAccess {
    let (u, g) = (&summary.user, &summary.group);
    OriginAccess {
        read_workflows: u.read_workflows.union(&g.read_workflows).copied().collect(),
        read_stages: u.read_stages.union(&g.read_stages).copied().collect(),
        write_workflows: u.write_workflows.union(&g.write_workflows).copied().collect(),
        write_stages: u.write_stages.union(&g.write_stages).copied().collect(),
    }
}
