//! Access explanation: provenance for UI badges ("access via team") and audit logs.

use std::collections::BTreeSet;

use serde::Serialize;

use newsroom_core::GroupId;

use crate::grant::{AccessKind, Subject, Target};
use crate::summary::{OriginAccess, UserPermissionSummary};

/// Where an entry in a summary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Granted to the user directly.
    User,
    /// Inherited through one of the user's groups.
    Group,
}

/// Explanation of one authorization decision for the requesting user.
///
/// Built only from that user's own summary, so it can be shown back to them
/// without revealing anything about other users' grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessExplanation {
    pub access: AccessKind,
    pub target: Target,
    pub granted: bool,
    /// Origins that grant the access, in `User`, `Group` order.
    pub origins: Vec<Origin>,
    /// Member groups whose own grants yield this access; empty without `Origin::Group`.
    pub via_groups: BTreeSet<GroupId>,
    pub reason: String,
}

/// Explain whether (and through which origin) `access` on `target` is granted.
pub fn explain_access(
    summary: &UserPermissionSummary,
    access: AccessKind,
    target: Target,
) -> AccessExplanation {
    let mut origins = Vec::new();
    if grants(&summary.user, access, target) {
        origins.push(Origin::User);
    }
    if grants(&summary.group, access, target) {
        origins.push(Origin::Group);
    }

    let via_groups = summary
        .group_provenance
        .iter()
        .filter(|grant| grant.access == access && grant.target == target)
        .filter_map(|grant| match grant.subject {
            Subject::Group(group_id) => Some(group_id),
            Subject::User(_) => None,
        })
        .collect();

    let reason = match origins.as_slice() {
        [] => format!("no {access} access to {target}"),
        [Origin::User] => format!("{access} access to {target} granted directly"),
        [Origin::Group] => format!("{access} access to {target} inherited from group membership"),
        _ => format!("{access} access to {target} granted directly and through group membership"),
    };

    AccessExplanation {
        access,
        target,
        granted: !origins.is_empty(),
        origins,
        via_groups,
        reason,
    }
}

fn grants(sets: &OriginAccess, access: AccessKind, target: Target) -> bool {
    match (access, target) {
        (AccessKind::Read, Target::Workflow(id)) => sets.read_workflows.contains(&id),
        (AccessKind::Write, Target::Workflow(id)) => sets.write_workflows.contains(&id),
        (AccessKind::Read, Target::Stage(id)) => sets.read_stages.contains(&id),
        (AccessKind::Write, Target::Stage(id)) => sets.write_stages.contains(&id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::{Grant, GroupGrants};
    use crate::normalize::{StageParentIndex, normalize};
    use crate::resolve::resolve;
    use newsroom_core::{StageId, UserId, WorkflowId};
    use std::collections::HashMap;
    use std::sync::Arc;

    #[test]
    fn explains_both_origins() {
        let stage = StageId::new();
        let group_id = GroupId::new();
        let summary = UserPermissionSummary {
            user_id: UserId::new(),
            user: OriginAccess {
                read_stages: BTreeSet::from([stage]),
                ..OriginAccess::default()
            },
            group: OriginAccess {
                read_stages: BTreeSet::from([stage]),
                write_stages: BTreeSet::from([stage]),
                ..OriginAccess::default()
            },
            memberships: BTreeSet::from([group_id]),
            group_provenance: BTreeSet::from([
                Grant::group(group_id, Target::Stage(stage), AccessKind::Read),
                Grant::group(group_id, Target::Stage(stage), AccessKind::Write),
            ]),
        };

        let read = explain_access(&summary, AccessKind::Read, Target::Stage(stage));
        assert!(read.granted);
        assert_eq!(read.origins, vec![Origin::User, Origin::Group]);

        let write = explain_access(&summary, AccessKind::Write, Target::Stage(stage));
        assert_eq!(write.origins, vec![Origin::Group]);
        assert_eq!(write.via_groups, BTreeSet::from([group_id]));
        assert!(write.reason.contains("inherited"));
    }

    #[test]
    fn via_groups_lists_only_groups_granting_the_target() {
        let (wf, stage) = (WorkflowId::new(), StageId::new());
        let (sports, politics) = (GroupId::new(), GroupId::new());
        let user_id = UserId::new();
        let by_group: HashMap<GroupId, GroupGrants> = HashMap::from([
            (sports, Arc::from(vec![Grant::group(sports, Target::Workflow(wf), AccessKind::Read)])),
            (politics, Arc::from(Vec::new())),
        ]);
        let index: StageParentIndex = [(stage, wf)].into_iter().collect();

        let summary = normalize(
            resolve(user_id, &[], &[sports, politics], &by_group).unwrap(),
            &index,
        );
        let explanation = explain_access(&summary, AccessKind::Read, Target::Workflow(wf));

        assert_eq!(summary.memberships, BTreeSet::from([sports, politics]));
        assert_eq!(explanation.origins, vec![Origin::Group]);
        assert_eq!(explanation.via_groups, BTreeSet::from([sports]));
    }

    #[test]
    fn via_groups_follows_implied_parent_read() {
        let (wf, stage) = (WorkflowId::new(), StageId::new());
        let (desk, other) = (GroupId::new(), GroupId::new());
        let by_group: HashMap<GroupId, GroupGrants> = HashMap::from([
            (desk, Arc::from(vec![Grant::group(desk, Target::Stage(stage), AccessKind::Write)])),
            (other, Arc::from(vec![Grant::group(other, Target::Workflow(WorkflowId::new()), AccessKind::Read)])),
        ]);
        let index: StageParentIndex = [(stage, wf)].into_iter().collect();

        let summary = normalize(
            resolve(UserId::new(), &[], &[desk, other], &by_group).unwrap(),
            &index,
        );

        let parent = explain_access(&summary, AccessKind::Read, Target::Workflow(wf));
        assert_eq!(parent.via_groups, BTreeSet::from([desk]));
        let stage_read = explain_access(&summary, AccessKind::Read, Target::Stage(stage));
        assert_eq!(stage_read.via_groups, BTreeSet::from([desk]));
    }

    #[test]
    fn denial_mentions_nothing_but_the_request() {
        let wf = WorkflowId::new();
        let summary = UserPermissionSummary {
            user_id: UserId::new(),
            user: OriginAccess::default(),
            group: OriginAccess::default(),
            memberships: BTreeSet::from([GroupId::new()]),
            group_provenance: BTreeSet::new(),
        };

        let explanation = explain_access(&summary, AccessKind::Write, Target::Workflow(wf));

        assert!(!explanation.granted);
        assert!(explanation.origins.is_empty());
        assert!(explanation.via_groups.is_empty());
        assert_eq!(explanation.reason, format!("no write access to workflow {wf}"));
    }
}
