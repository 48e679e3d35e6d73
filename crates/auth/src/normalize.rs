//! Hierarchy normalizer: completes workflow/stage containment on a summary.

use std::collections::{BTreeSet, HashMap};

use newsroom_core::{Entity, StageId, WorkflowId};
use newsroom_workflows::Stage;

use crate::grant::{AccessKind, Grant, Target};
use crate::summary::{OriginAccess, UserPermissionSummary};

/// Maps each live stage to its parent workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageParentIndex {
    parents: HashMap<StageId, WorkflowId>,
}

impl StageParentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stages<'a>(stages: impl IntoIterator<Item = &'a Stage>) -> Self {
        stages
            .into_iter()
            .map(|stage| (*stage.id(), stage.workflow_id()))
            .collect()
    }

    pub fn insert(&mut self, stage_id: StageId, workflow_id: WorkflowId) {
        self.parents.insert(stage_id, workflow_id);
    }

    pub fn parent_of(&self, stage_id: &StageId) -> Option<WorkflowId> {
        self.parents.get(stage_id).copied()
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

impl FromIterator<(StageId, WorkflowId)> for StageParentIndex {
    fn from_iter<I: IntoIterator<Item = (StageId, WorkflowId)>>(iter: I) -> Self {
        Self {
            parents: iter.into_iter().collect(),
        }
    }
}

/// Complete implied access on a resolved summary.
///
/// Per origin, without ever moving entries between origins:
/// 1. write on a target implies read on the same target;
/// 2. stages missing from `index` (deleted or orphaned) are dropped from every set;
/// 3. a readable stage makes its parent workflow readable.
///
/// A stage write grant yields parent-workflow *read*, never workflow write.
/// Group provenance goes through the same steps, so every implied entry is
/// credited to the group whose grant implied it. Idempotent.
pub fn normalize(
    mut summary: UserPermissionSummary,
    index: &StageParentIndex,
) -> UserPermissionSummary {
    let dropped_user = normalize_origin(&mut summary.user, index);
    let dropped_group = normalize_origin(&mut summary.group, index);
    summary.group_provenance = normalize_provenance(&summary.group_provenance, index);

    if dropped_user + dropped_group > 0 {
        tracing::debug!(
            user_id = %summary.user_id,
            dropped_user,
            dropped_group,
            "dropped grants on stages missing from the stage index"
        );
    }

    summary
}

/// Returns how many distinct stale stage ids were removed.
fn normalize_origin(sets: &mut OriginAccess, index: &StageParentIndex) -> usize {
    sets.read_workflows.extend(sets.write_workflows.iter().copied());
    sets.read_stages.extend(sets.write_stages.iter().copied());

    let stale: BTreeSet<StageId> = sets
        .read_stages
        .iter()
        .filter(|stage_id| index.parent_of(stage_id).is_none())
        .copied()
        .collect();
    sets.read_stages.retain(|stage_id| !stale.contains(stage_id));
    sets.write_stages.retain(|stage_id| !stale.contains(stage_id));

    let parents: Vec<WorkflowId> = sets
        .read_stages
        .iter()
        .filter_map(|stage_id| index.parent_of(stage_id))
        .collect();
    sets.read_workflows.extend(parents);

    stale.len()
}

fn normalize_provenance(grants: &BTreeSet<Grant>, index: &StageParentIndex) -> BTreeSet<Grant> {
    let mut completed = BTreeSet::new();
    for grant in grants {
        if let Target::Stage(stage_id) = grant.target {
            let Some(parent) = index.parent_of(&stage_id) else {
                continue;
            };
            completed.insert(Grant::new(grant.subject, Target::Workflow(parent), AccessKind::Read));
        }
        completed.insert(*grant);
        if grant.access == AccessKind::Write {
            completed.insert(Grant::new(grant.subject, grant.target, AccessKind::Read));
        }
    }
    completed
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
