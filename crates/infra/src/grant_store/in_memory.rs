use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, RwLock};

use newsroom_auth::{Grant, GroupGrants, StageParentIndex, Subject};
use newsroom_core::{Entity, GroupId, StageId, UserId, WorkflowId};
use newsroom_workflows::{Stage, Workflow, order_stages};

use super::r#trait::{GrantStore, StoreError};

#[derive(Debug, Default)]
struct State {
    users: HashSet<UserId>,
    direct: HashMap<UserId, BTreeSet<Grant>>,
    memberships: HashMap<UserId, BTreeSet<GroupId>>,
    // Rebuilt on every change so handed-out snapshots never change underneath a reader.
    group_grants: HashMap<GroupId, GroupGrants>,
    workflows: HashMap<WorkflowId, Workflow>,
    stages: HashMap<StageId, Stage>,
    version: u64,
}

impl State {
    fn ensure_subject(&self, subject: Subject) -> Result<(), StoreError> {
        match subject {
            Subject::User(id) if !self.users.contains(&id) => Err(StoreError::UnknownUser(id)),
            Subject::Group(id) if !self.group_grants.contains_key(&id) => {
                Err(StoreError::UnknownGroup(id))
            }
            _ => Ok(()),
        }
    }

    fn bump(&mut self) {
        self.version += 1;
    }
}

/// In-memory grant store for tests/dev.
///
/// Also carries the administrative operations (grant, revoke, membership,
/// stage lifecycle) that a real deployment performs through its own admin
/// surface. Every mutation bumps [`GrantStore::version`].
#[derive(Debug, Default)]
pub struct InMemoryGrantStore {
    state: RwLock<State>,
}

impl InMemoryGrantStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    pub fn add_user(&self, user_id: UserId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if state.users.insert(user_id) {
            state.bump();
        }
        Ok(())
    }

    pub fn add_group(&self, group_id: GroupId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if !state.group_grants.contains_key(&group_id) {
            state.group_grants.insert(group_id, Arc::from(Vec::new()));
            state.bump();
        }
        Ok(())
    }

    pub fn add_member(&self, user_id: UserId, group_id: GroupId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.ensure_subject(Subject::User(user_id))?;
        state.ensure_subject(Subject::Group(group_id))?;
        if state.memberships.entry(user_id).or_default().insert(group_id) {
            state.bump();
        }
        Ok(())
    }

    pub fn remove_member(&self, user_id: UserId, group_id: GroupId) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        let removed = state
            .memberships
            .get_mut(&user_id)
            .is_some_and(|groups| groups.remove(&group_id));
        if removed {
            state.bump();
        }
        Ok(removed)
    }

    pub fn add_workflow(&self, workflow: Workflow) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.workflows.insert(*workflow.id(), workflow);
        state.bump();
        Ok(())
    }

    /// Register a stage. A stage id is bound to its workflow for life:
    /// re-adding it under another workflow is a conflict.
    pub fn add_stage(&self, stage: Stage) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if !state.workflows.contains_key(&stage.workflow_id()) {
            return Err(StoreError::Conflict(format!(
                "stage {} references unknown workflow {}",
                stage.id(),
                stage.workflow_id()
            )));
        }
        if let Some(existing) = state.stages.get(stage.id()) {
            if existing.workflow_id() != stage.workflow_id() {
                return Err(StoreError::Conflict(format!(
                    "stage {} already belongs to workflow {}",
                    stage.id(),
                    existing.workflow_id()
                )));
            }
        }
        state.stages.insert(*stage.id(), stage);
        state.bump();
        Ok(())
    }

    /// Delete a stage. Grants that reference it are left in place; the
    /// normalizer treats them as vacuous.
    pub fn remove_stage(&self, stage_id: StageId) -> Result<Stage, StoreError> {
        let mut state = self.write()?;
        let stage = state
            .stages
            .remove(&stage_id)
            .ok_or(StoreError::StageNotFound(stage_id))?;
        state.bump();
        Ok(stage)
    }

    pub fn list_workflows(&self) -> Result<Vec<Workflow>, StoreError> {
        let state = self.read()?;
        let mut workflows: Vec<Workflow> = state.workflows.values().cloned().collect();
        workflows.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(b.id())));
        Ok(workflows)
    }

    /// Stages of `workflow_id` in sequence order.
    pub fn list_stages(&self, workflow_id: WorkflowId) -> Result<Vec<Stage>, StoreError> {
        let state = self.read()?;
        let stages = state
            .stages
            .values()
            .filter(|s| s.workflow_id() == workflow_id)
            .cloned()
            .collect();
        Ok(order_stages(stages))
    }

    /// Record a grant. Re-granting an existing grant is a no-op.
    pub fn grant(&self, grant: Grant) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.ensure_subject(grant.subject)?;
        let changed = match grant.subject {
            Subject::User(user_id) => state.direct.entry(user_id).or_default().insert(grant),
            Subject::Group(group_id) => {
                let current = state
                    .group_grants
                    .get(&group_id)
                    .cloned()
                    .ok_or(StoreError::UnknownGroup(group_id))?;
                if current.contains(&grant) {
                    false
                } else {
                    let mut next = current.to_vec();
                    next.push(grant);
                    state.group_grants.insert(group_id, Arc::from(next));
                    true
                }
            }
        };
        if changed {
            state.bump();
        }
        Ok(())
    }

    /// Remove a grant. Returns whether it existed.
    pub fn revoke(&self, grant: &Grant) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        state.ensure_subject(grant.subject)?;
        let removed = match grant.subject {
            Subject::User(user_id) => state
                .direct
                .get_mut(&user_id)
                .is_some_and(|grants| grants.remove(grant)),
            Subject::Group(group_id) => {
                let current = state
                    .group_grants
                    .get(&group_id)
                    .cloned()
                    .ok_or(StoreError::UnknownGroup(group_id))?;
                if current.contains(grant) {
                    let next: Vec<Grant> = current.iter().filter(|g| *g != grant).copied().collect();
                    state.group_grants.insert(group_id, Arc::from(next));
                    true
                } else {
                    false
                }
            }
        };
        if removed {
            state.bump();
        }
        Ok(removed)
    }
}

impl GrantStore for InMemoryGrantStore {
    fn get_direct_grants(&self, user_id: UserId) -> Result<Vec<Grant>, StoreError> {
        let state = self.read()?;
        state.ensure_subject(Subject::User(user_id))?;
        Ok(state
            .direct
            .get(&user_id)
            .map(|grants| grants.iter().copied().collect())
            .unwrap_or_default())
    }

    fn get_groups_for_user(&self, user_id: UserId) -> Result<Vec<GroupId>, StoreError> {
        let state = self.read()?;
        state.ensure_subject(Subject::User(user_id))?;
        Ok(state
            .memberships
            .get(&user_id)
            .map(|groups| groups.iter().copied().collect())
            .unwrap_or_default())
    }

    fn get_grants_for_group(&self, group_id: GroupId) -> Result<GroupGrants, StoreError> {
        let state = self.read()?;
        state
            .group_grants
            .get(&group_id)
            .cloned()
            .ok_or(StoreError::UnknownGroup(group_id))
    }

    fn get_stage_parent_index(&self) -> Result<StageParentIndex, StoreError> {
        let state = self.read()?;
        Ok(StageParentIndex::from_stages(state.stages.values()))
    }

    fn version(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.version)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
