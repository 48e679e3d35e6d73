use std::sync::Arc;

use thiserror::Error;

use newsroom_auth::{Grant, GroupGrants, StageParentIndex};
use newsroom_core::{GroupId, StageId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unknown user: {0}")]
    UnknownUser(UserId),

    #[error("unknown group: {0}")]
    UnknownGroup(GroupId),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("stage {0} not found")]
    StageNotFound(StageId),

    /// Connectivity or backend failure. Callers decide whether to retry.
    #[error("grant store unavailable: {0}")]
    Unavailable(String),
}

/// Read side of the grant store, as consumed by the permission engine.
///
/// Implementations must be safe to share across request handlers.
pub trait GrantStore: Send + Sync {
    /// Grants whose subject is `user_id`.
    fn get_direct_grants(&self, user_id: UserId) -> Result<Vec<Grant>, StoreError>;

    /// Groups `user_id` belongs to.
    fn get_groups_for_user(&self, user_id: UserId) -> Result<Vec<GroupId>, StoreError>;

    /// Shared snapshot of the grants whose subject is `group_id`.
    fn get_grants_for_group(&self, group_id: GroupId) -> Result<GroupGrants, StoreError>;

    /// Parent workflow of every live stage.
    fn get_stage_parent_index(&self) -> Result<StageParentIndex, StoreError>;

    /// Monotonic version, bumped by every grant, membership or stage mutation.
    fn version(&self) -> Result<u64, StoreError>;
}

impl<S> GrantStore for Arc<S>
where
    S: GrantStore + ?Sized,
{
    fn get_direct_grants(&self, user_id: UserId) -> Result<Vec<Grant>, StoreError> {
        (**self).get_direct_grants(user_id)
    }

    fn get_groups_for_user(&self, user_id: UserId) -> Result<Vec<GroupId>, StoreError> {
        (**self).get_groups_for_user(user_id)
    }

    fn get_grants_for_group(&self, group_id: GroupId) -> Result<GroupGrants, StoreError> {
        (**self).get_grants_for_group(group_id)
    }

    fn get_stage_parent_index(&self) -> Result<StageParentIndex, StoreError> {
        (**self).get_stage_parent_index()
    }

    fn version(&self) -> Result<u64, StoreError> {
        (**self).version()
    }
}
