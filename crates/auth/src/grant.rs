use std::sync::Arc;

use serde::{Deserialize, Serialize};

use newsroom_core::{GroupId, StageId, UserId, WorkflowId};

/// Kind of access a grant confers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    Read,
    Write,
}

impl core::fmt::Display for AccessKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AccessKind::Read => f.write_str("read"),
            AccessKind::Write => f.write_str("write"),
        }
    }
}

/// What a grant applies to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Target {
    Workflow(WorkflowId),
    Stage(StageId),
}

impl core::fmt::Display for Target {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Target::Workflow(id) => write!(f, "workflow {id}"),
            Target::Stage(id) => write!(f, "stage {id}"),
        }
    }
}

/// Who a grant is given to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Subject {
    User(UserId),
    Group(GroupId),
}

impl core::fmt::Display for Subject {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Subject::User(id) => write!(f, "user {id}"),
            Subject::Group(id) => write!(f, "group {id}"),
        }
    }
}

/// An additive permission record.
///
/// There is no deny grant: the absence of a grant is the absence of access.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Grant {
    pub subject: Subject,
    pub target: Target,
    pub access: AccessKind,
}

impl Grant {
    pub fn new(subject: Subject, target: Target, access: AccessKind) -> Self {
        Self {
            subject,
            target,
            access,
        }
    }

    pub fn user(user_id: UserId, target: Target, access: AccessKind) -> Self {
        Self::new(Subject::User(user_id), target, access)
    }

    pub fn group(group_id: GroupId, target: Target, access: AccessKind) -> Self {
        Self::new(Subject::Group(group_id), target, access)
    }
}

/// Read-only snapshot of one group's grants.
///
/// Shared by reference across every member's resolution; never mutated per user.
pub type GroupGrants = Arc<[Grant]>;
