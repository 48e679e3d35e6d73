//! Authorization gate: yes/no questions against a resolved summary.
//!
//! Effective access is the union of direct and group-inherited access,
//! computed per question. The gate never talks to storage.

use serde::Serialize;
use thiserror::Error;

use newsroom_core::{Entity, StageId, WorkflowId};
use newsroom_workflows::{Stage, Workflow};

use crate::grant::{AccessKind, Subject, Target};
use crate::summary::UserPermissionSummary;

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum AuthzError {
    /// A user or group id could not be resolved. A client-input problem,
    /// never treated as "no access".
    #[error("unknown subject: {0}")]
    UnknownSubject(Subject),

    /// The current user may not perform `access` on `target`.
    #[error("forbidden: {access} access to {target} denied")]
    Forbidden { access: AccessKind, target: Target },
}

/// Read-only query surface over one user's normalised summary.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationGate<'a> {
    summary: &'a UserPermissionSummary,
}

impl<'a> AuthorizationGate<'a> {
    pub fn new(summary: &'a UserPermissionSummary) -> Self {
        Self { summary }
    }

    pub fn can_read_workflow(&self, id: &WorkflowId) -> bool {
        self.summary.user.read_workflows.contains(id)
            || self.summary.group.read_workflows.contains(id)
    }

    pub fn can_write_workflow(&self, id: &WorkflowId) -> bool {
        self.summary.user.write_workflows.contains(id)
            || self.summary.group.write_workflows.contains(id)
    }

    pub fn can_read_stage(&self, id: &StageId) -> bool {
        self.summary.user.read_stages.contains(id) || self.summary.group.read_stages.contains(id)
    }

    pub fn can_write_stage(&self, id: &StageId) -> bool {
        self.summary.user.write_stages.contains(id) || self.summary.group.write_stages.contains(id)
    }

    pub fn can(&self, access: AccessKind, target: Target) -> bool {
        match (access, target) {
            (AccessKind::Read, Target::Workflow(id)) => self.can_read_workflow(&id),
            (AccessKind::Write, Target::Workflow(id)) => self.can_write_workflow(&id),
            (AccessKind::Read, Target::Stage(id)) => self.can_read_stage(&id),
            (AccessKind::Write, Target::Stage(id)) => self.can_write_stage(&id),
        }
    }

    /// Keep only readable workflows, in their original order.
    pub fn filter_readable_workflows(
        &self,
        candidates: impl IntoIterator<Item = Workflow>,
    ) -> Vec<Workflow> {
        candidates
            .into_iter()
            .filter(|workflow| self.can_read_workflow(workflow.id()))
            .collect()
    }

    /// Keep only readable stages, in their original order.
    pub fn filter_readable_stages(
        &self,
        candidates: impl IntoIterator<Item = Stage>,
    ) -> Vec<Stage> {
        candidates
            .into_iter()
            .filter(|stage| self.can_read_stage(stage.id()))
            .collect()
    }

    /// Guard for mutating paths. Call it last, right before the mutation.
    pub fn require_write(&self, target: Target) -> Result<(), AuthzError> {
        if self.can(AccessKind::Write, target) {
            Ok(())
        } else {
            Err(AuthzError::Forbidden {
                access: AccessKind::Write,
                target,
            })
        }
    }
}

/// Answer a single authorization question against a summary.
pub fn authorize(summary: &UserPermissionSummary, access: AccessKind, target: Target) -> bool {
    AuthorizationGate::new(summary).can(access, target)
}

/// Fail with [`AuthzError::Forbidden`] unless the summary grants write on `target`.
pub fn require_write(summary: &UserPermissionSummary, target: Target) -> Result<(), AuthzError> {
    AuthorizationGate::new(summary).require_write(target)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
