use serde::{Deserialize, Serialize};

use newsroom_core::{DomainError, DomainResult, Entity, StageId, WorkflowId};

// ─────────────────────────────────────────────────────────────────────────────
// Workflow
// ─────────────────────────────────────────────────────────────────────────────

/// A named workflow; the top of the containment hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    id: WorkflowId,
    name: String,
}

impl Workflow {
    pub fn new(id: WorkflowId, name: impl Into<String>) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: validate_name("workflow", name.into())?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Entity for Workflow {
    type Id = WorkflowId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stage
// ─────────────────────────────────────────────────────────────────────────────

/// A named stage at a sequence position inside exactly one workflow.
///
/// # Invariants
/// - `workflow_id` is fixed at construction. Moving a stage to another
///   workflow means creating a new stage with a new id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    id: StageId,
    workflow_id: WorkflowId,
    name: String,
    sequence: u32,
}

impl Stage {
    pub fn new(
        id: StageId,
        workflow_id: WorkflowId,
        name: impl Into<String>,
        sequence: u32,
    ) -> DomainResult<Self> {
        Ok(Self {
            id,
            workflow_id,
            name: validate_name("stage", name.into())?,
            sequence,
        })
    }

    pub fn workflow_id(&self) -> WorkflowId {
        self.workflow_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl Entity for Stage {
    type Id = StageId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Sort stages into display order: by sequence position, ties broken by id.
pub fn order_stages(mut stages: Vec<Stage>) -> Vec<Stage> {
    stages.sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.id.cmp(&b.id)));
    stages
}

fn validate_name(kind: &str, name: String) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{kind} name must not be empty")));
    }
    Ok(trimmed.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn workflow_name_is_trimmed() {
        let wf = Workflow::new(WorkflowId::new(), "  Breaking News ").unwrap();
        assert_eq!(wf.name(), "Breaking News");
    }

    #[test]
    fn blank_names_are_rejected() {
        let err = Workflow::new(WorkflowId::new(), "   ").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = Stage::new(StageId::new(), WorkflowId::new(), "", 1).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn stage_keeps_its_parent_workflow() {
        let workflow_id = WorkflowId::new();
        let stage = Stage::new(StageId::new(), workflow_id, "Copy edit", 2).unwrap();
        assert_eq!(stage.workflow_id(), workflow_id);
        assert_eq!(stage.sequence(), 2);
    }

    #[test]
    fn stages_order_by_sequence() {
        let wf = WorkflowId::new();
        let publish = Stage::new(StageId::new(), wf, "Publish", 3).unwrap();
        let draft = Stage::new(StageId::new(), wf, "Draft", 1).unwrap();
        let edit = Stage::new(StageId::new(), wf, "Edit", 2).unwrap();

        let ordered = order_stages(vec![publish, draft, edit]);
        let names: Vec<&str> = ordered.iter().map(Stage::name).collect();
        assert_eq!(names, ["Draft", "Edit", "Publish"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: ordering yields non-decreasing sequence positions and keeps every stage.
        #[test]
        fn ordering_is_sorted_and_lossless(sequences in prop::collection::vec(0u32..20, 0..12)) {
            let wf = WorkflowId::new();
            let stages: Vec<Stage> = sequences
                .iter()
                .map(|s| Stage::new(StageId::new(), wf, format!("stage {s}"), *s).unwrap())
                .collect();

            let ordered = order_stages(stages.clone());

            prop_assert_eq!(ordered.len(), stages.len());
            prop_assert!(ordered.windows(2).all(|w| w[0].sequence() <= w[1].sequence()));
        }
    }
}
