//! Records addressed by a stable typed id (workflows, stages).

/// Workflow-catalog record with an identity that survives renames and reordering.
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
