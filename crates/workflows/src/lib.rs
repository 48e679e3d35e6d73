//! Workflow domain module.
//!
//! Workflows and the stages they own. Documents move through the stages of a
//! workflow; which ones a user may see is decided by `newsroom-auth`.

pub mod workflow;

pub use workflow::{Stage, Workflow, order_stages};
