//! `newsroom-core` — domain foundation building blocks.
//!
//! Typed identifiers, the `Entity` trait and the shared domain error. No IO.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{GroupId, StageId, UserId, WorkflowId};
