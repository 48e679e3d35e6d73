//! Grant store boundary.
//!
//! The durable record of direct grants, group grants and group membership is
//! owned by the persistence layer. The permission engine only reads it,
//! through the [`GrantStore`] trait.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryGrantStore;
pub use r#trait::{GrantStore, StoreError};
