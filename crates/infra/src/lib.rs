//! Infrastructure layer: the grant store boundary, summary service, cache, config.

pub mod cache;
pub mod config;
pub mod grant_store;
pub mod service;

pub use cache::SummaryCache;
pub use config::{CacheConfig, PermissionConfig};
pub use grant_store::{GrantStore, InMemoryGrantStore, StoreError};
pub use service::{PermissionError, PermissionService};
