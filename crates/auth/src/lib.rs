//! `newsroom-auth` — permission resolution for newsroom workflows.
//!
//! Pure and synchronous: grants in, a per-user summary out, and a gate that
//! answers read/write questions about workflows and stages. Decoupled from
//! HTTP and storage.

pub mod authorize;
pub mod explain;
pub mod grant;
pub mod normalize;
pub mod resolve;
pub mod summary;

pub use authorize::{AuthorizationGate, AuthzError, authorize, require_write};
pub use explain::{AccessExplanation, Origin, explain_access};
pub use grant::{AccessKind, Grant, GroupGrants, Subject, Target};
pub use normalize::{StageParentIndex, normalize};
pub use resolve::resolve;
pub use summary::{OriginAccess, UserPermissionSummary, contributing_groups, effective_access};
