//! patrimoni-admin library - content-management client
//!
//! Typed access to the Patrimoni REST backend (articles, dictionary,
//! histoires, cartes) with:
//! - [`api`]: public and authenticated request channels, normalized responses
//! - [`session`]: the shared "current user" cache driven by login/logout
//!   signals, plus the throttled-login lockout timer
//! - [`edit`]: the edit-in-place state machine for any entity
//! - [`listing`]: local list state with confirmed deletion

pub mod api;
pub mod edit;
pub mod listing;
pub mod session;

pub use api::{ApiClient, ApiError, ApiResult};
pub use edit::{EditInPlace, EditState, SaveOutcome};
pub use listing::{DeleteRequest, ListState};
pub use session::{LoginLockout, SessionContext};
