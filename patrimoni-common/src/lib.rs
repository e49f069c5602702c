//! # Patrimoni Common Library
//!
//! Shared, I/O-free code for the Patrimoni content-management client:
//! - Canonical entity models (articles, dictionary entries, histoires, cartes, users)
//! - Field normalization between heterogeneous wire records and canonical shapes
//! - Declarative per-entity validation
//! - Pagination bookkeeping
//! - Session signals (SessionBus)
//! - Configuration loading

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod normalize;
pub mod pagination;
pub mod validation;

pub use error::{Error, Result};
pub use models::EntityKind;
