//! REST backend access
//!
//! [`ApiClient`] owns the transport and credential; the resource modules
//! extend it with typed operations. Every response is normalized before it
//! is returned and every mutation payload goes through the wire mapper.

mod articles;
mod auth;
mod cartes;
pub mod client;
pub mod dictionary;
pub mod error;
mod histoires;
pub mod images;
pub mod resource;

pub use client::{ApiClient, Channel};
pub use dictionary::{DictionaryQuery, SortOrder};
pub use error::{ApiError, ApiResult, ErrorDetail};
pub use images::{ImageResource, UploadVerb};
pub use resource::Resource;
