//! Canonical entity models
//!
//! Every type here uses exactly one field name per concept. Wire-format
//! aliases never reach these types; the [`crate::normalize`] module maps
//! them away at the boundary.

mod article;
mod carte;
mod histoire;
mod image;
mod mot;
mod user;

pub use article::{Article, ArticleChange};
pub use carte::{Carte, CarteChange};
pub use histoire::{Histoire, HistoireChange, MenuHistoires, MenuItem};
pub use image::PendingImage;
pub use mot::{Mot, MotChange};
pub use user::{AuthToken, Credentials, User};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of records exchanged with the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Article,
    Mot,
    Histoire,
    MenuItem,
    Carte,
    User,
}

impl EntityKind {
    /// Stable lowercase name used in logs and CLI arguments
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Article => "article",
            EntityKind::Mot => "mot",
            EntityKind::Histoire => "histoire",
            EntityKind::MenuItem => "menu_item",
            EntityKind::Carte => "carte",
            EntityKind::User => "user",
        }
    }

    /// Collection path on the backend, if the kind is addressable
    pub fn resource_path(&self) -> Option<&'static str> {
        match self {
            EntityKind::Article => Some("/articles"),
            EntityKind::Mot => Some("/dictionnaire"),
            EntityKind::Histoire => Some("/histoires"),
            EntityKind::Carte => Some("/cartes"),
            EntityKind::MenuItem | EntityKind::User => None,
        }
    }

    /// Whether the backend stores a binary image for this kind
    pub fn has_image_endpoint(&self) -> bool {
        matches!(self, EntityKind::Article | EntityKind::Carte)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common surface of every canonical entity
pub trait Entity {
    /// Which kind of record this is
    const KIND: EntityKind;

    /// Server-assigned identifier; `None` before creation
    fn id(&self) -> Option<i64>;

    /// True when the backend holds the image binary for this record
    fn image_stored(&self) -> bool {
        false
    }
}

/// Entities that can be edited one field at a time
///
/// `Change` carries both the field and its new value, so a draft can only
/// ever receive a value of the right type for that field.
pub trait Editable: Clone + PartialEq {
    type Change;

    /// Apply a single field change to this value
    fn apply(&mut self, change: Self::Change);
}

/// One page of a list endpoint, already normalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    /// Current page (1-based)
    pub page: u32,
    /// Total number of pages known to the server (at least 1)
    pub pages: u32,
    /// Total number of matching items, when the server reports it
    pub total: Option<u64>,
}
