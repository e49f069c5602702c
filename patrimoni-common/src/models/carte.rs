//! Carte (historical map) entity

use serde::{Deserialize, Serialize};

use super::{Editable, Entity, EntityKind};

/// A map, rendered either from an embedded iframe or a stored image
///
/// At least one of `iframe_url` or a stored image must exist for the
/// carte to be displayable; see [`crate::validation`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Carte {
    pub id: Option<i64>,
    #[serde(rename = "titre")]
    pub title: String,
    pub iframe_url: Option<String>,
    /// Caption
    #[serde(rename = "legende")]
    pub legend: String,
    pub image_stored: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Carte {
    /// The iframe URL if it holds anything besides whitespace
    pub fn iframe(&self) -> Option<&str> {
        self.iframe_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

impl Entity for Carte {
    const KIND: EntityKind = EntityKind::Carte;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn image_stored(&self) -> bool {
        self.image_stored
    }
}

/// Editable fields of a [`Carte`]
#[derive(Debug, Clone, PartialEq)]
pub enum CarteChange {
    Title(String),
    IframeUrl(Option<String>),
    Legend(String),
}

impl Editable for Carte {
    type Change = CarteChange;

    fn apply(&mut self, change: CarteChange) {
        match change {
            CarteChange::Title(v) => self.title = v,
            CarteChange::IframeUrl(v) => self.iframe_url = v,
            CarteChange::Legend(v) => self.legend = v,
        }
    }
}
