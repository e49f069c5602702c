//! Histoire ("histoires & légendes") entity and the grouped menu

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Editable, Entity, EntityKind};

/// A story or legend, grouped by typology then period in the menu
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Histoire {
    pub id: Option<i64>,
    #[serde(rename = "titre")]
    pub title: String,
    /// Category tag such as "Histoire" or "Légende"
    #[serde(rename = "typologie")]
    pub typology: String,
    #[serde(rename = "periode")]
    pub period: String,
    /// Hover teaser
    #[serde(rename = "descriptionCourte")]
    pub short_description: String,
    #[serde(rename = "descriptionLongue")]
    pub long_description: String,
    pub source_url: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Entity for Histoire {
    const KIND: EntityKind = EntityKind::Histoire;

    fn id(&self) -> Option<i64> {
        self.id
    }
}

/// Editable fields of a [`Histoire`]
#[derive(Debug, Clone, PartialEq)]
pub enum HistoireChange {
    Title(String),
    Typology(String),
    Period(String),
    ShortDescription(String),
    LongDescription(String),
    SourceUrl(String),
}

impl Editable for Histoire {
    type Change = HistoireChange;

    fn apply(&mut self, change: HistoireChange) {
        match change {
            HistoireChange::Title(v) => self.title = v,
            HistoireChange::Typology(v) => self.typology = v,
            HistoireChange::Period(v) => self.period = v,
            HistoireChange::ShortDescription(v) => self.short_description = v,
            HistoireChange::LongDescription(v) => self.long_description = v,
            HistoireChange::SourceUrl(v) => self.source_url = v,
        }
    }
}

/// Teaser entry of the histoires menu
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: Option<i64>,
    #[serde(rename = "titre")]
    pub title: String,
    #[serde(rename = "descriptionCourte")]
    pub short_description: String,
}

impl Entity for MenuItem {
    const KIND: EntityKind = EntityKind::MenuItem;

    fn id(&self) -> Option<i64> {
        self.id
    }
}

/// typology -> period -> teaser items
pub type MenuHistoires = BTreeMap<String, BTreeMap<String, Vec<MenuItem>>>;
