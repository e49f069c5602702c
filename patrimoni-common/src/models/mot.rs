//! Dictionary entry ("mot") entity

use serde::{Deserialize, Serialize};

use super::{Editable, Entity, EntityKind};

/// A bilingual French / Provençal dictionary entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mot {
    pub id: Option<i64>,
    pub theme: String,
    #[serde(rename = "categorie")]
    pub category: String,
    pub description: String,
    #[serde(rename = "motsFrancais")]
    pub french_word: String,
    #[serde(rename = "motsProvencal")]
    pub provencal_word: String,
    #[serde(rename = "synonymesFrancais")]
    pub french_synonyms: String,
    /// Provençal usage example
    #[serde(rename = "egProvencal")]
    pub provencal_example: String,
    /// Provençal derived forms
    #[serde(rename = "dProvencal")]
    pub provencal_derivation: String,
    /// Provençal attribution / etymology note
    #[serde(rename = "aProvencal")]
    pub provencal_attribution: String,
}

impl Entity for Mot {
    const KIND: EntityKind = EntityKind::Mot;

    fn id(&self) -> Option<i64> {
        self.id
    }
}

/// Editable fields of a [`Mot`]
#[derive(Debug, Clone, PartialEq)]
pub enum MotChange {
    Theme(String),
    Category(String),
    Description(String),
    FrenchWord(String),
    ProvencalWord(String),
    FrenchSynonyms(String),
    ProvencalExample(String),
    ProvencalDerivation(String),
    ProvencalAttribution(String),
}

impl Editable for Mot {
    type Change = MotChange;

    fn apply(&mut self, change: MotChange) {
        match change {
            MotChange::Theme(v) => self.theme = v,
            MotChange::Category(v) => self.category = v,
            MotChange::Description(v) => self.description = v,
            MotChange::FrenchWord(v) => self.french_word = v,
            MotChange::ProvencalWord(v) => self.provencal_word = v,
            MotChange::FrenchSynonyms(v) => self.french_synonyms = v,
            MotChange::ProvencalExample(v) => self.provencal_example = v,
            MotChange::ProvencalDerivation(v) => self.provencal_derivation = v,
            MotChange::ProvencalAttribution(v) => self.provencal_attribution = v,
        }
    }
}
