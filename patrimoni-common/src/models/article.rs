//! Article entity

use serde::{Deserialize, Serialize};

use super::{Editable, Entity, EntityKind};

/// A news-style article with an optional image and source link
///
/// Image precedence: when `image_stored` is true the server-side binary is
/// what gets displayed; `image_url` is only a fallback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Option<i64>,
    #[serde(rename = "titre")]
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub source_url: String,
    #[serde(rename = "dateAjout")]
    pub added_on: String,
    pub image_stored: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Entity for Article {
    const KIND: EntityKind = EntityKind::Article;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn image_stored(&self) -> bool {
        self.image_stored
    }
}

/// Editable fields of an [`Article`]
#[derive(Debug, Clone, PartialEq)]
pub enum ArticleChange {
    Title(String),
    Description(String),
    ImageUrl(String),
    SourceUrl(String),
}

impl Editable for Article {
    type Change = ArticleChange;

    fn apply(&mut self, change: ArticleChange) {
        match change {
            ArticleChange::Title(v) => self.title = v,
            ArticleChange::Description(v) => self.description = v,
            ArticleChange::ImageUrl(v) => self.image_url = v,
            ArticleChange::SourceUrl(v) => self.source_url = v,
        }
    }
}
