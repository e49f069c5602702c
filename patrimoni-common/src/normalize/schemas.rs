//! Enumerated alias tables, one per entity kind
//!
//! Lookup order within an entry is significant: the canonical key first,
//! then each alias in the order listed.

use super::{Canonical, FieldDefault, FieldSpec, Schema};
use crate::models::{Article, Carte, EntityKind, Histoire, MenuItem, Mot, User};

use FieldDefault::{EmptyText, False, Null};

pub const ARTICLE: Schema = Schema {
    kind: EntityKind::Article,
    fields: &[
        FieldSpec::read_only("id", &[], Null),
        FieldSpec::writable("titre", &["title"], EmptyText),
        FieldSpec::writable("description", &[], EmptyText),
        FieldSpec::writable("imageUrl", &["image_url", "src"], EmptyText),
        FieldSpec::writable("sourceUrl", &["source_url"], EmptyText),
        FieldSpec::read_only("dateAjout", &["date_ajout"], EmptyText),
        FieldSpec::read_only("imageStored", &["image_stored"], False),
        FieldSpec::read_only("createdAt", &["created_at"], Null),
        FieldSpec::read_only("updatedAt", &["updated_at"], Null),
    ],
};

pub const MOT: Schema = Schema {
    kind: EntityKind::Mot,
    fields: &[
        FieldSpec::read_only("id", &[], Null),
        FieldSpec::writable("theme", &[], EmptyText),
        FieldSpec::writable("categorie", &[], EmptyText),
        FieldSpec::writable("description", &[], EmptyText),
        FieldSpec::writable("motsFrancais", &["mots_francais"], EmptyText),
        FieldSpec::writable("motsProvencal", &["mots_provencal"], EmptyText),
        FieldSpec::writable("synonymesFrancais", &["synonymes_francais"], EmptyText),
        FieldSpec::writable("egProvencal", &["eg_provencal"], EmptyText),
        FieldSpec::writable("dProvencal", &["d_provencal"], EmptyText),
        FieldSpec::writable("aProvencal", &["a_provencal"], EmptyText),
    ],
};

pub const HISTOIRE: Schema = Schema {
    kind: EntityKind::Histoire,
    fields: &[
        FieldSpec::read_only("id", &[], Null),
        FieldSpec::writable("titre", &[], EmptyText),
        FieldSpec::writable("typologie", &[], EmptyText),
        FieldSpec::writable("periode", &[], EmptyText),
        FieldSpec::writable("descriptionCourte", &["description_courte"], EmptyText),
        FieldSpec::writable("descriptionLongue", &["description_longue"], EmptyText),
        FieldSpec::writable("sourceUrl", &["source_url"], EmptyText),
        FieldSpec::read_only("createdAt", &["created_at"], Null),
        FieldSpec::read_only("updatedAt", &["updated_at"], Null),
    ],
};

pub const MENU_ITEM: Schema = Schema {
    kind: EntityKind::MenuItem,
    fields: &[
        FieldSpec::read_only("id", &[], Null),
        FieldSpec::read_only("titre", &[], EmptyText),
        FieldSpec::read_only("descriptionCourte", &["description_courte"], EmptyText),
    ],
};

pub const CARTE: Schema = Schema {
    kind: EntityKind::Carte,
    fields: &[
        FieldSpec::read_only("id", &[], Null),
        FieldSpec::writable("titre", &[], EmptyText),
        FieldSpec::nullable_url("iframeUrl", &["iframe_url"]),
        FieldSpec::writable("legende", &[], EmptyText),
        FieldSpec::read_only("imageStored", &["image_stored"], False),
        FieldSpec::read_only("createdAt", &["created_at"], Null),
        FieldSpec::read_only("updatedAt", &["updated_at"], Null),
    ],
};

pub const USER: Schema = Schema {
    kind: EntityKind::User,
    fields: &[
        FieldSpec::read_only("id", &[], Null),
        FieldSpec::read_only("username", &[], EmptyText),
        FieldSpec::read_only("email", &[], Null),
        FieldSpec::read_only("isAdmin", &["is_admin"], False),
    ],
};

/// Alias table for a kind
pub fn schema_for(kind: EntityKind) -> &'static Schema {
    match kind {
        EntityKind::Article => &ARTICLE,
        EntityKind::Mot => &MOT,
        EntityKind::Histoire => &HISTOIRE,
        EntityKind::MenuItem => &MENU_ITEM,
        EntityKind::Carte => &CARTE,
        EntityKind::User => &USER,
    }
}

impl Canonical for Article {
    const SCHEMA: &'static Schema = &ARTICLE;
}

impl Canonical for Mot {
    const SCHEMA: &'static Schema = &MOT;
}

impl Canonical for Histoire {
    const SCHEMA: &'static Schema = &HISTOIRE;
}

impl Canonical for MenuItem {
    const SCHEMA: &'static Schema = &MENU_ITEM;
}

impl Canonical for Carte {
    const SCHEMA: &'static Schema = &CARTE;
}

impl Canonical for User {
    const SCHEMA: &'static Schema = &USER;
}
