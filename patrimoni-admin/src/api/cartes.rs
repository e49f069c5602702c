//! Cartes

use patrimoni_common::models::Carte;

use super::images::{ImageResource, UploadVerb};
use super::resource::Resource;

impl Resource for Carte {
    const PATH: &'static str = "/cartes";
}

impl ImageResource for Carte {
    const UPLOAD_VERB: UploadVerb = UploadVerb::Put;
    const UPLOAD_FIELD: &'static str = "image";
}
