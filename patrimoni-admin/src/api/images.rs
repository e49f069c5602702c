//! Image endpoints
//!
//! An entity's stored image lives at `{collection}/{id}/image`. The optional
//! `v` query parameter is a cache-busting revision the server ignores.

use reqwest::Method;

use patrimoni_common::models::{Entity, PendingImage};
use patrimoni_common::normalize::to_canonical;
use patrimoni_common::validation::validate_image;

use super::client::{ApiClient, Channel};
use super::error::ApiResult;
use super::resource::Resource;

/// HTTP verb an image upload endpoint expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadVerb {
    Post,
    Put,
}

impl UploadVerb {
    fn method(self) -> Method {
        match self {
            UploadVerb::Post => Method::POST,
            UploadVerb::Put => Method::PUT,
        }
    }
}

/// Resources with a stored-image endpoint
pub trait ImageResource: Resource {
    const UPLOAD_VERB: UploadVerb;
    /// Multipart field name carrying the file
    const UPLOAD_FIELD: &'static str;

    /// Externally hosted image, used when nothing is stored server-side
    fn external_image_url(&self) -> Option<&str> {
        None
    }

    fn image_path(id: i64) -> String {
        format!("{}/image", Self::item_path(id))
    }
}

impl ApiClient {
    /// URL of the stored image; `rev > 0` adds `?v={rev}`
    pub fn image_url<T: ImageResource>(&self, id: i64, rev: u64) -> String {
        let base = self.url(&T::image_path(id));
        if rev > 0 {
            format!("{base}?v={rev}")
        } else {
            base
        }
    }

    /// The image to display for `entity`
    ///
    /// A stored binary always wins over an external URL.
    pub fn display_image<T: ImageResource>(&self, entity: &T, rev: u64) -> Option<String> {
        if entity.image_stored() {
            if let Some(id) = entity.id() {
                return Some(self.image_url::<T>(id, rev));
            }
        }
        entity
            .external_image_url()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
    }

    /// Upload an image and return the updated entity
    pub async fn upload_image<T: ImageResource>(
        &self,
        id: i64,
        image: &PendingImage,
    ) -> ApiResult<T> {
        validate_image(image, self.config().max_image_bytes)?;
        let raw = self
            .send_multipart(
                Channel::Authenticated,
                T::UPLOAD_VERB.method(),
                &T::image_path(id),
                T::UPLOAD_FIELD,
                image,
            )
            .await?;
        Ok(to_canonical(&raw)?)
    }

    /// Delete the stored image and return the updated entity
    ///
    /// When the server answers without a body the entity is refetched.
    pub async fn delete_image<T: ImageResource>(&self, id: i64) -> ApiResult<T> {
        let raw = self
            .send_empty(Channel::Authenticated, Method::DELETE, &T::image_path(id))
            .await?;
        if raw.is_null() {
            return self.get::<T>(id).await;
        }
        Ok(to_canonical(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patrimoni_common::config::ClientConfig;
    use patrimoni_common::models::{Article, Carte};

    fn client() -> ApiClient {
        ApiClient::with_bus(
            ClientConfig::with_api_base("https://api.example.org/").unwrap(),
            Default::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_image_url_revision() {
        let c = client();
        assert_eq!(
            c.image_url::<Article>(4, 0),
            "https://api.example.org/articles/4/image"
        );
        assert_eq!(
            c.image_url::<Carte>(4, 2),
            "https://api.example.org/cartes/4/image?v=2"
        );
    }

    #[test]
    fn test_stored_image_wins_over_external_url() {
        let c = client();
        let article = Article {
            id: Some(9),
            image_url: "https://cdn.example.org/a.png".into(),
            image_stored: true,
            ..Default::default()
        };
        assert_eq!(
            c.display_image(&article, 3).as_deref(),
            Some("https://api.example.org/articles/9/image?v=3")
        );
    }

    #[test]
    fn test_external_url_fallback() {
        let c = client();
        let mut article = Article {
            id: Some(9),
            image_url: " https://cdn.example.org/a.png ".into(),
            ..Default::default()
        };
        assert_eq!(
            c.display_image(&article, 0).as_deref(),
            Some("https://cdn.example.org/a.png")
        );
        article.image_url = "  ".into();
        assert_eq!(c.display_image(&article, 0), None);
    }

    #[test]
    fn test_carte_without_stored_image_has_none() {
        let c = client();
        let carte = Carte {
            id: Some(1),
            iframe_url: Some("http://localhost:3000/map".into()),
            ..Default::default()
        };
        assert_eq!(c.display_image(&carte, 0), None);
    }
}
