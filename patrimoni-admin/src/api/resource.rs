//! Generic CRUD over addressable entities

use reqwest::Method;
use serde::Serialize;

use patrimoni_common::normalize::{payload_of, to_canonical, to_canonical_list, Canonical};

use super::client::{ApiClient, Channel};
use super::error::ApiResult;

/// A canonical entity with its own collection on the backend
pub trait Resource: Canonical {
    /// Collection path, e.g. `/articles`
    const PATH: &'static str;

    fn item_path(id: i64) -> String {
        format!("{}/{}", Self::PATH, id)
    }
}

impl ApiClient {
    /// Fetch the whole collection
    pub async fn list<T: Resource>(&self) -> ApiResult<Vec<T>> {
        self.list_with::<T>(&[]).await
    }

    /// Fetch the collection with query parameters
    pub async fn list_with<T: Resource>(&self, query: &[(&str, String)]) -> ApiResult<Vec<T>> {
        let raw = self.get_value(Channel::Public, T::PATH, query).await?;
        Ok(to_canonical_list(&raw)?)
    }

    pub async fn get<T: Resource>(&self, id: i64) -> ApiResult<T> {
        let raw = self.get_value(Channel::Public, &T::item_path(id), &[]).await?;
        Ok(to_canonical(&raw)?)
    }

    /// Create from a draft (a canonical entity or any partial object)
    pub async fn create<T: Resource, P: Serialize + ?Sized>(&self, draft: &P) -> ApiResult<T> {
        let payload = payload_of(T::KIND, draft)?;
        let raw = self
            .send_json(Channel::Authenticated, Method::POST, T::PATH, &payload)
            .await?;
        Ok(to_canonical(&raw)?)
    }

    /// Update; only the keys present in `changes` are sent
    pub async fn update<T: Resource, P: Serialize + ?Sized>(
        &self,
        id: i64,
        changes: &P,
    ) -> ApiResult<T> {
        let payload = payload_of(T::KIND, changes)?;
        let raw = self
            .send_json(Channel::Authenticated, Method::PUT, &T::item_path(id), &payload)
            .await?;
        Ok(to_canonical(&raw)?)
    }

    pub async fn delete<T: Resource>(&self, id: i64) -> ApiResult<()> {
        self.send_empty(Channel::Authenticated, Method::DELETE, &T::item_path(id))
            .await?;
        Ok(())
    }
}
