//! Histoires and the grouped menu

use patrimoni_common::models::{Histoire, MenuHistoires};
use patrimoni_common::normalize::{normalize_menu, to_canonical};

use super::client::{ApiClient, Channel};
use super::error::ApiResult;
use super::resource::Resource;

impl Resource for Histoire {
    const PATH: &'static str = "/histoires";
}

impl ApiClient {
    /// One page of histoires through the `page`/`limit` endpoint
    pub async fn list_histoires_page(&self, page: u32, limit: u32) -> ApiResult<Vec<Histoire>> {
        let query = [("page", page.max(1).to_string()), ("limit", limit.to_string())];
        self.list_with::<Histoire>(&query).await
    }

    /// Histoires grouped by typology then period
    pub async fn histoires_menu(&self) -> ApiResult<MenuHistoires> {
        let raw = self
            .get_value(Channel::Public, "/histoires/menu", &[])
            .await?;
        Ok(normalize_menu(&raw)?)
    }

    /// Look a histoire up by its exact title
    pub async fn find_histoire(&self, title: &str) -> ApiResult<Histoire> {
        let raw = self
            .get_value(
                Channel::Public,
                "/histoires/find",
                &[("titre", title.to_string())],
            )
            .await?;
        Ok(to_canonical(&raw)?)
    }
}
