//! Articles

use patrimoni_common::models::Article;
use patrimoni_common::pagination::{OverFetched, PageCursor};

use super::client::ApiClient;
use super::error::ApiResult;
use super::images::{ImageResource, UploadVerb};
use super::resource::Resource;

impl Resource for Article {
    const PATH: &'static str = "/articles";
}

impl ImageResource for Article {
    const UPLOAD_VERB: UploadVerb = UploadVerb::Post;
    const UPLOAD_FIELD: &'static str = "file";

    fn external_image_url(&self) -> Option<&str> {
        Some(&self.image_url)
    }
}

impl ApiClient {
    /// One page of articles through the `skip`/`limit` endpoint
    pub async fn list_articles_page(&self, cursor: &PageCursor) -> ApiResult<Vec<Article>> {
        let query = [
            ("skip", cursor.offset().to_string()),
            ("limit", cursor.limit().to_string()),
        ];
        self.list_with::<Article>(&query).await
    }

    /// One page of articles, requesting one extra item to detect a next page
    ///
    /// The endpoint reports no total, so `cursor.pages` is updated from the
    /// over-fetch result.
    pub async fn list_articles_overfetch(
        &self,
        cursor: &mut PageCursor,
    ) -> ApiResult<OverFetched<Article>> {
        let query = [
            ("skip", cursor.offset().to_string()),
            ("limit", cursor.overfetch_limit().to_string()),
        ];
        let items = self.list_with::<Article>(&query).await?;
        Ok(cursor.apply_overfetch(items))
    }
}
