//! Dictionary (Provençal / French word entries)
//!
//! The list endpoint answers with a `{items, total, pages, page}` envelope;
//! older deployments answer with a bare array, which is accepted too.

use serde_json::Value;

use patrimoni_common::models::{Mot, PagedResponse};
use patrimoni_common::normalize::{to_canonical_list, Canonical};

use super::client::{ApiClient, Channel};
use super::error::ApiResult;
use super::resource::Resource;

/// Filter value meaning "any theme"
pub const ALL_THEMES: &str = "tous";
/// Filter value meaning "any category" / "any letter"
pub const ALL_VALUES: &str = "toutes";

impl Resource for Mot {
    const PATH: &'static str = "/dictionnaire";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Dictionary list filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictionaryQuery {
    pub theme: Option<String>,
    pub category: Option<String>,
    pub letter: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
}

fn selective(value: &Option<String>, wildcard: &str) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(wildcard))
        .map(str::to_string)
}

impl DictionaryQuery {
    /// Query parameters; wildcard and empty filters are left out
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(theme) = selective(&self.theme, ALL_THEMES) {
            query.push(("theme", theme));
        }
        if let Some(category) = selective(&self.category, ALL_VALUES) {
            query.push(("categorie", category));
        }
        if let Some(letter) = selective(&self.letter, ALL_VALUES) {
            query.push(("lettre", letter));
        }
        if let Some(search) = selective(&self.search, "") {
            query.push(("search", search));
        }
        if let Some(page) = self.page.filter(|p| *p > 0) {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            query.push(("limit", limit.to_string()));
        }
        if let Some(sort) = selective(&self.sort, "") {
            query.push(("sort", sort));
        }
        if let Some(order) = self.order {
            query.push(("order", order.as_str().to_string()));
        }
        query
    }
}

fn positive_u32(value: Option<&Value>) -> Option<u32> {
    value
        .and_then(Value::as_u64)
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
}

/// Read either list response shape into a page
fn paged_from_value<T: Canonical>(raw: &Value, requested_page: u32) -> ApiResult<PagedResponse<T>> {
    if raw.is_array() {
        let page = requested_page.max(1);
        return Ok(PagedResponse {
            items: to_canonical_list(raw)?,
            page,
            pages: page,
            total: None,
        });
    }
    let items = match raw.get("items") {
        Some(items) => to_canonical_list(items)?,
        None => Vec::new(),
    };
    let page = positive_u32(raw.get("page")).unwrap_or(1);
    let pages = positive_u32(raw.get("pages")).unwrap_or(1).max(page);
    Ok(PagedResponse {
        items,
        page,
        pages,
        total: raw.get("total").and_then(Value::as_u64),
    })
}

fn strings_of(raw: &Value) -> Vec<String> {
    raw.as_array()
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl ApiClient {
    /// Filtered, paginated dictionary listing
    pub async fn list_dictionary(&self, query: &DictionaryQuery) -> ApiResult<PagedResponse<Mot>> {
        let raw = self
            .get_value(Channel::Public, Mot::PATH, &query.to_query())
            .await?;
        paged_from_value(&raw, query.page.unwrap_or(1))
    }

    /// Distinct themes
    pub async fn dictionary_themes(&self) -> ApiResult<Vec<String>> {
        let raw = self
            .get_value(Channel::Public, "/dictionnaire/themes", &[])
            .await?;
        Ok(strings_of(&raw))
    }

    /// Distinct categories, optionally restricted to a theme
    pub async fn dictionary_categories(&self, theme: Option<&str>) -> ApiResult<Vec<String>> {
        let query: Vec<(&str, String)> = selective(&theme.map(str::to_string), ALL_THEMES)
            .map(|t| vec![("theme", t)])
            .unwrap_or_default();
        let raw = self
            .get_value(Channel::Public, "/dictionnaire/categories", &query)
            .await?;
        Ok(strings_of(&raw))
    }
}
