use std::fmt::Display;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::ApiClient;
use crate::error::Result;

/// Page of results as returned by the list endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_records: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Pagination, search, and sort parameters for list calls.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn sort(mut self, by: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(by.into());
        self.sort_order = Some(order);
        self
    }

    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(search) = &self.search {
            query.push(("search".to_string(), search.clone()));
        }
        if let Some(sort_by) = &self.sort_by {
            query.push(("sortBy".to_string(), sort_by.clone()));
        }
        if let Some(sort_order) = self.sort_order {
            query.push(("sortOrder".to_string(), sort_order.as_str().to_string()));
        }
        query
    }
}

/// Outcome of a delete call.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteOutcome {
    pub status: bool,
    pub message: String,
}

/// Typed CRUD wrapper over one REST endpoint, routed through the
/// authenticated pipeline.
///
/// # Example
/// ```no_run
/// use serde::Deserialize;
/// use transitops::api::{ListQuery, ResourceClient};
/// use transitops::client::ApiClient;
///
/// #[derive(Debug, Deserialize)]
/// struct Driver {
///     id: u64,
///     name: String,
/// }
///
/// # async fn example(client: ApiClient) -> transitops::error::Result<()> {
/// let drivers = ResourceClient::<Driver>::new(client, "/drivers");
/// let page = drivers.list(&ListQuery::new().page(1).limit(20)).await?;
/// # Ok(())
/// # }
/// ```
pub struct ResourceClient<T> {
    client: ApiClient,
    endpoint: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> ResourceClient<T> {
    pub fn new(client: ApiClient, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            _marker: PhantomData,
        }
    }

    fn item_path(&self, id: impl Display) -> String {
        format!("{}/{id}", self.endpoint)
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Page<T>> {
        self.client
            .get_query(&self.endpoint, query.to_query())
            .await?
            .json()
    }

    pub async fn get(&self, id: impl Display) -> Result<T> {
        self.client.get(&self.item_path(id)).await?.json()
    }

    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<T> {
        self.client.post(&self.endpoint, body).await?.json()
    }

    pub async fn update<B: Serialize + ?Sized>(&self, id: impl Display, body: &B) -> Result<T> {
        self.client.put(&self.item_path(id), body).await?.json()
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, id: impl Display, body: &B) -> Result<T> {
        self.client.patch(&self.item_path(id), body).await?.json()
    }

    pub async fn delete(&self, id: impl Display) -> Result<DeleteOutcome> {
        self.client.delete(&self.item_path(id)).await?.json()
    }

    pub async fn bulk_delete(&self, ids: &[impl Serialize]) -> Result<()> {
        self.client
            .post(&format!("{}/bulk-delete", self.endpoint), &json!({ "ids": ids }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_query_uses_wire_casing() {
        let query = ListQuery::new()
            .page(2)
            .limit(50)
            .search("airport")
            .sort("departureTime", SortOrder::Desc)
            .to_query();
        assert_eq!(
            query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("limit".to_string(), "50".to_string()),
                ("search".to_string(), "airport".to_string()),
                ("sortBy".to_string(), "departureTime".to_string()),
                ("sortOrder".to_string(), "desc".to_string()),
            ]
        );
    }

    #[test]
    fn empty_query_adds_no_parameters() {
        assert!(ListQuery::new().to_query().is_empty());
    }
}
