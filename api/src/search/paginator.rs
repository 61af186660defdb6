use super::builder::StoreQuery;
use super::error::SearchError;
use crate::database::listings::Listing;
use anyhow::Result;
use async_trait::async_trait;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Backing store able to count and slice listings for a query
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn count_listings(&self, query: &StoreQuery) -> Result<u64>;

    /// Listings in query order, skipping `offset` rows and returning at most `limit`
    async fn find_listings(&self, query: &StoreQuery, offset: u64, limit: u32)
        -> Result<Vec<Listing>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationInfo {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: total.div_ceil(u64::from(limit.max(1))),
        }
    }
}

/// Counts matches and fetches one page of them.
///
/// `limit` is clamped to `[1, max_limit]`. A page past the end yields no items but still
/// reports the full total. Store failures surface as `StoreUnavailable` without retrying.
pub async fn paginate<S>(
    store: &S,
    query: &StoreQuery,
    page: u32,
    limit: u32,
    max_limit: u32,
) -> Result<(Vec<Listing>, PaginationInfo), SearchError>
where
    S: ListingStore + ?Sized,
{
    let page = page.max(1);
    let limit = limit.clamp(1, max_limit.max(1));

    let total = store.count_listings(query).await.map_err(store_unavailable)?;
    let info = PaginationInfo::new(page, limit, total);

    if u64::from(page) > info.total_pages {
        tracing::debug!(page, total_pages = info.total_pages, "page beyond result set");
        return Ok((Vec::new(), info));
    }

    let offset = u64::from(page - 1) * u64::from(limit);
    let items = store
        .find_listings(query, offset, limit)
        .await
        .map_err(store_unavailable)?;

    Ok((items, info))
}

fn store_unavailable(err: anyhow::Error) -> SearchError {
    tracing::error!("Listing store query failed: {:#}", err);
    SearchError::StoreUnavailable(format!("{:#}", err))
}
