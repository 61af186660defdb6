use super::builder::build_query;
use super::error::SearchError;
use super::geo::{haversine_km, round_km};
use super::paginator::{paginate, ListingStore};
use super::response::{assemble, SearchResults};
use super::types::SearchRequest;
use crate::openapi::common::ApiResponse;

/// Runs a normalized search request end to end against a store
pub async fn run_search<S>(
    store: &S,
    request: &SearchRequest,
    max_limit: u32,
) -> Result<ApiResponse<SearchResults>, SearchError>
where
    S: ListingStore + ?Sized,
{
    let query = build_query(&request.filter, request.sort);
    tracing::debug!(
        conditions = query.conditions.len(),
        order_by = %query.order_by,
        page = request.page,
        limit = request.limit,
        "executing room search"
    );

    let (mut rooms, info) = paginate(store, &query, request.page, request.limit, max_limit).await?;

    if let Some(center) = request.filter.coordinates {
        for room in &mut rooms {
            room.distance_km = Some(round_km(haversine_km(
                center.lat,
                center.lng,
                room.location.lat,
                room.location.lng,
            )));
        }
    }

    Ok(assemble(rooms, info))
}
