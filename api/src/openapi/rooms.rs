use super::common::{ApiError, ApiResponse, ApiTags};
use crate::auth::{AuthError, CallerIdentity};
use crate::config::AppConfig;
use crate::database::{Database, Listing};
use crate::search::{
    assemble_error, parse_search_request, run_search, RawSearchParams, RoomType, SearchError,
    SearchResults,
};
use poem::web::Data;
use poem_openapi::{
    param::{Header, Path, Query},
    payload::Json,
    Object, OpenApi,
};
use std::sync::Arc;
use strum::IntoEnumIterator;

pub struct RoomsApi;

const ROOM_UNAVAILABLE_MESSAGE: &str = "Room details are temporarily unavailable";

#[derive(poem_openapi::ApiResponse)]
pub enum SearchRoomsResponse {
    /// One page of matching rooms
    #[oai(status = 200)]
    Ok(Json<ApiResponse<SearchResults>>),
    /// Unknown enum value or conflicting rent range
    #[oai(status = 400)]
    BadRequest(Json<ApiResponse<SearchResults>>),
    /// Caller identity missing
    #[oai(status = 401)]
    Unauthorized(Json<ApiResponse<SearchResults>>),
    /// Caller may not view the requested owner's listings
    #[oai(status = 403)]
    Forbidden(Json<ApiResponse<SearchResults>>),
    /// Backing store failure
    #[oai(status = 503)]
    Unavailable(Json<ApiResponse<SearchResults>>),
}

impl From<SearchError> for SearchRoomsResponse {
    fn from(err: SearchError) -> Self {
        let body = Json(assemble_error(&err));
        match err {
            SearchError::StoreUnavailable(_) => SearchRoomsResponse::Unavailable(body),
            _ => {
                tracing::debug!("Rejected search request: {}", err);
                SearchRoomsResponse::BadRequest(body)
            }
        }
    }
}

impl From<AuthError> for SearchRoomsResponse {
    fn from(err: AuthError) -> Self {
        tracing::warn!("Owner-scoped search denied: {}", err);
        let body = Json(ApiResponse::err(ApiError::new(err.code(), err.to_string())));
        match err {
            AuthError::Forbidden(_) => SearchRoomsResponse::Forbidden(body),
            _ => SearchRoomsResponse::Unauthorized(body),
        }
    }
}

#[derive(poem_openapi::ApiResponse)]
pub enum RoomResponse {
    #[oai(status = 200)]
    Ok(Json<ApiResponse<Listing>>),
    #[oai(status = 404)]
    NotFound(Json<ApiResponse<Listing>>),
    #[oai(status = 503)]
    Unavailable(Json<ApiResponse<Listing>>),
}

#[derive(Debug, Object)]
#[oai(rename_all = "camelCase")]
pub struct CatalogData {
    pub cities: Vec<String>,
    pub amenities: Vec<String>,
    pub room_types: Vec<RoomType>,
}

#[OpenApi]
impl RoomsApi {
    /// Search rooms
    ///
    /// Filters listings by text, rent range, city, state, room type, amenities,
    /// availability and distance, returning one page plus pagination metadata.
    /// Malformed numeric filters are ignored.
    #[oai(path = "/rooms", method = "get", tag = "ApiTags::Rooms")]
    #[allow(clippy::too_many_arguments)]
    async fn search_rooms(
        &self,
        db: Data<&Arc<Database>>,
        config: Data<&Arc<AppConfig>>,
        search: Query<Option<String>>,
        #[oai(name = "minRent")] min_rent: Query<Option<String>>,
        #[oai(name = "maxRent")] max_rent: Query<Option<String>>,
        city: Query<Option<String>>,
        state: Query<Option<String>>,
        #[oai(name = "roomType")] room_type: Query<Option<String>>,
        amenities: Query<Option<String>>,
        lat: Query<Option<String>>,
        lng: Query<Option<String>>,
        radius: Query<Option<String>>,
        available: Query<Option<String>>,
        page: Query<Option<String>>,
        limit: Query<Option<String>>,
        #[oai(name = "sortBy")] sort_by: Query<Option<String>>,
        #[oai(name = "sortOrder")] sort_order: Query<Option<String>>,
    ) -> SearchRoomsResponse {
        let raw = RawSearchParams {
            search: search.0,
            min_rent: min_rent.0,
            max_rent: max_rent.0,
            city: city.0,
            state: state.0,
            room_type: room_type.0,
            amenities: amenities.0,
            lat: lat.0,
            lng: lng.0,
            radius: radius.0,
            available: available.0,
            page: page.0,
            limit: limit.0,
            sort_by: sort_by.0,
            sort_order: sort_order.0,
        };

        let request = match parse_search_request(&raw, &config.search, &config.catalog) {
            Ok(request) => request,
            Err(e) => return e.into(),
        };

        match run_search(db.0.as_ref(), &request, config.search.max_limit).await {
            Ok(response) => SearchRoomsResponse::Ok(Json(response)),
            Err(e) => e.into(),
        }
    }

    /// Search my listings
    ///
    /// Same filters as room search, restricted to the caller's own listings.
    /// Admins may pass `ownerId` to inspect another owner's listings.
    #[oai(path = "/rooms/mine", method = "get", tag = "ApiTags::Rooms")]
    #[allow(clippy::too_many_arguments)]
    async fn search_my_rooms(
        &self,
        db: Data<&Arc<Database>>,
        config: Data<&Arc<AppConfig>>,
        #[oai(name = "X-User-Id")] user_id: Header<Option<String>>,
        #[oai(name = "X-User-Role")] user_role: Header<Option<String>>,
        #[oai(name = "ownerId")] owner_id: Query<Option<String>>,
        search: Query<Option<String>>,
        #[oai(name = "minRent")] min_rent: Query<Option<String>>,
        #[oai(name = "maxRent")] max_rent: Query<Option<String>>,
        city: Query<Option<String>>,
        state: Query<Option<String>>,
        #[oai(name = "roomType")] room_type: Query<Option<String>>,
        amenities: Query<Option<String>>,
        lat: Query<Option<String>>,
        lng: Query<Option<String>>,
        radius: Query<Option<String>>,
        available: Query<Option<String>>,
        page: Query<Option<String>>,
        limit: Query<Option<String>>,
        #[oai(name = "sortBy")] sort_by: Query<Option<String>>,
        #[oai(name = "sortOrder")] sort_order: Query<Option<String>>,
    ) -> SearchRoomsResponse {
        let owner = match CallerIdentity::from_headers(user_id.0.as_deref(), user_role.0.as_deref())
            .and_then(|identity| identity.owner_scope(owner_id.0.as_deref()))
        {
            Ok(owner) => owner,
            Err(e) => return e.into(),
        };

        let raw = RawSearchParams {
            search: search.0,
            min_rent: min_rent.0,
            max_rent: max_rent.0,
            city: city.0,
            state: state.0,
            room_type: room_type.0,
            amenities: amenities.0,
            lat: lat.0,
            lng: lng.0,
            radius: radius.0,
            available: available.0,
            page: page.0,
            limit: limit.0,
            sort_by: sort_by.0,
            sort_order: sort_order.0,
        };

        let mut request = match parse_search_request(&raw, &config.search, &config.catalog) {
            Ok(request) => request,
            Err(e) => return e.into(),
        };
        request.filter = request.filter.scoped_to_owner(owner);

        match run_search(db.0.as_ref(), &request, config.search.max_limit).await {
            Ok(response) => SearchRoomsResponse::Ok(Json(response)),
            Err(e) => e.into(),
        }
    }

    /// Search catalog
    ///
    /// Cities, amenity vocabulary and room types offered as filter choices
    #[oai(path = "/rooms/catalog", method = "get", tag = "ApiTags::Rooms")]
    async fn get_catalog(&self, config: Data<&Arc<AppConfig>>) -> Json<ApiResponse<CatalogData>> {
        Json(ApiResponse::ok(CatalogData {
            cities: config.catalog.cities.clone(),
            amenities: config.catalog.amenities.clone(),
            room_types: RoomType::iter().collect(),
        }))
    }

    /// Get room by ID
    ///
    /// Returns details of a specific listing
    #[oai(path = "/rooms/:id", method = "get", tag = "ApiTags::Rooms")]
    async fn get_room(&self, db: Data<&Arc<Database>>, id: Path<String>) -> RoomResponse {
        match db.get_listing(&id.0).await {
            Ok(Some(listing)) => RoomResponse::Ok(Json(ApiResponse::ok(listing))),
            Ok(None) => RoomResponse::NotFound(Json(ApiResponse::err(ApiError::new(
                "NOT_FOUND",
                "Room not found",
            )))),
            Err(e) => {
                tracing::error!("Failed to load room {}: {:#}", id.0, e);
                RoomResponse::Unavailable(Json(ApiResponse::err(ApiError::new(
                    "STORE_UNAVAILABLE",
                    ROOM_UNAVAILABLE_MESSAGE,
                ))))
            }
        }
    }
}
