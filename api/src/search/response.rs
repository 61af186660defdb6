use super::error::SearchError;
use super::paginator::PaginationInfo;
use crate::database::listings::Listing;
use crate::openapi::common::{ApiError, ApiResponse};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct SearchResults {
    pub rooms: Vec<Listing>,
    pub pagination: PaginationInfo,
}

/// Wraps one page of rooms in the success envelope
pub fn assemble(rooms: Vec<Listing>, pagination: PaginationInfo) -> ApiResponse<SearchResults> {
    ApiResponse::ok(SearchResults { rooms, pagination })
}

/// Failure envelope with a user-facing message
pub fn assemble_error<T>(err: &SearchError) -> ApiResponse<T>
where
    T: poem_openapi::types::ParseFromJSON + poem_openapi::types::ToJSON,
{
    ApiResponse::err(ApiError::new(err.code(), err.public_message()))
}
