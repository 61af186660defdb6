mod builder;
mod error;
mod filter;
pub mod geo;
mod paginator;
mod response;
mod service;
mod types;

pub use builder::{build_query, SqlValue, StoreQuery};
pub use error::SearchError;
pub use filter::parse_search_request;
pub use paginator::{paginate, ListingStore, PaginationInfo};
pub use response::{assemble, assemble_error, SearchResults};
pub use service::run_search;
pub use types::{
    Coordinates, FilterModel, RawSearchParams, RoomType, SearchRequest, SortField, SortOrder,
    SortSpec,
};
