pub mod common;
pub mod rooms;
pub mod system;

pub use rooms::RoomsApi;
pub use system::SystemApi;

use poem_openapi::OpenApi;

/// Combines all API modules into a single OpenAPI specification
pub fn create_combined_api() -> impl OpenApi {
    (SystemApi, RoomsApi)
}
