pub mod core;
pub mod listings;
pub mod types;

// Re-export main types
pub use listings::{Listing, Location, NewListing};
pub use types::Database;

#[cfg(test)]
pub mod test_helpers;
