/// Shared test helpers for database tests
use super::listings::{Location, NewListing};
use super::Database;
use crate::search::RoomType;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::SqlitePoolOptions;

/// Set up a fresh in-memory database with all migrations applied.
/// A single connection keeps every query on the same in-memory database.
pub async fn setup_test_db() -> Database {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite database");
    Database::from_pool(pool)
        .await
        .expect("Migration failed")
}

/// Timestamp `seconds` after a fixed epoch, for deterministic ordering
pub fn test_time(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
}

/// Listing in Mumbai with sensible defaults; tests override what they care about
pub fn test_listing(title: &str, monthly_rent: f64) -> NewListing {
    NewListing {
        id: None,
        title: title.to_string(),
        description: format!("{} description", title),
        monthly_rent,
        location: Location {
            address: "1 Test Road".to_string(),
            city: "Mumbai".to_string(),
            state: "Maharashtra".to_string(),
            pincode: "400001".to_string(),
            lat: 19.076,
            lng: 72.8777,
        },
        amenities: Vec::new(),
        room_type: RoomType::Single,
        is_available: true,
        owner_id: "owner-1".to_string(),
        image_urls: Vec::new(),
        created_at: Some(test_time(0)),
    }
}
