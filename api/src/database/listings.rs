use super::types::Database;
use crate::config::Catalog;
use crate::search::geo::UnitVector;
use crate::search::{ListingStore, RoomType, SqlValue, StoreQuery};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const LISTING_COLUMNS: &str = "id, title, description, monthly_rent, address, city, state, \
    pincode, latitude, longitude, amenities, image_urls, room_type, is_available, owner_id, \
    created_at_ns";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub address: String,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Object)]
#[serde(rename_all = "camelCase")]
#[oai(rename_all = "camelCase", skip_serializing_if_is_none)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub description: String,
    pub monthly_rent: f64,
    pub location: Location,
    pub amenities: Vec<String>,
    pub room_type: RoomType,
    pub is_available: bool,
    pub owner_id: String,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Distance from the search center, present for geo searches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Listing submitted for import; id and creation time are assigned when absent
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub monthly_rent: f64,
    pub location: Location,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub room_type: RoomType,
    #[serde(default = "default_true")]
    pub is_available: bool,
    pub owner_id: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl NewListing {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            bail!("title is required");
        }
        if self.owner_id.trim().is_empty() {
            bail!("ownerId is required");
        }
        if !self.monthly_rent.is_finite() || self.monthly_rent <= 0.0 {
            bail!("monthlyRent must be a positive number");
        }
        let Location { lat, lng, .. } = self.location;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            bail!("location ({}, {}) is not a valid geo-point", lat, lng);
        }
        if self.location.city.trim().is_empty() || self.location.state.trim().is_empty() {
            bail!("location city and state are required");
        }
        if let Some(created_at) = self.created_at {
            if created_at.timestamp_nanos_opt().is_none() {
                bail!("createdAt {} is outside the supported range", created_at);
            }
        }
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    id: String,
    title: String,
    description: String,
    monthly_rent: f64,
    address: String,
    city: String,
    state: String,
    pincode: String,
    latitude: f64,
    longitude: f64,
    amenities: String,
    image_urls: String,
    room_type: String,
    is_available: bool,
    owner_id: String,
    created_at_ns: i64,
}

impl TryFrom<ListingRow> for Listing {
    type Error = anyhow::Error;

    fn try_from(row: ListingRow) -> Result<Self> {
        let room_type = RoomType::from_str(&row.room_type).with_context(|| {
            format!("Listing {} has unknown room type {}", row.id, row.room_type)
        })?;
        let amenities: Vec<String> = serde_json::from_str(&row.amenities)
            .with_context(|| format!("Listing {} has malformed amenities", row.id))?;
        let image_urls: Vec<String> = serde_json::from_str(&row.image_urls)
            .with_context(|| format!("Listing {} has malformed image URLs", row.id))?;
        Ok(Listing {
            id: row.id,
            title: row.title,
            description: row.description,
            monthly_rent: row.monthly_rent,
            location: Location {
                address: row.address,
                city: row.city,
                state: row.state,
                pincode: row.pincode,
                lat: row.latitude,
                lng: row.longitude,
            },
            amenities,
            room_type,
            is_available: row.is_available,
            owner_id: row.owner_id,
            image_urls,
            created_at: DateTime::from_timestamp_nanos(row.created_at_ns),
            distance_km: None,
        })
    }
}

impl Database {
    /// Validate and insert listings in one transaction, returning their ids.
    /// Amenity tags are stored in catalog spelling.
    pub async fn import_listings(
        &self,
        listings: Vec<NewListing>,
        catalog: &Catalog,
    ) -> Result<Vec<String>> {
        for (idx, listing) in listings.iter().enumerate() {
            listing
                .validate()
                .with_context(|| format!("Invalid listing #{} ({})", idx + 1, listing.title))?;
        }

        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(listings.len());

        for listing in listings {
            let id = listing
                .id
                .clone()
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let created_at = listing.created_at.unwrap_or_else(Utc::now);
            let created_at_ns = created_at.timestamp_nanos_opt().with_context(|| {
                format!("createdAt {} is outside the supported range", created_at)
            })?;
            let geo = UnitVector::from_lat_lng(listing.location.lat, listing.location.lng);

            let mut amenities: Vec<String> = Vec::new();
            for tag in &listing.amenities {
                let canonical = catalog.canonical_amenity(tag);
                if !canonical.is_empty()
                    && !amenities.iter().any(|a| a.to_lowercase() == canonical.to_lowercase())
                {
                    amenities.push(canonical);
                }
            }

            let amenities_lc: Vec<String> = amenities.iter().map(|a| a.to_lowercase()).collect();
            let title = listing.title.trim();
            let description = listing.description.trim();
            let city = listing.location.city.trim();
            let state = listing.location.state.trim();

            sqlx::query(
                "INSERT INTO listings (id, title, description, monthly_rent, address, city, state, \
                 pincode, latitude, longitude, geo_x, geo_y, geo_z, amenities, image_urls, \
                 room_type, is_available, owner_id, created_at_ns, \
                 title_lc, description_lc, city_lc, state_lc, amenities_lc) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(id.as_str())
            .bind(title)
            .bind(description)
            .bind(listing.monthly_rent)
            .bind(listing.location.address.trim())
            .bind(city)
            .bind(state)
            .bind(listing.location.pincode.trim())
            .bind(listing.location.lat)
            .bind(listing.location.lng)
            .bind(geo.x)
            .bind(geo.y)
            .bind(geo.z)
            .bind(serde_json::to_string(&amenities)?)
            .bind(serde_json::to_string(&listing.image_urls)?)
            .bind(listing.room_type.to_string())
            .bind(listing.is_available)
            .bind(listing.owner_id.trim())
            .bind(created_at_ns)
            .bind(title.to_lowercase())
            .bind(description.to_lowercase())
            .bind(city.to_lowercase())
            .bind(state.to_lowercase())
            .bind(serde_json::to_string(&amenities_lc)?)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert listing {}", id))?;

            ids.push(id);
        }

        tx.commit().await?;
        tracing::info!("Imported {} listings", ids.len());
        Ok(ids)
    }

    /// Get single listing by id
    pub async fn get_listing(&self, id: &str) -> Result<Option<Listing>> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {} FROM listings WHERE id = ?",
            LISTING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Listing::try_from).transpose()
    }

    /// Count all listings
    pub async fn count_all_listings(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM listings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }
}

#[async_trait]
impl ListingStore for Database {
    async fn count_listings(&self, query: &StoreQuery) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM listings{}", query.where_sql());
        let mut count_query = sqlx::query_scalar::<_, i64>(&sql);
        for value in &query.binds {
            count_query = match value {
                SqlValue::String(s) => count_query.bind(s.as_str()),
                SqlValue::Float(f) => count_query.bind(*f),
                SqlValue::Bool(b) => count_query.bind(*b),
            };
        }
        let count = count_query.fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn find_listings(
        &self,
        query: &StoreQuery,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Listing>> {
        let sql = format!(
            "SELECT {} FROM listings{}{} LIMIT ? OFFSET ?",
            LISTING_COLUMNS,
            query.where_sql(),
            query.order_sql()
        );
        let mut rows_query = sqlx::query_as::<_, ListingRow>(&sql);
        for value in &query.binds {
            rows_query = match value {
                SqlValue::String(s) => rows_query.bind(s.as_str()),
                SqlValue::Float(f) => rows_query.bind(*f),
                SqlValue::Bool(b) => rows_query.bind(*b),
            };
        }
        let rows = rows_query
            .bind(i64::from(limit))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Listing::try_from).collect()
    }
}

#[cfg(test)]
mod tests;
