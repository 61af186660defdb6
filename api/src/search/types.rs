//! Typed search request produced from raw query parameters
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Closed set of room types a listing can have
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    poem_openapi::Enum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[oai(rename_all = "lowercase")]
pub enum RoomType {
    Single,
    Double,
    Shared,
    Studio,
    #[serde(rename = "1bhk")]
    #[strum(serialize = "1bhk")]
    #[oai(rename = "1bhk")]
    OneBhk,
    #[serde(rename = "2bhk")]
    #[strum(serialize = "2bhk")]
    #[oai(rename = "2bhk")]
    TwoBhk,
    #[serde(rename = "3bhk")]
    #[strum(serialize = "3bhk")]
    #[oai(rename = "3bhk")]
    ThreeBhk,
    Pg,
    Hostel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum SortField {
    #[default]
    CreatedAt,
    MonthlyRent,
    Title,
}

impl SortField {
    /// Column expression used in ORDER BY
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at_ns",
            SortField::MonthlyRent => "monthly_rent",
            SortField::Title => "title_lc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

/// Search center and radius in kilometers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: f64,
}

/// Normalized search criteria. Absent fields impose no constraint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterModel {
    pub search_text: Option<String>,
    pub min_rent: Option<f64>,
    pub max_rent: Option<f64>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub room_type: Option<RoomType>,
    /// Every tag must be present on a listing; empty means no constraint
    pub amenities: Vec<String>,
    pub coordinates: Option<Coordinates>,
    pub available: Option<bool>,
    pub owner_id: Option<String>,
}

impl FilterModel {
    /// Returns a copy restricted to listings of one owner
    pub fn scoped_to_owner(self, owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub filter: FilterModel,
    pub sort: SortSpec,
    pub page: u32,
    pub limit: u32,
}

/// Untyped query parameters exactly as received on the wire
#[derive(Debug, Clone, Default)]
pub struct RawSearchParams {
    pub search: Option<String>,
    pub min_rent: Option<String>,
    pub max_rent: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub room_type: Option<String>,
    pub amenities: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
    pub available: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}
