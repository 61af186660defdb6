use super::error::SearchError;
use super::types::{
    Coordinates, FilterModel, RawSearchParams, RoomType, SearchRequest, SortField, SortOrder,
    SortSpec,
};
use crate::config::{Catalog, SearchSettings};
use std::str::FromStr;
use strum::IntoEnumIterator;

/// Normalizes raw query parameters into a search request.
///
/// Malformed optional numeric filters are dropped rather than failing the request.
/// Unknown enum values and a non-increasing rent range are rejected.
pub fn parse_search_request(
    raw: &RawSearchParams,
    settings: &SearchSettings,
    catalog: &Catalog,
) -> Result<SearchRequest, SearchError> {
    let min_rent = parse_non_negative("minRent", raw.min_rent.as_deref());
    let max_rent = parse_non_negative("maxRent", raw.max_rent.as_deref());
    if let (Some(min_rent), Some(max_rent)) = (min_rent, max_rent) {
        if min_rent >= max_rent {
            return Err(SearchError::RangeConflict { min_rent, max_rent });
        }
    }

    let filter = FilterModel {
        search_text: clean_text(raw.search.as_deref()),
        min_rent,
        max_rent,
        city: clean_text(raw.city.as_deref()),
        state: clean_text(raw.state.as_deref()),
        room_type: parse_enum::<RoomType>("roomType", raw.room_type.as_deref())?,
        amenities: parse_amenities(raw.amenities.as_deref(), catalog),
        coordinates: parse_coordinates(raw, settings.default_radius_km),
        available: parse_bool("available", raw.available.as_deref()),
        owner_id: None,
    };

    let sort = SortSpec {
        field: parse_enum::<SortField>("sortBy", raw.sort_by.as_deref())?.unwrap_or_default(),
        order: parse_enum::<SortOrder>("sortOrder", raw.sort_order.as_deref())?
            .unwrap_or_default(),
    };

    let page = parse_positive_int("page", raw.page.as_deref()).unwrap_or(1);
    let limit = parse_positive_int("limit", raw.limit.as_deref())
        .unwrap_or(settings.default_limit)
        .min(settings.max_limit);

    Ok(SearchRequest {
        filter,
        sort,
        page,
        limit,
    })
}

/// Trimmed text, or None when nothing is left
fn clean_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_non_negative(field: &str, value: Option<&str>) -> Option<f64> {
    let text = clean_text(value)?;
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Some(n),
        _ => {
            tracing::debug!(field, value = %text, "dropping malformed numeric filter");
            None
        }
    }
}

fn parse_finite(field: &str, value: Option<&str>) -> Option<f64> {
    let text = clean_text(value)?;
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n),
        _ => {
            tracing::debug!(field, value = %text, "dropping malformed numeric filter");
            None
        }
    }
}

fn parse_positive_int(field: &str, value: Option<&str>) -> Option<u32> {
    let text = clean_text(value)?;
    match text.parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            tracing::debug!(field, value = %text, "ignoring invalid pagination value");
            None
        }
    }
}

fn parse_bool(field: &str, value: Option<&str>) -> Option<bool> {
    let text = clean_text(value)?;
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => {
            tracing::debug!(field, value = %text, "dropping malformed boolean filter");
            None
        }
    }
}

fn parse_enum<T>(field: &'static str, value: Option<&str>) -> Result<Option<T>, SearchError>
where
    T: FromStr + IntoEnumIterator + std::fmt::Display,
{
    let Some(text) = clean_text(value) else {
        return Ok(None);
    };
    T::from_str(&text)
        .map(Some)
        .map_err(|_| SearchError::InvalidEnum {
            field,
            value: text,
            allowed: T::iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// Comma-separated tags, deduplicated case-insensitively, in catalog spelling
fn parse_amenities(value: Option<&str>, catalog: &Catalog) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in value.unwrap_or_default().split(',') {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        let canonical = catalog.canonical_amenity(tag);
        if !tags.iter().any(|t| t.to_lowercase() == canonical.to_lowercase()) {
            tags.push(canonical);
        }
    }
    tags
}

fn parse_coordinates(raw: &RawSearchParams, default_radius_km: f64) -> Option<Coordinates> {
    let lat = parse_finite("lat", raw.lat.as_deref())?;
    let lng = parse_finite("lng", raw.lng.as_deref())?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        tracing::debug!(lat, lng, "dropping out-of-range coordinates");
        return None;
    }
    let radius_km = parse_non_negative("radius", raw.radius.as_deref())
        .filter(|r| *r > 0.0)
        .unwrap_or(default_radius_km);
    Some(Coordinates {
        lat,
        lng,
        radius_km,
    })
}
