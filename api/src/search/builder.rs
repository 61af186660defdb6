use super::geo::{max_chord_squared, UnitVector};
use super::types::{FilterModel, SortSpec};

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    Float(f64),
    Bool(bool),
}

/// Backing-store query: a WHERE conjunction with positional binds and a total order
#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    pub conditions: Vec<String>,
    pub binds: Vec<SqlValue>,
    pub order_by: String,
}

impl StoreQuery {
    /// WHERE clause including the keyword, or an empty string when unconstrained
    pub fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn order_sql(&self) -> String {
        format!(" ORDER BY {}", self.order_by)
    }

    fn push(&mut self, condition: impl Into<String>, binds: impl IntoIterator<Item = SqlValue>) {
        self.conditions.push(condition.into());
        self.binds.extend(binds);
    }
}

/// Translates a filter and sort into a store query.
/// Only present filter fields contribute predicates; they are ANDed together.
pub fn build_query(filter: &FilterModel, sort: SortSpec) -> StoreQuery {
    let mut query = StoreQuery {
        conditions: Vec::new(),
        binds: Vec::new(),
        order_by: order_by(sort),
    };

    if let Some(text) = &filter.search_text {
        let pattern = format!("%{}%", escape_like(&text.to_lowercase()));
        query.push(
            r"(title_lc LIKE ? ESCAPE '\' OR description_lc LIKE ? ESCAPE '\')",
            [SqlValue::String(pattern.clone()), SqlValue::String(pattern)],
        );
    }

    if let Some(min) = filter.min_rent {
        query.push("monthly_rent >= ?", [SqlValue::Float(min)]);
    }
    if let Some(max) = filter.max_rent {
        query.push("monthly_rent <= ?", [SqlValue::Float(max)]);
    }

    if let Some(city) = &filter.city {
        query.push("city_lc = ?", [SqlValue::String(city.to_lowercase())]);
    }
    if let Some(state) = &filter.state {
        query.push("state_lc = ?", [SqlValue::String(state.to_lowercase())]);
    }

    if let Some(room_type) = filter.room_type {
        query.push("room_type = ?", [SqlValue::String(room_type.to_string())]);
    }

    if !filter.amenities.is_empty() {
        // Requested tags missing from the listing's tag array disqualify it
        let wanted: Vec<String> = filter.amenities.iter().map(|a| a.to_lowercase()).collect();
        let wanted = serde_json::Value::from(wanted).to_string();
        query.push(
            "NOT EXISTS (SELECT 1 FROM json_each(?) AS wanted \
             WHERE wanted.value NOT IN \
             (SELECT have.value FROM json_each(listings.amenities_lc) AS have))",
            [SqlValue::String(wanted)],
        );
    }

    if let Some(coords) = filter.coordinates {
        let center = UnitVector::from_lat_lng(coords.lat, coords.lng);
        query.push(
            "((geo_x - ?) * (geo_x - ?) + (geo_y - ?) * (geo_y - ?) \
             + (geo_z - ?) * (geo_z - ?)) <= ?",
            [
                SqlValue::Float(center.x),
                SqlValue::Float(center.x),
                SqlValue::Float(center.y),
                SqlValue::Float(center.y),
                SqlValue::Float(center.z),
                SqlValue::Float(center.z),
                SqlValue::Float(max_chord_squared(coords.radius_km)),
            ],
        );
    }

    if let Some(available) = filter.available {
        query.push("is_available = ?", [SqlValue::Bool(available)]);
    }

    if let Some(owner_id) = &filter.owner_id {
        query.push("owner_id = ?", [SqlValue::String(owner_id.clone())]);
    }

    query
}

/// Sort key followed by an identity tie-break so equal keys page deterministically
fn order_by(sort: SortSpec) -> String {
    let direction = sort.order.keyword();
    format!("{} {}, id {}", sort.field.column(), direction, direction)
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
