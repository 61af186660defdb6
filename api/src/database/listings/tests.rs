use super::*;
use crate::config::{Catalog, SearchSettings};
use crate::database::test_helpers::{setup_test_db, test_listing, test_time};
use crate::search::geo::haversine_km;
use crate::search::{
    build_query, paginate, parse_search_request, Coordinates, FilterModel, PaginationInfo,
    RawSearchParams, SortField, SortOrder, SortSpec,
};
use chrono::{TimeZone, Utc};
use std::collections::HashSet;

async fn insert(db: &Database, listings: Vec<NewListing>) -> Vec<String> {
    db.import_listings(listings, &Catalog::builtin())
        .await
        .unwrap()
}

async fn search(db: &Database, raw: RawSearchParams) -> (Vec<Listing>, PaginationInfo) {
    let settings = SearchSettings::default();
    let request = parse_search_request(&raw, &settings, &Catalog::builtin()).unwrap();
    let query = build_query(&request.filter, request.sort);
    paginate(db, &query, request.page, request.limit, settings.max_limit)
        .await
        .unwrap()
}

fn at(mut listing: NewListing, lat: f64, lng: f64) -> NewListing {
    listing.location.lat = lat;
    listing.location.lng = lng;
    listing
}

#[tokio::test]
async fn test_import_and_get_listing() {
    let db = setup_test_db().await;
    let mut listing = test_listing("Sunny room", 12000.0);
    listing.amenities = vec!["wifi".to_string(), "WIFI".to_string(), "Balcony".to_string()];
    listing.image_urls = vec!["https://cdn.example.com/a.jpg".to_string()];
    let ids = insert(&db, vec![listing]).await;

    let stored = db.get_listing(&ids[0]).await.unwrap().unwrap();
    assert_eq!(stored.title, "Sunny room");
    assert_eq!(stored.monthly_rent, 12000.0);
    assert_eq!(stored.location.city, "Mumbai");
    assert_eq!(stored.amenities, vec!["WiFi".to_string(), "Balcony".to_string()]);
    assert_eq!(stored.image_urls.len(), 1);
    assert_eq!(stored.created_at, test_time(0));
    assert!(stored.is_available);
    assert_eq!(stored.distance_km, None);
}

#[tokio::test]
async fn test_get_listing_not_found() {
    let db = setup_test_db().await;
    assert!(db.get_listing("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_import_rejects_invalid_listing_atomically() {
    let db = setup_test_db().await;
    let good = test_listing("Good", 5000.0);
    let bad = test_listing("Free", 0.0);
    let err = db
        .import_listings(vec![good, bad], &Catalog::builtin())
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("monthlyRent must be a positive number"));
    assert_eq!(db.count_all_listings().await.unwrap(), 0);
}

#[test]
fn test_validate_geo_point() {
    let listing = at(test_listing("Nowhere", 5000.0), 91.0, 0.0);
    assert!(listing.validate().is_err());
    let listing = at(test_listing("Somewhere", 5000.0), -33.9, 151.2);
    assert!(listing.validate().is_ok());
}

#[test]
fn test_new_listing_json_defaults() {
    let listing: NewListing = serde_json::from_str(
        r#"{
            "title": "Hostel bed",
            "monthlyRent": 4000,
            "location": {"city": "Pune", "state": "Maharashtra", "lat": 18.52, "lng": 73.85},
            "roomType": "hostel",
            "ownerId": "owner-5"
        }"#,
    )
    .unwrap();
    assert!(listing.is_available);
    assert!(listing.amenities.is_empty());
    assert_eq!(listing.room_type, crate::search::RoomType::Hostel);
    assert!(listing.created_at.is_none());
    assert!(listing.validate().is_ok());
}

#[test]
fn test_validate_rejects_unrepresentable_created_at() {
    let mut listing = test_listing("Far future", 5000.0);
    listing.created_at = Some(Utc.with_ymd_and_hms(2300, 1, 1, 0, 0, 0).unwrap());
    let err = listing.validate().unwrap_err();
    assert!(err.to_string().contains("outside the supported range"));
}

#[tokio::test]
async fn test_import_with_unrepresentable_created_at_stores_nothing() {
    let db = setup_test_db().await;
    let good = test_listing("Present day", 5000.0);
    let mut future = test_listing("Far future", 5000.0);
    future.created_at = Some(Utc.with_ymd_and_hms(2300, 1, 1, 0, 0, 0).unwrap());
    let err = db
        .import_listings(vec![good, future], &Catalog::builtin())
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("Invalid listing #2 (Far future)"));
    assert_eq!(db.count_all_listings().await.unwrap(), 0);
}

#[tokio::test]
async fn test_import_dedupes_unknown_amenities_ignoring_case() {
    let db = setup_test_db().await;
    let mut listing = test_listing("Terrace room", 8000.0);
    listing.amenities = vec!["Rooftop".to_string(), "rooftop".to_string(), "ROOFTOP".to_string()];
    let ids = insert(&db, vec![listing]).await;

    let stored = db.get_listing(&ids[0]).await.unwrap().unwrap();
    assert_eq!(stored.amenities, vec!["Rooftop".to_string()]);
}

#[tokio::test]
async fn test_non_ascii_text_matches_ignoring_case() {
    let db = setup_test_db().await;
    let mut cafe = test_listing("Café Room", 7000.0);
    cafe.location.city = "Délhi".to_string();
    cafe.location.state = "Ñew State".to_string();
    cafe.amenities = vec!["Écran".to_string()];
    insert(&db, vec![cafe, test_listing("Plain room", 7000.0)]).await;

    for raw in [
        RawSearchParams {
            city: Some("DÉLHI".to_string()),
            ..Default::default()
        },
        RawSearchParams {
            search: Some("CAFÉ".to_string()),
            ..Default::default()
        },
        RawSearchParams {
            state: Some("ñEW STATE".to_string()),
            ..Default::default()
        },
        RawSearchParams {
            amenities: Some("éCRAN".to_string()),
            ..Default::default()
        },
    ] {
        let (items, info) = search(&db, raw.clone()).await;
        assert_eq!(info.total, 1, "{:?}", raw);
        assert_eq!(items[0].title, "Café Room");
        assert_eq!(items[0].location.city, "Délhi");
    }
}

#[tokio::test]
async fn test_mumbai_rent_range_scenario() {
    let db = setup_test_db().await;
    let mut listings = Vec::new();
    for i in 0..15 {
        listings.push(test_listing(&format!("In range {}", i), 5000.0 + 1000.0 * i as f64));
    }
    for rent in [3000.0, 4999.0, 20001.0, 25000.0, 40000.0] {
        listings.push(test_listing("Out of range", rent));
    }
    let mut elsewhere = test_listing("Delhi flat", 10000.0);
    elsewhere.location.city = "Delhi".to_string();
    listings.push(elsewhere);
    insert(&db, listings).await;

    let (items, info) = search(
        &db,
        RawSearchParams {
            min_rent: Some("5000".to_string()),
            max_rent: Some("20000".to_string()),
            city: Some("mumbai".to_string()),
            page: Some("1".to_string()),
            limit: Some("10".to_string()),
            ..Default::default()
        },
    )
    .await;

    assert_eq!(items.len(), 10);
    assert_eq!(info.total, 15);
    assert_eq!(info.total_pages, 2);
    assert!(items
        .iter()
        .all(|l| (5000.0..=20000.0).contains(&l.monthly_rent) && l.location.city == "Mumbai"));
}

#[tokio::test]
async fn test_amenities_require_every_tag() {
    let db = setup_test_db().await;
    let mut both = test_listing("Both", 9000.0);
    both.amenities = vec!["WiFi".to_string(), "AC".to_string()];
    let mut many = test_listing("Many but no AC", 9000.0);
    many.amenities = [
        "WiFi", "Parking", "Laundry", "Kitchen", "TV", "Gym", "Lift", "CCTV", "Geyser", "Balcony",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let mut only_ac = test_listing("Only AC", 9000.0);
    only_ac.amenities = vec!["AC".to_string()];
    let mut superset = test_listing("Superset", 9000.0);
    superset.amenities = vec!["Gym".to_string(), "ac".to_string(), "wifi".to_string()];
    insert(&db, vec![both, many, only_ac, superset]).await;

    let (items, info) = search(
        &db,
        RawSearchParams {
            amenities: Some("WiFi,AC".to_string()),
            ..Default::default()
        },
    )
    .await;

    let titles: HashSet<_> = items.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(info.total, 2);
    assert_eq!(titles, HashSet::from(["Both", "Superset"]));
}

#[tokio::test]
async fn test_malformed_min_rent_searches_without_lower_bound() {
    let db = setup_test_db().await;
    insert(
        &db,
        vec![test_listing("Cheap", 1500.0), test_listing("Pricey", 50000.0)],
    )
    .await;

    let (items, info) = search(
        &db,
        RawSearchParams {
            min_rent: Some("abc".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(info.total, 2);
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn test_text_search_is_case_insensitive_over_title_and_description() {
    let db = setup_test_db().await;
    let mut by_description = test_listing("Plain room", 7000.0);
    by_description.description = "Lovely SEA VIEW from the window".to_string();
    let by_title = test_listing("Sea view studio", 9000.0);
    let unrelated = test_listing("Garden room", 8000.0);
    let literal = test_listing("100% furnished", 8000.0);
    insert(&db, vec![by_description, by_title, unrelated, literal]).await;

    let (_, info) = search(
        &db,
        RawSearchParams {
            search: Some("sea view".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(info.total, 2);

    let (items, _) = search(
        &db,
        RawSearchParams {
            search: Some("0%".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "100% furnished");
}

#[tokio::test]
async fn test_room_type_state_and_availability_filters() {
    let db = setup_test_db().await;
    let mut studio = test_listing("Studio", 15000.0);
    studio.room_type = crate::search::RoomType::Studio;
    let mut booked = test_listing("Booked studio", 15000.0);
    booked.room_type = crate::search::RoomType::Studio;
    booked.is_available = false;
    let mut karnataka = test_listing("Bangalore studio", 15000.0);
    karnataka.room_type = crate::search::RoomType::Studio;
    karnataka.location.state = "Karnataka".to_string();
    insert(&db, vec![studio, booked, karnataka]).await;

    let (_, info) = search(
        &db,
        RawSearchParams {
            room_type: Some("studio".to_string()),
            state: Some("MAHARASHTRA".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(info.total, 2, "availability is not filtered by default");

    let (items, info) = search(
        &db,
        RawSearchParams {
            room_type: Some("studio".to_string()),
            state: Some("maharashtra".to_string()),
            available: Some("true".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(info.total, 1);
    assert_eq!(items[0].title, "Studio");
}

#[tokio::test]
async fn test_geo_radius_boundary_is_inclusive() {
    let db = setup_test_db().await;
    let on_boundary = at(test_listing("Boundary", 6000.0), 0.0, 0.5);
    let inside = at(test_listing("Inside", 6000.0), 0.0, 0.1);
    let far = at(test_listing("Far", 6000.0), 0.0, 2.0);
    insert(&db, vec![on_boundary, inside, far]).await;

    let radius = haversine_km(0.0, 0.0, 0.0, 0.5);
    let geo_filter = |radius_km: f64| FilterModel {
        coordinates: Some(Coordinates {
            lat: 0.0,
            lng: 0.0,
            radius_km,
        }),
        ..Default::default()
    };

    let query = build_query(&geo_filter(radius), SortSpec::default());
    let (items, info) = paginate(&db, &query, 1, 10, 100).await.unwrap();
    let titles: HashSet<_> = items.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(info.total, 2);
    assert_eq!(titles, HashSet::from(["Boundary", "Inside"]));

    let query = build_query(&geo_filter(radius - 1.0), SortSpec::default());
    let (items, info) = paginate(&db, &query, 1, 10, 100).await.unwrap();
    assert_eq!(info.total, 1);
    assert_eq!(items[0].title, "Inside");
}

#[tokio::test]
async fn test_geo_search_is_not_a_bounding_box() {
    let db = setup_test_db().await;
    // Corner of the 10 km box around the center, about 14 km away
    let corner = at(test_listing("Corner", 6000.0), 0.0899, 0.0899);
    let edge = at(test_listing("Edge", 6000.0), 0.0, 0.0899);
    insert(&db, vec![corner, edge]).await;

    let (items, info) = search(
        &db,
        RawSearchParams {
            lat: Some("0".to_string()),
            lng: Some("0".to_string()),
            radius: Some("10".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert_eq!(info.total, 1);
    assert_eq!(items[0].title, "Edge");
}

#[tokio::test]
async fn test_pagination_partition_law_with_equal_timestamps() {
    let db = setup_test_db().await;
    let mut listings = Vec::new();
    for i in 0..23 {
        let mut listing = test_listing(&format!("Room {}", i), 8000.0);
        listing.id = Some(format!("room-{:02}", i));
        // Groups of listings share a creation time
        listing.created_at = Some(test_time((i / 5) as i64));
        listings.push(listing);
    }
    insert(&db, listings).await;

    let query = build_query(&FilterModel::default(), SortSpec::default());
    let (_, first) = paginate(&db, &query, 1, 4, 100).await.unwrap();
    assert_eq!(first.total, 23);
    assert_eq!(first.total_pages, 6);

    let mut seen = Vec::new();
    for page in 1..=first.total_pages as u32 {
        let (items, info) = paginate(&db, &query, page, 4, 100).await.unwrap();
        assert_eq!(info, crate::search::PaginationInfo::new(page, 4, 23));
        seen.extend(items.into_iter().map(|l| (l.created_at, l.id)));
    }

    assert_eq!(seen.len(), 23);
    let unique: HashSet<_> = seen.iter().map(|(_, id)| id.clone()).collect();
    assert_eq!(unique.len(), 23);

    let mut expected = seen.clone();
    expected.sort_by(|a, b| b.cmp(a));
    assert_eq!(seen, expected, "pages follow createdAt desc, id desc");

    let (items, info) = paginate(&db, &query, 7, 4, 100).await.unwrap();
    assert!(items.is_empty());
    assert_eq!((info.total, info.total_pages), (23, 6));
}

#[tokio::test]
async fn test_paginate_is_idempotent() {
    let db = setup_test_db().await;
    let listings = (0..12)
        .map(|i| test_listing(&format!("Room {}", i), 5000.0 + i as f64))
        .collect();
    insert(&db, listings).await;

    let query = build_query(
        &FilterModel::default(),
        SortSpec {
            field: SortField::MonthlyRent,
            order: SortOrder::Asc,
        },
    );
    let first = paginate(&db, &query, 2, 5, 100).await.unwrap();
    let second = paginate(&db, &query, 2, 5, 100).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.0[0].monthly_rent, 5005.0);
}

#[tokio::test]
async fn test_sort_by_title_ignores_case() {
    let db = setup_test_db().await;
    insert(
        &db,
        vec![
            test_listing("banana room", 5000.0),
            test_listing("Apple room", 5000.0),
            test_listing("cherry room", 5000.0),
        ],
    )
    .await;

    let (items, _) = search(
        &db,
        RawSearchParams {
            sort_by: Some("title".to_string()),
            sort_order: Some("asc".to_string()),
            ..Default::default()
        },
    )
    .await;
    let titles: Vec<_> = items.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["Apple room", "banana room", "cherry room"]);
}

#[tokio::test]
async fn test_owner_scope_filters_listings() {
    let db = setup_test_db().await;
    let mine = test_listing("Mine", 5000.0);
    let mut theirs = test_listing("Theirs", 5000.0);
    theirs.owner_id = "owner-2".to_string();
    insert(&db, vec![mine, theirs]).await;

    let query = build_query(
        &FilterModel::default().scoped_to_owner("owner-2"),
        SortSpec::default(),
    );
    let (items, info) = paginate(&db, &query, 1, 10, 100).await.unwrap();
    assert_eq!(info.total, 1);
    assert_eq!(items[0].title, "Theirs");
}
