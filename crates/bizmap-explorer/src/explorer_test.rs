use std::collections::BTreeSet;
use std::time::Duration;

use bizmap_core::{Coordinates, DirectoryPayload, SourceItem};
use serde_json::json;

use super::*;
use crate::location::FixedLocation;
use crate::map::{ClusterOptions, MapHit, SelectionView};
use crate::search::debounced;
use crate::sort::{SortColumn, SortDirection};
use crate::test_support::{company, items};

fn explorer(page_size: usize) -> Explorer {
    Explorer::with_settings(page_size, Duration::from_millis(300), ClusterOptions::default())
}

fn helsinki() -> Vec<SourceItem> {
    items(&[
        company("1000000-1", "Kahvila Aalto", "I", (60.170, 24.940)),
        company("1000000-2", "Rakennus Oy", "F", (60.171, 24.941)),
        company("1000000-3", "Kauppa Beta", "G", (60.200, 24.900)),
        company("1000000-4", "Oulu Tech", "J", (65.000, 25.500)),
        company("1000000-5", "Aalto Kauppa", "G", (60.180, 24.950)),
    ])
}

fn ids(records: &[bizmap_core::CompanyRecord]) -> Vec<&str> {
    records.iter().map(|r| r.business_id.as_str()).collect()
}

#[test]
fn load_city_sorts_by_name_and_feeds_map() {
    let mut ex = explorer(20);
    ex.load_city("HELSINKI", helsinki());

    assert_eq!(ex.city(), Some("HELSINKI"));
    assert_eq!(
        ids(ex.results()),
        vec!["1000000-5", "1000000-1", "1000000-3", "1000000-4", "1000000-2"]
    );
    assert_eq!(ex.map().source().features().len(), 5);
}

#[test]
fn duplicate_items_keep_last_value() {
    let mut first = company("1000000-1", "Old Name", "I", (60.170, 24.940));
    first.is_active = false;
    let second = company("1000000-1", "New Name", "I", (60.170, 24.940));

    let mut ex = explorer(20);
    ex.load_city("HELSINKI", items(&[first, second]));

    assert_eq!(ex.results().len(), 1);
    assert_eq!(ex.results()[0].name, "New Name");
    assert_eq!(ex.map().source().features().len(), 1);
}

#[test]
fn pages_concatenate_to_full_results() {
    let mut ex = explorer(2);
    ex.load_city("HELSINKI", helsinki());

    let mut seen = Vec::new();
    for page in 1..=3 {
        assert_eq!(ex.set_page(page), page);
        let table = ex.table();
        assert_eq!(table.total_pages, 3);
        seen.extend(table.rows);
    }
    assert_eq!(seen, ex.results());
}

#[test]
fn set_page_clamps_out_of_range() {
    let mut ex = explorer(2);
    ex.load_city("HELSINKI", helsinki());

    assert_eq!(ex.set_page(99), 3);
    assert_eq!(ex.set_page(0), 1);
}

#[test]
fn narrowing_filter_clamps_current_page() {
    let mut ex = explorer(2);
    ex.load_city("HELSINKI", helsinki());
    ex.set_page(3);

    ex.set_industries(BTreeSet::from(["G".to_string()]));

    let table = ex.table();
    assert_eq!(table.current_page, 1);
    assert_eq!(table.total_items, 2);
}

#[test]
fn recompute_is_idempotent() {
    let mut ex = explorer(20);
    ex.load_city("HELSINKI", helsinki());
    ex.set_industries(BTreeSet::from(["G".to_string()]));
    let before = ex.results().to_vec();
    let revision = ex.map().source().revision();

    ex.set_industries(BTreeSet::from(["G".to_string()]));

    assert_eq!(ex.results(), before.as_slice());
    assert_eq!(ex.map().source().revision(), revision);
}

#[test]
fn only_latest_search_ticket_commits() {
    let mut ex = explorer(20);
    ex.load_city("HELSINKI", helsinki());

    let stale = ex.schedule_search("kahvila");
    let latest = ex.schedule_search("kauppa");

    assert!(!ex.commit_search(&stale));
    assert_eq!(ex.results().len(), 5);

    assert!(ex.commit_search(&latest));
    assert_eq!(ex.filter().search_term, "kauppa");
    assert_eq!(ids(ex.results()), vec!["1000000-5", "1000000-3"]);
    assert_eq!(ex.map().source().features().len(), 2);
}

#[test]
fn map_shows_all_matches_not_just_current_page() {
    let mut ex = explorer(1);
    ex.load_city("HELSINKI", helsinki());

    assert_eq!(ex.table().rows.len(), 1);
    assert_eq!(ex.map().source().features().len(), 5);
}

#[test]
fn distance_filter_needs_location_and_limit() {
    let mut ex = explorer(20);
    ex.load_city("HELSINKI", helsinki());

    ex.set_max_distance_km(Some(5.0));
    assert_eq!(ex.results().len(), 5);

    ex.set_user_location(Coordinates::new(60.17, 24.94).expect("finite"));
    assert_eq!(ids(ex.results()).len(), 4);
    assert!(!ids(ex.results()).contains(&"1000000-4"));
}

#[test]
fn invalid_distance_limit_is_ignored() {
    let mut ex = explorer(20);
    ex.set_max_distance_km(Some(-1.0));
    assert_eq!(ex.filter().max_distance_km, None);
    ex.set_max_distance_km(Some(f64::NAN));
    assert_eq!(ex.filter().max_distance_km, None);
}

#[test]
fn distance_sort_uses_user_location() {
    let mut ex = explorer(20);
    ex.load_city("HELSINKI", helsinki());
    ex.set_user_location(Coordinates::new(65.0, 25.5).expect("finite"));
    ex.set_sort(SortDescriptor::new(SortColumn::Distance, SortDirection::Asc));

    assert_eq!(ids(ex.results())[0], "1000000-4");
}

#[tokio::test]
async fn locate_success_sets_location() {
    let mut ex = explorer(20);
    ex.load_city("HELSINKI", helsinki());
    ex.set_max_distance_km(Some(5.0));
    let here = Coordinates::new(60.17, 24.94).expect("finite");

    let result = ex.locate(&FixedLocation::at(here)).await;

    assert_eq!(result, Ok(here));
    assert_eq!(ex.filter().user_location, Some(here));
    assert_eq!(ex.results().len(), 4);
}

#[tokio::test]
async fn locate_failure_reverts_to_unfiltered() {
    let mut ex = explorer(20);
    ex.load_city("HELSINKI", helsinki());
    ex.set_user_location(Coordinates::new(60.17, 24.94).expect("finite"));
    ex.set_max_distance_km(Some(5.0));
    assert_eq!(ex.results().len(), 4);

    let result = ex
        .locate(&FixedLocation::failing(LocationError::PermissionDenied))
        .await;

    assert_eq!(result, Err(LocationError::PermissionDenied));
    assert_eq!(ex.filter().user_location, None);
    assert_eq!(ex.results().len(), 5);
}

#[tokio::test]
async fn unsupported_location_is_reported() {
    let mut ex = explorer(20);
    let result = ex.locate(&FixedLocation::unsupported()).await;
    assert_eq!(result, Err(LocationError::Unsupported));
}

#[test]
fn loading_new_city_resets_page_and_selection() {
    let mut ex = explorer(2);
    ex.load_city("HELSINKI", helsinki());
    ex.set_page(2);

    let hit = MapHit::Feature(ex.map().source().features()[0].clone());
    ex.on_map_click(vec![hit]);
    assert!(matches!(ex.map().view(), SelectionView::Detail(_)));

    ex.load_city(
        "ESPOO",
        items(&[company("2000000-1", "Espoo Oy", "C", (60.205, 24.655))]),
    );

    assert_eq!(ex.city(), Some("ESPOO"));
    assert_eq!(ex.table().current_page, 1);
    assert_eq!(ex.map().view(), SelectionView::Hidden);
    assert_eq!(ids(ex.results()), vec!["2000000-1"]);
}

#[test]
fn filtering_out_selected_feature_clears_selection() {
    let mut ex = explorer(20);
    ex.load_city("HELSINKI", helsinki());
    let hit = ex
        .map()
        .source()
        .features()
        .iter()
        .find(|f| f.feature.business_id() == "1000000-4")
        .cloned()
        .expect("oulu feature");
    ex.on_map_click(vec![MapHit::Feature(hit)]);

    ex.set_industries(BTreeSet::from(["G".to_string()]));

    assert_eq!(ex.map().view(), SelectionView::Hidden);
}

#[test]
fn summary_covers_filtered_results() {
    let mut ex = explorer(20);
    ex.load_city("HELSINKI", helsinki());
    ex.set_industries(BTreeSet::from(["G".to_string()]));

    let summary = ex.summary();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.by_industry.len(), 1);
}

#[tokio::test]
async fn only_later_ticket_commits_after_both_delays() {
    let mut ex = Explorer::with_settings(20, Duration::from_millis(5), ClusterOptions::default());
    ex.load_city("HELSINKI", helsinki());

    let delay = ex.search_delay();
    let first = ex.schedule_search("kahvila");
    let second = ex.schedule_search("oulu");
    let (first, second) = tokio::join!(debounced(first, delay), debounced(second, delay));

    assert!(!ex.commit_search(&first));
    assert!(ex.commit_search(&second));
    assert_eq!(ex.filter().search_term, "oulu");
    assert_eq!(ids(ex.results()), vec!["1000000-4"]);
}

fn feature_collection(features: serde_json::Value) -> Vec<SourceItem> {
    let payload: DirectoryPayload = serde_json::from_value(json!({
        "type": "FeatureCollection",
        "features": features
    }))
    .expect("valid feature collection");
    payload.into_items()
}

#[test]
fn every_address_feature_of_a_business_reaches_the_map() {
    let properties = |address_type: &str| {
        json!({
            "businessId": "1",
            "name": "Kahvila Aalto",
            "addressType": address_type,
            "addresses": {
                "Visiting address": { "latitude": 60.170, "longitude": 24.940 },
                "Postal address": { "latitude": 60.200, "longitude": 24.900 }
            }
        })
    };
    let items = feature_collection(json!([
        {
            "geometry": { "type": "Point", "coordinates": [24.940, 60.170] },
            "properties": properties("Visiting address")
        },
        {
            "geometry": { "type": "Point", "coordinates": [24.900, 60.200] },
            "properties": properties("Postal address")
        }
    ]));

    let mut ex = explorer(20);
    ex.load_city("HELSINKI", items);

    let feature_ids: Vec<&str> = ex
        .map_source()
        .features()
        .iter()
        .map(|t| t.feature.id.as_str())
        .collect();
    assert_eq!(feature_ids, vec!["1-Visiting address", "1-Postal address"]);
    assert_eq!(ids(ex.results()), vec!["1"]);
}

#[test]
fn point_geometry_alone_makes_a_record_mappable() {
    let items = feature_collection(json!([{
        "geometry": { "type": "Point", "coordinates": [24.94, 60.17] },
        "properties": { "businessId": "9", "name": "Geo Only" }
    }]));

    let mut ex = explorer(20);
    ex.load_city("HELSINKI", items);

    assert_eq!(ids(ex.results()), vec!["9"]);
    assert_eq!(ex.map_source().features().len(), 1);

    ex.set_user_location(Coordinates::new(60.17, 24.94).expect("finite"));
    ex.set_max_distance_km(Some(1.0));
    assert_eq!(ids(ex.results()), vec!["9"]);

    ex.set_user_location(Coordinates::new(65.0, 25.5).expect("finite"));
    assert!(ex.results().is_empty());
    assert!(ex.map_source().features().is_empty());
}

#[test]
fn reloaded_record_drops_its_superseded_address() {
    let mut both = company("1000000-1", "Kahvila Aalto", "I", (60.170, 24.940));
    both.addresses.postal = both.addresses.visiting.clone();
    if let Some(postal) = both.addresses.postal.as_mut() {
        postal.latitude = Some(60.2);
    }
    let visiting_only = company("1000000-1", "Kahvila Aalto", "I", (60.170, 24.940));

    let mut ex = explorer(20);
    ex.load_city("HELSINKI", items(&[both, visiting_only]));

    let feature_ids: Vec<&str> = ex
        .map_source()
        .features()
        .iter()
        .map(|t| t.feature.id.as_str())
        .collect();
    assert_eq!(feature_ids, vec!["1000000-1-Visiting address"]);
}
