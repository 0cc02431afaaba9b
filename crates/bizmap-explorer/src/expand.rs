//! Per-address feature expansion.
//!
//! A record turns into one [`MapFeature`] per address slot that carries both
//! coordinates, visiting address first. Features that arrived with geometry
//! pass through untouched.

use std::collections::{HashMap, HashSet};

use bizmap_core::{AddressType, CompanyRecord, MapFeature, SourceItem};

/// Expand source items into map features.
///
/// Output order follows input order, then [`AddressType::ALL`] within a
/// record. Raw records sharing a business id collapse first: only the last
/// one is expanded, at the position of the first. Feature ids are unique:
/// when a later item produces an id already emitted, it replaces the earlier
/// feature in place.
#[must_use]
pub fn expand_to_address_features(items: &[SourceItem]) -> Vec<MapFeature> {
    let mut latest: HashMap<&str, &CompanyRecord> = HashMap::new();
    for item in items {
        if let SourceItem::Record(record) = item {
            latest.insert(record.business_id.as_str(), record);
        }
    }

    let mut features: Vec<MapFeature> = Vec::with_capacity(items.len());
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(items.len());
    let mut expanded: HashSet<&str> = HashSet::with_capacity(latest.len());

    let mut push = |feature: MapFeature| {
        if let Some(&idx) = positions.get(&feature.id) {
            tracing::debug!(id = %feature.id, "duplicate feature id; keeping latest");
            features[idx] = feature;
        } else {
            positions.insert(feature.id.clone(), features.len());
            features.push(feature);
        }
    };

    for item in items {
        match item {
            SourceItem::Feature(feature) => push(feature.clone()),
            SourceItem::Record(record) => {
                let business_id = record.business_id.as_str();
                if !expanded.insert(business_id) {
                    continue;
                }
                let record = latest.get(business_id).copied().unwrap_or(record);
                for feature in record_features(record) {
                    push(feature);
                }
            }
        }
    }

    features
}

fn record_features(record: &CompanyRecord) -> impl Iterator<Item = MapFeature> + '_ {
    AddressType::ALL.into_iter().filter_map(move |address_type| {
        let coordinates = record.addresses.get(address_type)?.coordinates()?;
        Some(MapFeature {
            id: MapFeature::synthetic_id(&record.business_id, address_type),
            coordinates,
            address_type: Some(address_type),
            record: record.clone(),
        })
    })
}
