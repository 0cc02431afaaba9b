use std::collections::HashMap;

use serde::Serialize;

use bizmap_core::{Coordinates, MapFeature};

/// A feature plus whether another feature sits at the same spot.
///
/// The renderer picks a multi-marker icon for overlapping features.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedFeature {
    #[serde(flatten)]
    pub feature: MapFeature,
    pub is_overlapping: bool,
}

/// Coordinates rounded to 6 decimals (~0.1 m), longitude first.
pub(crate) fn coordinate_key(c: Coordinates) -> String {
    format!("{:.6},{:.6}", round_micro(c.longitude), round_micro(c.latitude))
}

/// Round to 6 decimals with negative zero folded into zero, so values on
/// either side of 0 that round to it share a key.
fn round_micro(value: f64) -> f64 {
    // Adding +0.0 turns -0.0 into +0.0 and leaves every other value alone.
    (value * 1e6).round() / 1e6 + 0.0
}

/// Tag each feature that shares its rounded coordinates with another one.
#[must_use]
pub fn tag_overlapping(features: Vec<MapFeature>) -> Vec<TaggedFeature> {
    let mut counts: HashMap<String, usize> = HashMap::with_capacity(features.len());
    for feature in &features {
        *counts.entry(coordinate_key(feature.coordinates)).or_default() += 1;
    }

    features
        .into_iter()
        .map(|feature| {
            let is_overlapping = counts
                .get(&coordinate_key(feature.coordinates))
                .is_some_and(|&n| n > 1);
            TaggedFeature {
                feature,
                is_overlapping,
            }
        })
        .collect()
}
