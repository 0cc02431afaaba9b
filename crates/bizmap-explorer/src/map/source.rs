//! The clustered point source handed to the map renderer.

use serde_json::{json, Value};

use bizmap_core::MapFeature;

use super::overlap::{tag_overlapping, TaggedFeature};

/// Fixed id the renderer registers the company source under.
pub const COMPANY_SOURCE_ID: &str = "companies";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterOptions {
    /// Zoom above which nothing clusters.
    pub max_zoom: u8,
    /// Cluster radius in screen pixels at 512-pixel tiles.
    pub radius_px: f64,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            max_zoom: 14,
            radius_px: 50.0,
        }
    }
}

impl ClusterOptions {
    #[must_use]
    pub fn from_config(config: &bizmap_core::ExplorerConfig) -> Self {
        Self {
            max_zoom: config.cluster_max_zoom,
            radius_px: config.cluster_radius_px,
        }
    }
}

/// Tagged features plus their Web Mercator projection.
///
/// Replaced wholesale whenever the upstream feature set changes; `revision`
/// counts replacements so the renderer can tell when to reload.
#[derive(Debug, Clone)]
pub struct PointSource {
    pub(super) features: Vec<TaggedFeature>,
    /// `(x, y)` in `[0, 1]` world units, parallel to `features`.
    pub(super) projected: Vec<(f64, f64)>,
    pub(super) options: ClusterOptions,
    revision: u64,
}

impl PointSource {
    #[must_use]
    pub fn new(options: ClusterOptions) -> Self {
        Self {
            features: Vec::new(),
            projected: Vec::new(),
            options,
            revision: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> &'static str {
        COMPANY_SOURCE_ID
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn options(&self) -> ClusterOptions {
        self.options
    }

    #[must_use]
    pub fn features(&self) -> &[TaggedFeature] {
        &self.features
    }

    #[must_use]
    pub fn contains(&self, feature_id: &str) -> bool {
        self.features.iter().any(|t| t.feature.id == feature_id)
    }

    /// Tag and install `features`, unless the tagged set equals the current
    /// one. Returns `true` when the source was rebuilt.
    pub fn replace(&mut self, features: Vec<MapFeature>) -> bool {
        let tagged = tag_overlapping(features);
        if tagged == self.features {
            return false;
        }

        self.projected = tagged
            .iter()
            .map(|t| project(t.feature.coordinates))
            .collect();
        self.features = tagged;
        self.revision += 1;

        tracing::debug!(
            source_id = COMPANY_SOURCE_ID,
            revision = self.revision,
            features = self.features.len(),
            overlapping = self.features.iter().filter(|t| t.is_overlapping).count(),
            "rebuilt point source"
        );
        true
    }

    /// GeoJSON `FeatureCollection` for the renderer. Properties are the
    /// record fields plus `id`, `addressType` and `isOverlapping`.
    #[must_use]
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .features
            .iter()
            .map(|t| {
                let mut properties = serde_json::to_value(&t.feature.record)
                    .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
                if let Value::Object(map) = &mut properties {
                    map.insert("id".to_string(), json!(t.feature.id));
                    map.insert("addressType".to_string(), json!(t.feature.address_type));
                    map.insert("isOverlapping".to_string(), json!(t.is_overlapping));
                }
                json!({
                    "type": "Feature",
                    "id": t.feature.id,
                    "geometry": {
                        "type": "Point",
                        "coordinates": [t.feature.coordinates.longitude, t.feature.coordinates.latitude],
                    },
                    "properties": properties,
                })
            })
            .collect();

        json!({ "type": "FeatureCollection", "features": features })
    }
}

/// Web Mercator projection to `[0, 1]` world units.
pub(super) fn project(c: bizmap_core::Coordinates) -> (f64, f64) {
    let x = c.longitude / 360.0 + 0.5;
    let sin = c.latitude.to_radians().sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / std::f64::consts::PI;
    (x.clamp(0.0, 1.0), y.clamp(0.0, 1.0))
}
