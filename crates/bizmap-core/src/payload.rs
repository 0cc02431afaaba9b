//! Record source payloads.
//!
//! The company endpoint answers with either a flat JSON array of records or
//! a GeoJSON `FeatureCollection` whose feature properties are record-shaped.
//! Both are normalised into an ordered list of [`SourceItem`]s: records
//! without geometry are candidates for per-address expansion, features with
//! a usable `Point` geometry pass through as already expanded.

use serde::Deserialize;

use crate::types::{AddressType, CompanyRecord, Coordinates, MapFeature};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DirectoryPayload {
    Records(Vec<CompanyRecord>),
    FeatureCollection(FeatureCollection),
}

#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<GeoJsonFeature>,
}

#[derive(Debug, Deserialize)]
pub struct GeoJsonFeature {
    /// GeoJSON allows string or numeric ids.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub geometry: Option<serde_json::Value>,
    pub properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureProperties {
    #[serde(default)]
    pub address_type: Option<AddressType>,
    #[serde(flatten)]
    pub record: CompanyRecord,
}

/// One entry of a normalised record payload.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceItem {
    Record(CompanyRecord),
    Feature(MapFeature),
}

impl SourceItem {
    #[must_use]
    pub fn record(&self) -> &CompanyRecord {
        match self {
            SourceItem::Record(record) => record,
            SourceItem::Feature(feature) => &feature.record,
        }
    }
}

impl DirectoryPayload {
    /// Flatten into source items, preserving payload order.
    #[must_use]
    pub fn into_items(self) -> Vec<SourceItem> {
        match self {
            DirectoryPayload::Records(records) => {
                records.into_iter().map(SourceItem::Record).collect()
            }
            DirectoryPayload::FeatureCollection(collection) => collection
                .features
                .into_iter()
                .map(GeoJsonFeature::into_item)
                .collect(),
        }
    }
}

impl GeoJsonFeature {
    fn into_item(self) -> SourceItem {
        let Some(coordinates) = self.geometry.as_ref().and_then(point_coordinates) else {
            return SourceItem::Record(self.properties.record);
        };

        let address_type = self.properties.address_type;
        let record = self.properties.record;
        let id = match (self.id, address_type) {
            (Some(serde_json::Value::String(id)), _) if !id.is_empty() => id,
            (Some(serde_json::Value::Number(id)), _) => id.to_string(),
            (_, Some(address_type)) => MapFeature::synthetic_id(&record.business_id, address_type),
            _ => record.business_id.clone(),
        };

        SourceItem::Feature(MapFeature {
            id,
            coordinates,
            address_type,
            record,
        })
    }
}

/// Extract `[lng, lat]` from a GeoJSON `Point` geometry.
fn point_coordinates(geometry: &serde_json::Value) -> Option<Coordinates> {
    if geometry.get("type")?.as_str()? != "Point" {
        return None;
    }
    let pair = geometry.get("coordinates")?.as_array()?;
    let longitude = pair.first()?.as_f64()?;
    let latitude = pair.get(1)?.as_f64()?;
    Coordinates::new(latitude, longitude)
}
