//! Domain types for company directory records.
//!
//! ## Wire shape
//!
//! Records arrive as camelCase JSON. Addresses are keyed by their type label
//! (`"Visiting address"` / `"Postal address"`); any other key is ignored.
//! Latitude and longitude are independently nullable on the wire, but only
//! an address carrying both as finite numbers is considered mappable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
///
/// Both fields are always finite. Use [`Coordinates::new`] to build one from
/// untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Returns `None` unless both components are finite.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        (latitude.is_finite() && longitude.is_finite()).then_some(Self {
            latitude,
            longitude,
        })
    }
}

/// The two address slots a company record can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AddressType {
    #[serde(rename = "Visiting address")]
    Visiting,
    #[serde(rename = "Postal address")]
    Postal,
}

impl AddressType {
    /// Fixed iteration order: visiting before postal.
    pub const ALL: [AddressType; 2] = [AddressType::Visiting, AddressType::Postal];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AddressType::Visiting => "Visiting address",
            AddressType::Postal => "Postal address",
        }
    }
}

impl std::fmt::Display for AddressType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub building_number: Option<String>,
    #[serde(default)]
    pub entrance: Option<String>,
    #[serde(default)]
    pub post_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Address {
    /// Usable coordinates, or `None` when either component is missing or
    /// not finite. A half-populated pair is never surfaced.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::new(self.latitude?, self.longitude?)
    }
}

/// Address slots of a record, one per [`AddressType`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Addresses {
    #[serde(
        rename = "Visiting address",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub visiting: Option<Address>,
    #[serde(
        rename = "Postal address",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub postal: Option<Address>,
}

impl Addresses {
    #[must_use]
    pub fn get(&self, address_type: AddressType) -> Option<&Address> {
        match address_type {
            AddressType::Visiting => self.visiting.as_ref(),
            AddressType::Postal => self.postal.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, address_type: AddressType) -> &mut Option<Address> {
        match address_type {
            AddressType::Visiting => &mut self.visiting,
            AddressType::Postal => &mut self.postal,
        }
    }

    /// Present addresses in [`AddressType::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (AddressType, &Address)> {
        AddressType::ALL
            .into_iter()
            .filter_map(|t| self.get(t).map(|a| (t, a)))
    }

    /// First mappable coordinate in [`AddressType::ALL`] order.
    #[must_use]
    pub fn best_coordinates(&self) -> Option<Coordinates> {
        self.iter().find_map(|(_, a)| a.coordinates())
    }
}

/// One business entity as delivered by the record source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    /// Unique business identifier; the dedup key.
    pub business_id: String,
    pub name: String,
    #[serde(default)]
    pub industry_code: Option<String>,
    #[serde(default)]
    pub industry_description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub registration_date: Option<NaiveDate>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub addresses: Addresses,
}

fn default_active() -> bool {
    true
}

impl CompanyRecord {
    /// `true` when at least one address has both coordinates.
    #[must_use]
    pub fn has_mappable_address(&self) -> bool {
        self.addresses.best_coordinates().is_some()
    }

    /// Record a point geometry delivered alongside this record.
    ///
    /// The point fills the slot named by `address_type` unless that slot
    /// already has coordinates. An untagged point only lands in the visiting
    /// slot, and only when the record has no mappable address at all.
    pub fn adopt_location(&mut self, address_type: Option<AddressType>, at: Coordinates) {
        let slot = match address_type {
            Some(address_type) => address_type,
            None if self.has_mappable_address() => return,
            None => AddressType::Visiting,
        };
        let address = self.addresses.slot_mut(slot).get_or_insert_with(Address::default);
        if address.coordinates().is_none() {
            address.latitude = Some(at.latitude);
            address.longitude = Some(at.longitude);
        }
    }
}

/// A map-plottable point derived from a record and one of its addresses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapFeature {
    /// `{business_id}-{address type}` for expanded features; source-provided
    /// for features that arrived with geometry.
    pub id: String,
    pub coordinates: Coordinates,
    /// `None` only for pre-expanded source features that carried no tag.
    pub address_type: Option<AddressType>,
    pub record: CompanyRecord,
}

impl MapFeature {
    #[must_use]
    pub fn synthetic_id(business_id: &str, address_type: AddressType) -> String {
        format!("{business_id}-{address_type}")
    }

    #[must_use]
    pub fn business_id(&self) -> &str {
        &self.record.business_id
    }
}
