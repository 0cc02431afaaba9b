//! Record builders shared by unit tests.

use bizmap_core::{Address, Addresses, CompanyRecord, Coordinates, MapFeature, SourceItem};

pub(crate) fn address_at(latitude: f64, longitude: f64) -> Address {
    Address {
        street: Some("Mannerheimintie".to_string()),
        building_number: Some("1".to_string()),
        post_code: Some("00100".to_string()),
        city: Some("HELSINKI".to_string()),
        latitude: Some(latitude),
        longitude: Some(longitude),
        ..Address::default()
    }
}

/// A record with a single valid visiting address.
pub(crate) fn company(business_id: &str, name: &str, industry: &str, at: (f64, f64)) -> CompanyRecord {
    CompanyRecord {
        business_id: business_id.to_string(),
        name: name.to_string(),
        industry_code: Some(industry.to_string()),
        industry_description: None,
        is_active: true,
        registration_date: None,
        website: None,
        addresses: Addresses {
            visiting: Some(address_at(at.0, at.1)),
            postal: None,
        },
    }
}

pub(crate) fn feature(business_id: &str, at: (f64, f64)) -> MapFeature {
    let record = company(business_id, &format!("Company {business_id}"), "G", at);
    MapFeature {
        id: format!("{business_id}-Visiting address"),
        coordinates: Coordinates::new(at.0, at.1).expect("finite test coordinates"),
        address_type: Some(bizmap_core::AddressType::Visiting),
        record,
    }
}

pub(crate) fn items(records: &[CompanyRecord]) -> Vec<SourceItem> {
    records.iter().cloned().map(SourceItem::Record).collect()
}
