//! Record filtering: dedup, address validity, text, industry and distance.
//!
//! Stages run in that fixed order and are conjunctive. Every stage is total:
//! empty input gives empty output, and malformed coordinates only ever
//! exclude a record, never fail the run.

use std::collections::{BTreeSet, HashMap};

use bizmap_core::{distance_km, CompanyRecord, Coordinates};

/// Active filter inputs. All set filters must pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub search_term: String,
    pub industries: BTreeSet<String>,
    pub user_location: Option<Coordinates>,
    pub max_distance_km: Option<f64>,
}

impl FilterState {
    /// Distance filtering only applies when both a location and a limit are set.
    #[must_use]
    pub fn distance_limit(&self) -> Option<(Coordinates, f64)> {
        Some((self.user_location?, self.max_distance_km?))
    }
}

/// Run the filter stages over `records`, returning survivors in order.
#[must_use]
pub fn filter_records(records: &[CompanyRecord], filter: &FilterState) -> Vec<CompanyRecord> {
    let needle = filter.search_term.trim().to_lowercase();
    let distance_limit = filter.distance_limit();

    let filtered: Vec<CompanyRecord> = dedupe_by_business_id(records)
        .into_iter()
        .filter(|r| r.has_mappable_address())
        .filter(|r| matches_text(r, &needle))
        .filter(|r| matches_industry(r, &filter.industries))
        .filter(|r| distance_limit.is_none_or(|(origin, max_km)| within_distance(r, origin, max_km)))
        .cloned()
        .collect();

    tracing::debug!(
        input = records.len(),
        output = filtered.len(),
        search_term = %needle,
        industries = filter.industries.len(),
        distance_active = distance_limit.is_some(),
        "filtered records"
    );
    filtered
}

/// Collapse entries sharing a business id.
///
/// The surviving entry is the last one seen; it takes the position of the
/// first occurrence so output order stays stable as duplicates arrive.
#[must_use]
pub fn dedupe_by_business_id(records: &[CompanyRecord]) -> Vec<&CompanyRecord> {
    dedupe_by(records, |r| r.business_id.as_str())
}

/// [`dedupe_by_business_id`] over any item that carries a business id.
#[must_use]
pub fn dedupe_by<'a, T>(items: &'a [T], business_id: impl Fn(&'a T) -> &'a str) -> Vec<&'a T> {
    let mut out: Vec<&T> = Vec::with_capacity(items.len());
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(items.len());

    for item in items {
        let key = business_id(item);
        match positions.get(key) {
            Some(&idx) => out[idx] = item,
            None => {
                positions.insert(key, out.len());
                out.push(item);
            }
        }
    }
    out
}

/// Case-insensitive substring match over name, business id, industry
/// description, and every address street and city.
///
/// `needle` must already be trimmed and lower-cased; empty matches everything.
#[must_use]
pub fn matches_text(record: &CompanyRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    let contains = |field: &str| field.to_lowercase().contains(needle);

    contains(&record.name)
        || contains(&record.business_id)
        || record.industry_description.as_deref().is_some_and(contains)
        || record.addresses.iter().any(|(_, address)| {
            address.street.as_deref().is_some_and(contains)
                || address.city.as_deref().is_some_and(contains)
        })
}

#[must_use]
pub fn matches_industry(record: &CompanyRecord, industries: &BTreeSet<String>) -> bool {
    industries.is_empty()
        || record
            .industry_code
            .as_ref()
            .is_some_and(|code| industries.contains(code))
}

/// `true` when the record's preferred coordinate lies within `max_km` of
/// `origin`. Records without a usable coordinate never pass.
#[must_use]
pub fn within_distance(record: &CompanyRecord, origin: Coordinates, max_km: f64) -> bool {
    record
        .addresses
        .best_coordinates()
        .is_some_and(|c| distance_km(origin, c) <= max_km)
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
