//! Single-key stable sorting of filtered records.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use bizmap_core::{distance_km, CompanyRecord, Coordinates};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    #[default]
    Name,
    BusinessId,
    Industry,
    RegistrationDate,
    City,
    /// Distance from the user location; every value is missing without one.
    Distance,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDescriptor {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortDescriptor {
    #[must_use]
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }
}

/// Extracted sort key for one record. `None` fields always sort last.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Text(Option<String>),
    Date(Option<NaiveDate>),
    Number(Option<f64>),
}

impl SortKey {
    fn extract(record: &CompanyRecord, column: SortColumn, origin: Option<Coordinates>) -> Self {
        let lower = |s: &str| Some(s.to_lowercase());
        match column {
            SortColumn::Name => SortKey::Text(lower(&record.name)),
            SortColumn::BusinessId => SortKey::Text(lower(&record.business_id)),
            SortColumn::Industry => SortKey::Text(
                record
                    .industry_description
                    .as_deref()
                    .or(record.industry_code.as_deref())
                    .and_then(lower),
            ),
            SortColumn::RegistrationDate => SortKey::Date(record.registration_date),
            SortColumn::City => SortKey::Text(
                record
                    .addresses
                    .iter()
                    .find_map(|(_, a)| a.city.as_deref())
                    .and_then(lower),
            ),
            SortColumn::Distance => SortKey::Number(
                origin.and_then(|o| record.addresses.best_coordinates().map(|c| distance_km(o, c))),
            ),
        }
    }

    fn compare(&self, other: &Self, direction: SortDirection) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => nulls_last(a.as_ref(), b.as_ref(), direction, Ord::cmp),
            (SortKey::Date(a), SortKey::Date(b)) => nulls_last(a.as_ref(), b.as_ref(), direction, Ord::cmp),
            (SortKey::Number(a), SortKey::Number(b)) => {
                nulls_last(a.as_ref(), b.as_ref(), direction, f64::total_cmp)
            }
            // Keys of one sort run always come from the same column.
            _ => Ordering::Equal,
        }
    }
}

fn nulls_last<T>(
    a: Option<&T>,
    b: Option<&T>,
    direction: SortDirection,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match direction {
            SortDirection::Asc => cmp(a, b),
            SortDirection::Desc => cmp(b, a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort by `descriptor`. Ties keep their incoming relative order.
///
/// `origin` feeds the [`SortColumn::Distance`] column.
#[must_use]
pub fn sort_records(
    records: Vec<CompanyRecord>,
    descriptor: SortDescriptor,
    origin: Option<Coordinates>,
) -> Vec<CompanyRecord> {
    let mut keyed: Vec<(SortKey, CompanyRecord)> = records
        .into_iter()
        .map(|r| (SortKey::extract(&r, descriptor.column, origin), r))
        .collect();

    // `sort_by` is stable.
    keyed.sort_by(|(a, _), (b, _)| a.compare(b, descriptor.direction));
    keyed.into_iter().map(|(_, r)| r).collect()
}
