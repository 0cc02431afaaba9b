//! Summary figures for the analytics view.

use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use serde::Serialize;

use bizmap_core::CompanyRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndustryCount {
    /// `None` groups records without an industry code.
    pub code: Option<String>,
    pub description: Option<String>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalyticsSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    /// Count descending, then code ascending (uncoded last).
    pub by_industry: Vec<IndustryCount>,
    /// Year ascending; undated records are left out.
    pub by_registration_year: Vec<(i32, usize)>,
}

#[must_use]
pub fn summarize(records: &[CompanyRecord]) -> AnalyticsSummary {
    let active = records.iter().filter(|r| r.is_active).count();

    let mut industries: HashMap<Option<&str>, IndustryCount> = HashMap::new();
    let mut years: BTreeMap<i32, usize> = BTreeMap::new();

    for record in records {
        let entry = industries
            .entry(record.industry_code.as_deref())
            .or_insert_with(|| IndustryCount {
                code: record.industry_code.clone(),
                description: None,
                count: 0,
            });
        entry.count += 1;
        if entry.description.is_none() {
            entry.description.clone_from(&record.industry_description);
        }

        if let Some(date) = record.registration_date {
            *years.entry(date.year()).or_default() += 1;
        }
    }

    let mut by_industry: Vec<IndustryCount> = industries.into_values().collect();
    by_industry.sort_by(|a, b| {
        b.count.cmp(&a.count).then_with(|| match (&a.code, &b.code) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        })
    });

    AnalyticsSummary {
        total: records.len(),
        active,
        inactive: records.len() - active,
        by_industry,
        by_registration_year: years.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::test_support::company;

    #[test]
    fn counts_industries_and_years() {
        let mut a = company("1", "A", "G", (60.0, 24.0));
        a.industry_description = Some("Trade".to_string());
        a.registration_date = NaiveDate::from_ymd_opt(2019, 5, 1);
        let mut b = company("2", "B", "G", (60.0, 24.0));
        b.registration_date = NaiveDate::from_ymd_opt(2019, 9, 1);
        b.is_active = false;
        let mut c = company("3", "C", "C", (60.0, 24.0));
        c.registration_date = NaiveDate::from_ymd_opt(2001, 1, 1);
        let mut d = company("4", "D", "A", (60.0, 24.0));
        d.industry_code = None;

        let summary = summarize(&[a, b, c, d]);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.active, 3);
        assert_eq!(summary.inactive, 1);

        let industries: Vec<_> = summary
            .by_industry
            .iter()
            .map(|i| (i.code.as_deref(), i.count))
            .collect();
        assert_eq!(industries, [(Some("G"), 2), (Some("C"), 1), (None, 1)]);
        assert_eq!(summary.by_industry[0].description.as_deref(), Some("Trade"));

        assert_eq!(summary.by_registration_year, vec![(2001, 1), (2019, 2)]);
    }

    #[test]
    fn empty_input_yields_empty_summary() {
        assert_eq!(summarize(&[]), AnalyticsSummary::default());
    }
}
