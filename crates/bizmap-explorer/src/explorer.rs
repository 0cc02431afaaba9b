//! The explorer session.
//!
//! One owner for the record snapshot and every user-controlled input. Each
//! setter writes a single field and synchronously recomputes the derived
//! table rows and map source, so callers never observe a half-updated view.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Duration;

use bizmap_core::{CompanyRecord, Coordinates, ExplorerConfig, MapFeature, SourceItem};

use crate::analytics::{summarize, AnalyticsSummary};
use crate::expand::expand_to_address_features;
use crate::filter::{dedupe_by, filter_records, FilterState};
use crate::location::{request_location, GeolocationProvider, LocationError};
use crate::map::{
    ClusterOptions, ClusterZoomRequest, ClusterZoomResult, FlyTo, MapController, MapHit,
    PointSource,
};
use crate::paginate::{clamp_page, paginate, total_pages, Page, PageRequest};
use crate::search::{SearchDebouncer, SearchTicket};
use crate::sort::{sort_records, SortDescriptor};

/// Rows for the table view plus pager numbers.
pub type TablePage = Page<CompanyRecord>;

#[derive(Debug, Clone)]
pub struct Explorer {
    city: Option<String>,
    records: Vec<CompanyRecord>,
    /// Every feature of the snapshot, before filtering.
    features: Vec<MapFeature>,
    filter: FilterState,
    sort: SortDescriptor,
    page: PageRequest,
    search: SearchDebouncer,
    map: MapController,
    location_timeout: Duration,
    /// Filtered and sorted, not yet paginated.
    results: Vec<CompanyRecord>,
}

impl Explorer {
    #[must_use]
    pub fn new(config: &ExplorerConfig) -> Self {
        let mut explorer = Self::with_settings(
            config.page_size,
            Duration::from_millis(config.search_debounce_ms),
            ClusterOptions::from_config(config),
        );
        explorer.location_timeout = Duration::from_secs(config.location_timeout_secs);
        explorer
    }

    #[must_use]
    pub fn with_settings(page_size: usize, search_delay: Duration, cluster: ClusterOptions) -> Self {
        Self {
            city: None,
            records: Vec::new(),
            features: Vec::new(),
            filter: FilterState::default(),
            sort: SortDescriptor::default(),
            page: PageRequest::first(page_size),
            search: SearchDebouncer::new(search_delay),
            map: MapController::new(cluster),
            location_timeout: Duration::from_secs(10),
            results: Vec::new(),
        }
    }

    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    #[must_use]
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    #[must_use]
    pub fn sort(&self) -> SortDescriptor {
        self.sort
    }

    /// Filtered and sorted records across all pages.
    #[must_use]
    pub fn results(&self) -> &[CompanyRecord] {
        &self.results
    }

    #[must_use]
    pub fn map(&self) -> &MapController {
        &self.map
    }

    /// Replace the snapshot with a new city's records.
    ///
    /// The table gets one record per business id (last one wins, first
    /// position kept). The point geometry of every pre-expanded feature
    /// counts as a location of its record. The map gets every feature,
    /// including all pre-expanded features of the same business. Paging
    /// goes back to the first page and any map selection is dropped.
    /// Filters are kept.
    pub fn load_city(&mut self, city: impl Into<String>, items: Vec<SourceItem>) {
        let city = city.into();

        let mut records: Vec<CompanyRecord> =
            dedupe_by(&items, |i| i.record().business_id.as_str())
                .into_iter()
                .map(|i| i.record().clone())
                .collect();
        let positions: HashMap<String, usize> = records
            .iter()
            .enumerate()
            .map(|(idx, r)| (r.business_id.clone(), idx))
            .collect();
        for item in &items {
            if let SourceItem::Feature(feature) = item {
                if let Some(&idx) = positions.get(feature.business_id()) {
                    records[idx].adopt_location(feature.address_type, feature.coordinates);
                }
            }
        }

        self.records = records;
        self.features = expand_to_address_features(&items);
        self.page.page = 1;
        self.map.reset();

        tracing::info!(
            city = %city,
            records = self.records.len(),
            features = self.features.len(),
            "loaded city snapshot"
        );
        self.city = Some(city);
        self.recompute();
    }

    // ---------------------------------------------------------------------
    // Filters
    // ---------------------------------------------------------------------

    /// Register a keystroke. Wait out [`Explorer::search_delay`] with
    /// [`debounced`](crate::search::debounced), then hand the ticket to
    /// [`Explorer::commit_search`]; only the most recent one takes effect.
    pub fn schedule_search(&mut self, term: impl Into<String>) -> SearchTicket {
        self.search.schedule(term)
    }

    #[must_use]
    pub fn search_delay(&self) -> Duration {
        self.search.delay()
    }

    /// Apply a debounced search term. Returns `false` for superseded tickets.
    pub fn commit_search(&mut self, ticket: &SearchTicket) -> bool {
        if !self.search.is_current(ticket) {
            tracing::debug!(generation = ticket.generation(), "dropping superseded search");
            return false;
        }
        if self.filter.search_term != ticket.term() {
            self.filter.search_term = ticket.term().to_string();
            self.recompute();
        }
        true
    }

    pub fn set_industries(&mut self, industries: BTreeSet<String>) {
        self.filter.industries = industries;
        self.recompute();
    }

    pub fn set_user_location(&mut self, location: Coordinates) {
        self.filter.user_location = Some(location);
        self.recompute();
    }

    pub fn clear_user_location(&mut self) {
        self.filter.user_location = None;
        self.recompute();
    }

    /// Set the distance limit. Negative or non-finite limits clear it.
    pub fn set_max_distance_km(&mut self, max_km: Option<f64>) {
        self.filter.max_distance_km = max_km.filter(|km| km.is_finite() && *km >= 0.0);
        self.recompute();
    }

    /// Record the outcome of a location request.
    ///
    /// On failure the user location is cleared so no distance filter stays
    /// active, and the error is handed back for a non-fatal banner.
    ///
    /// # Errors
    ///
    /// Returns the acquisition error unchanged.
    pub fn apply_location_result(
        &mut self,
        result: Result<Coordinates, LocationError>,
    ) -> Result<Coordinates, LocationError> {
        match result {
            Ok(location) => {
                self.set_user_location(location);
                Ok(location)
            }
            Err(error) => {
                tracing::warn!(error = %error, "location unavailable; distance filter disabled");
                self.clear_user_location();
                Err(error)
            }
        }
    }

    /// Ask `provider` for the user's position and apply the outcome.
    ///
    /// # Errors
    ///
    /// Returns the acquisition error, after clearing the user location.
    pub async fn locate<P>(&mut self, provider: &P) -> Result<Coordinates, LocationError>
    where
        P: GeolocationProvider + Sync,
    {
        let result = request_location(provider, self.location_timeout).await;
        self.apply_location_result(result)
    }

    // ---------------------------------------------------------------------
    // Table
    // ---------------------------------------------------------------------

    pub fn set_sort(&mut self, sort: SortDescriptor) {
        self.sort = sort;
        self.recompute();
    }

    /// Move to `page`, clamped into range. Returns the page actually shown.
    pub fn set_page(&mut self, page: usize) -> usize {
        let total = total_pages(self.results.len(), self.page.page_size);
        self.page.page = clamp_page(page, total);
        self.page.page
    }

    #[must_use]
    pub fn table(&self) -> TablePage {
        paginate(&self.results, self.page)
    }

    #[must_use]
    pub fn summary(&self) -> AnalyticsSummary {
        summarize(&self.results)
    }

    // ---------------------------------------------------------------------
    // Map
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn map_source(&self) -> &PointSource {
        self.map.source()
    }

    pub fn on_map_click(&mut self, hits: Vec<MapHit>) -> Option<ClusterZoomRequest> {
        self.map.on_map_click(hits)
    }

    pub fn choose_feature(&mut self, feature_id: &str) -> Option<FlyTo> {
        self.map.choose_feature(feature_id)
    }

    pub fn back_to_list(&mut self) {
        self.map.back_to_list();
    }

    pub fn apply_cluster_zoom(&mut self, result: ClusterZoomResult) -> Option<FlyTo> {
        self.map.apply_cluster_zoom(result)
    }

    fn recompute(&mut self) {
        let filtered = filter_records(&self.records, &self.filter);
        self.results = sort_records(filtered, self.sort, self.filter.user_location);

        let total = total_pages(self.results.len(), self.page.page_size);
        self.page.page = clamp_page(self.page.page, total);

        // The map shows every match, not just the current page.
        let matching: HashSet<&str> = self.results.iter().map(|r| r.business_id.as_str()).collect();
        let features: Vec<MapFeature> = self
            .features
            .iter()
            .filter(|f| matching.contains(f.business_id()))
            .cloned()
            .collect();
        self.map.replace_features(features);
    }
}

#[cfg(test)]
#[path = "explorer_test.rs"]
mod tests;
