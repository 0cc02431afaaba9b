//! Client-side engine behind the company directory explorer.
//!
//! Raw records flow one way: expansion into per-address map features, the
//! filter/sort/paginate pipeline shared by the table and the map, and the
//! map's overlap tagging, clustering and click-selection state machine.
//! [`Explorer`] threads all of it through one explicitly owned session.

pub mod analytics;
pub mod expand;
pub mod explorer;
pub mod filter;
pub mod location;
pub mod map;
pub mod paginate;
pub mod search;
pub mod sort;

#[cfg(test)]
mod test_support;

pub use analytics::{summarize, AnalyticsSummary, IndustryCount};
pub use expand::expand_to_address_features;
pub use explorer::{Explorer, TablePage};
pub use filter::{filter_records, FilterState};
pub use location::{request_location, FixedLocation, GeolocationProvider, LocationError};
pub use map::{
    resolve_cluster_zoom, tag_overlapping, ClusterId, ClusterLookupError, ClusterOptions,
    ClusterSource, ClusterZoomRequest, ClusterZoomResult, FlyTo, MapController, MapHit,
    PointSource, SelectionState, SelectionView, TaggedFeature,
};
pub use paginate::{clamp_page, paginate, total_pages, Page, PageRequest};
pub use search::{debounced, SearchDebouncer, SearchTicket};
pub use sort::{sort_records, SortColumn, SortDescriptor, SortDirection};
