//! Map-side state: overlap tagging, the clustered point source, and the
//! click-driven selection state machine.

mod cluster;
mod overlap;
mod selection;
mod source;

pub use cluster::{resolve_cluster_zoom, ClusterId, ClusterLookupError, ClusterSource, ClusterZoomResult};
pub use overlap::{tag_overlapping, TaggedFeature};
pub use selection::{ClusterZoomRequest, FlyTo, MapController, MapHit, SelectionState, SelectionView};
pub use source::{ClusterOptions, PointSource, COMPANY_SOURCE_ID};
