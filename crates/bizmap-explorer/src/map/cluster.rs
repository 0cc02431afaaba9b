//! Grid clustering over the point source and the async expansion-zoom lookup.
//!
//! Features are bucketed into square cells of `radius_px / (512 * 2^zoom)`
//! world units. A cell holding more than one feature renders as a cluster;
//! a cluster's expansion zoom is the first zoom at which its members land in
//! more than one cell.

use std::collections::BTreeMap;
use std::future::Future;

use serde::Serialize;

use bizmap_core::Coordinates;

use super::selection::{ClusterZoomRequest, MapHit};
use super::source::PointSource;

const TILE_EXTENT_PX: f64 = 512.0;

/// A cluster cell at a given zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ClusterId {
    pub zoom: u8,
    pub cell_x: u64,
    pub cell_y: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClusterLookupError {
    #[error("cluster {0:?} is not part of the current source")]
    UnknownCluster(ClusterId),
    #[error("point source is unavailable: {0}")]
    SourceUnavailable(String),
}

/// Anything that can answer "which zoom expands this cluster".
pub trait ClusterSource {
    /// `Ok(None)` when the source has no zoom to offer for the cluster.
    fn expansion_zoom(
        &self,
        cluster: ClusterId,
    ) -> impl Future<Output = Result<Option<u8>, ClusterLookupError>> + Send;
}

/// Outcome of one expansion-zoom lookup, still tagged with its click.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterZoomResult {
    pub request: ClusterZoomRequest,
    pub zoom: Result<Option<u8>, ClusterLookupError>,
}

/// Look up the expansion zoom for a clicked cluster.
///
/// The result must go back through
/// [`MapController::apply_cluster_zoom`](super::MapController::apply_cluster_zoom),
/// which drops it if another click happened in the meantime.
pub async fn resolve_cluster_zoom<S>(source: &S, request: ClusterZoomRequest) -> ClusterZoomResult
where
    S: ClusterSource + Sync,
{
    let zoom = source.expansion_zoom(request.cluster).await;
    ClusterZoomResult { request, zoom }
}

impl PointSource {
    fn cell_size(&self, zoom: u8) -> f64 {
        self.options.radius_px / (TILE_EXTENT_PX * 2f64.powi(i32::from(zoom)))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn cell_of(&self, point: (f64, f64), zoom: u8) -> (u64, u64) {
        // Projected points are clamped to [0, 1], so both quotients are
        // finite and non-negative.
        let size = self.cell_size(zoom);
        ((point.0 / size).floor() as u64, (point.1 / size).floor() as u64)
    }

    fn members(&self, cluster: ClusterId) -> Vec<usize> {
        self.projected
            .iter()
            .enumerate()
            .filter(|(_, &p)| self.cell_of(p, cluster.zoom) == (cluster.cell_x, cluster.cell_y))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Renderable points at `zoom`: clusters for crowded cells, single
    /// features otherwise. Above `max_zoom` every feature stands alone.
    ///
    /// Order is deterministic: cells by row then column, features in source
    /// order within a cell.
    #[must_use]
    pub fn clusters(&self, zoom: u8) -> Vec<MapHit> {
        if zoom > self.options.max_zoom {
            return self.features.iter().cloned().map(MapHit::Feature).collect();
        }

        let mut cells: BTreeMap<(u64, u64), Vec<usize>> = BTreeMap::new();
        for (idx, &point) in self.projected.iter().enumerate() {
            let (cx, cy) = self.cell_of(point, zoom);
            cells.entry((cy, cx)).or_default().push(idx);
        }

        cells
            .into_iter()
            .flat_map(|((cell_y, cell_x), members)| {
                if members.len() == 1 {
                    vec![MapHit::Feature(self.features[members[0]].clone())]
                } else {
                    vec![MapHit::Cluster {
                        id: ClusterId {
                            zoom,
                            cell_x,
                            cell_y,
                        },
                        center: self.centroid(&members),
                        point_count: members.len(),
                    }]
                }
            })
            .collect()
    }

    /// Smallest zoom at which `cluster` splits, capped at `max_zoom + 1`.
    ///
    /// `None` when the id does not name a cluster of the current source.
    #[must_use]
    pub fn cluster_expansion_zoom(&self, cluster: ClusterId) -> Option<u8> {
        if cluster.zoom > self.options.max_zoom {
            return None;
        }
        let members = self.members(cluster);
        if members.len() < 2 {
            return None;
        }

        let cap = self.options.max_zoom.saturating_add(1);
        let split = (cluster.zoom.saturating_add(1)..=self.options.max_zoom).find(|&zoom| {
            let first = self.cell_of(self.projected[members[0]], zoom);
            members
                .iter()
                .any(|&idx| self.cell_of(self.projected[idx], zoom) != first)
        });
        Some(split.unwrap_or(cap))
    }

    /// Member features of a cluster, in source order.
    #[must_use]
    pub fn cluster_leaves(&self, cluster: ClusterId) -> Vec<&super::TaggedFeature> {
        self.members(cluster)
            .into_iter()
            .map(|idx| &self.features[idx])
            .collect()
    }

    #[allow(clippy::cast_precision_loss)]
    fn centroid(&self, members: &[usize]) -> Coordinates {
        // Cluster sizes stay far below f64's exact integer range.
        let n = members.len() as f64;
        let (lat, lng) = members.iter().fold((0.0, 0.0), |(lat, lng), &idx| {
            let c = self.features[idx].feature.coordinates;
            (lat + c.latitude, lng + c.longitude)
        });
        Coordinates {
            latitude: lat / n,
            longitude: lng / n,
        }
    }
}

impl ClusterSource for PointSource {
    async fn expansion_zoom(&self, cluster: ClusterId) -> Result<Option<u8>, ClusterLookupError> {
        if cluster.zoom <= self.options.max_zoom && self.members(cluster).len() < 2 {
            return Err(ClusterLookupError::UnknownCluster(cluster));
        }
        Ok(self.cluster_expansion_zoom(cluster))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{ClusterOptions, TaggedFeature};
    use crate::test_support::feature;

    fn source_with(points: &[(&str, (f64, f64))]) -> PointSource {
        let mut source = PointSource::new(ClusterOptions {
            max_zoom: 14,
            radius_px: 50.0,
        });
        source.replace(points.iter().map(|(id, at)| feature(id, *at)).collect());
        source
    }

    fn cluster_ids(hits: &[MapHit]) -> Vec<(ClusterId, usize)> {
        hits.iter()
            .filter_map(|h| match h {
                MapHit::Cluster { id, point_count, .. } => Some((*id, *point_count)),
                MapHit::Feature(_) => None,
            })
            .collect()
    }

    #[test]
    fn nearby_points_cluster_at_low_zoom_and_separate_when_zoomed_in() {
        let source = source_with(&[
            ("A", (60.170, 24.940)),
            ("B", (60.171, 24.941)),
            ("C", (65.0, 25.5)),
        ]);

        let low = source.clusters(5);
        let clusters = cluster_ids(&low);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].1, 2);
        assert_eq!(low.len(), 2, "one cluster plus the lone feature");

        let high = source.clusters(15);
        assert_eq!(high.len(), 3);
        assert!(high.iter().all(|h| matches!(h, MapHit::Feature(_))));
    }

    #[test]
    fn expansion_zoom_is_the_first_splitting_zoom() {
        let source = source_with(&[("A", (60.170, 24.940)), ("B", (60.171, 24.941))]);
        let (cluster, _) = cluster_ids(&source.clusters(5))[0];

        let zoom = source.cluster_expansion_zoom(cluster).expect("known cluster");
        assert!(zoom > 5 && zoom <= 15, "got {zoom}");

        let at_zoom = source.clusters(zoom);
        assert_eq!(at_zoom.len(), 2, "members must be split at {zoom}");
        if zoom > 6 {
            let before = source.clusters(zoom - 1);
            assert_eq!(cluster_ids(&before).len(), 1, "still clustered at {}", zoom - 1);
        }
    }

    #[test]
    fn coincident_points_expand_past_max_zoom() {
        let source = source_with(&[("A", (60.17, 24.94)), ("B", (60.17, 24.94))]);
        let (cluster, _) = cluster_ids(&source.clusters(10))[0];
        assert_eq!(source.cluster_expansion_zoom(cluster), Some(15));
        let leaves: Vec<&TaggedFeature> = source.cluster_leaves(cluster);
        assert_eq!(leaves.len(), 2);
        assert!(leaves.iter().all(|t| t.is_overlapping));
    }

    #[test]
    fn unknown_cluster_has_no_expansion_zoom() {
        let source = source_with(&[("A", (60.17, 24.94))]);
        let bogus = ClusterId {
            zoom: 3,
            cell_x: 0,
            cell_y: 0,
        };
        assert_eq!(source.cluster_expansion_zoom(bogus), None);
    }

    #[tokio::test]
    async fn resolve_reports_unknown_cluster_as_error() {
        let source = source_with(&[("A", (60.17, 24.94))]);
        let request = ClusterZoomRequest {
            click_id: 1,
            cluster: ClusterId {
                zoom: 3,
                cell_x: 0,
                cell_y: 0,
            },
            center: Coordinates::new(60.17, 24.94).unwrap(),
        };
        let result = resolve_cluster_zoom(&source, request).await;
        assert!(matches!(result.zoom, Err(ClusterLookupError::UnknownCluster(_))));
    }
}
