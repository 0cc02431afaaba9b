//! Click-driven selection state machine.
//!
//! ```text
//! Idle ──feature click──▶ ListOrDetail { selected, active: None }
//!  ▲  ◀─cluster click (issues zoom lookup)
//!  │                         │ choose ─▶ active = Some(f)
//!  │                         │ back   ─▶ active = None
//!  └────background click─────┘
//! ```

use serde::Serialize;

use bizmap_core::{Coordinates, MapFeature};

use super::cluster::{ClusterId, ClusterZoomResult};
use super::overlap::TaggedFeature;
use super::source::{ClusterOptions, PointSource};

/// One thing under the pointer, as reported by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapHit {
    Cluster {
        id: ClusterId,
        center: Coordinates,
        point_count: usize,
    },
    Feature(TaggedFeature),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SelectionState {
    #[default]
    Idle,
    ListOrDetail {
        selected: Vec<MapFeature>,
        active: Option<MapFeature>,
    },
}

/// What the side panel should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionView<'a> {
    Hidden,
    List(&'a [MapFeature]),
    Detail(&'a MapFeature),
}

/// Camera move requested from the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlyTo {
    pub center: Coordinates,
    pub zoom: Option<u8>,
}

/// A pending expansion-zoom lookup, keyed by the click that caused it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterZoomRequest {
    pub click_id: u64,
    pub cluster: ClusterId,
    pub center: Coordinates,
}

#[derive(Debug, Clone)]
pub struct MapController {
    source: PointSource,
    selection: SelectionState,
    /// Bumped on every click and every source rebuild; zoom lookups issued
    /// under an older value are discarded.
    click_seq: u64,
}

impl MapController {
    #[must_use]
    pub fn new(options: ClusterOptions) -> Self {
        Self {
            source: PointSource::new(options),
            selection: SelectionState::Idle,
            click_seq: 0,
        }
    }

    #[must_use]
    pub fn source(&self) -> &PointSource {
        &self.source
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    #[must_use]
    pub fn view(&self) -> SelectionView<'_> {
        match &self.selection {
            SelectionState::Idle => SelectionView::Hidden,
            SelectionState::ListOrDetail {
                active: Some(feature),
                ..
            } => SelectionView::Detail(feature),
            SelectionState::ListOrDetail { selected, .. } => match selected.as_slice() {
                [] => SelectionView::Hidden,
                [only] => SelectionView::Detail(only),
                many => SelectionView::List(many),
            },
        }
    }

    /// Install a new feature set. The selection survives only if every
    /// selected feature is still present. Returns `true` on rebuild.
    pub fn replace_features(&mut self, features: Vec<MapFeature>) -> bool {
        if !self.source.replace(features) {
            return false;
        }
        self.click_seq += 1;

        if let SelectionState::ListOrDetail { selected, .. } = &self.selection {
            if !selected.iter().all(|f| self.source.contains(&f.id)) {
                tracing::debug!("selection no longer in source; clearing");
                self.selection = SelectionState::Idle;
            }
        }
        true
    }

    /// Drop any selection and invalidate in-flight zoom lookups.
    pub fn reset(&mut self) {
        self.click_seq += 1;
        self.selection = SelectionState::Idle;
    }

    /// React to a pointer click. The topmost hit decides: a cluster clears
    /// the selection and yields a zoom lookup to run; features open the
    /// list/detail panel; nothing returns to idle.
    pub fn on_map_click(&mut self, hits: Vec<MapHit>) -> Option<ClusterZoomRequest> {
        self.click_seq += 1;

        match hits.first() {
            None => {
                self.selection = SelectionState::Idle;
                None
            }
            Some(MapHit::Cluster { id, center, .. }) => {
                self.selection = SelectionState::Idle;
                tracing::debug!(click_id = self.click_seq, cluster = ?id, "cluster clicked");
                Some(ClusterZoomRequest {
                    click_id: self.click_seq,
                    cluster: *id,
                    center: *center,
                })
            }
            Some(MapHit::Feature(_)) => {
                let mut selected: Vec<MapFeature> = Vec::new();
                for hit in hits {
                    if let MapHit::Feature(tagged) = hit {
                        if !selected.iter().any(|f| f.id == tagged.feature.id) {
                            selected.push(tagged.feature);
                        }
                    }
                }
                tracing::debug!(click_id = self.click_seq, count = selected.len(), "features clicked");
                self.selection = SelectionState::ListOrDetail {
                    selected,
                    active: None,
                };
                None
            }
        }
    }

    /// Open the detail view for one of the listed features.
    ///
    /// Returns a camera move to it, or `None` when `feature_id` is not in
    /// the current selection.
    pub fn choose_feature(&mut self, feature_id: &str) -> Option<FlyTo> {
        let SelectionState::ListOrDetail { selected, active } = &mut self.selection else {
            return None;
        };
        let feature = selected.iter().find(|f| f.id == feature_id)?.clone();
        let center = feature.coordinates;
        *active = Some(feature);
        Some(FlyTo { center, zoom: None })
    }

    /// Leave the detail view, keeping the list.
    pub fn back_to_list(&mut self) {
        if let SelectionState::ListOrDetail { active, .. } = &mut self.selection {
            *active = None;
        }
    }

    /// Turn a finished zoom lookup into a camera move, unless it is stale,
    /// failed, or produced no zoom.
    pub fn apply_cluster_zoom(&mut self, result: ClusterZoomResult) -> Option<FlyTo> {
        let request = result.request;
        if request.click_id != self.click_seq {
            tracing::debug!(
                click_id = request.click_id,
                latest = self.click_seq,
                "discarding stale cluster zoom"
            );
            return None;
        }

        match result.zoom {
            Ok(Some(zoom)) => Some(FlyTo {
                center: request.center,
                zoom: Some(zoom),
            }),
            Ok(None) => None,
            Err(error) => {
                tracing::warn!(error = %error, cluster = ?request.cluster, "cluster zoom lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "selection_test.rs"]
mod tests;
