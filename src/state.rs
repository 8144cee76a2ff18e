//! Session State Store
//!
//! Single authoritative in-memory mirror of the clustering session: data
//! points, centroids, labels, the manual seed buffer, and the session
//! phase. Every other component reads it; only the controllers mutate it,
//! and only from the resolution of a backend exchange or a synchronous
//! local action.
//!
//! The store performs no I/O. It is the one place the session invariants
//! are enforced:
//!
//! - labels are non-empty only when the session is initialized;
//! - labels, when present, align one-to-one with the data points.
//!
//! Every mutation must be followed by a redraw; that sequencing is the
//! caller's responsibility, not the store's.

use crate::error::{ClusterViewError, Result};
use crate::protocol::Point;

/// Lifecycle phase of the clustering session.
///
/// `Uninitialized` means no initialize call has succeeded since the last
/// reset or invalidation. `Converged` means the server signaled that a
/// further iteration would produce no change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No acknowledged backend session exists.
    #[default]
    Uninitialized,
    /// Centroids exist; labels may still be empty.
    Initialized,
    /// The server signaled no further change.
    Converged,
}

/// In-memory mirror of the session state.
#[derive(Debug, Default)]
pub struct SessionStateStore {
    data_points: Vec<Point>,
    centroids: Vec<Point>,
    labels: Vec<usize>,
    manual_seeds: Vec<Point>,
    phase: SessionPhase,
}

impl SessionStateStore {
    /// Empty store in the uninitialized phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the data point sequence wholesale.
    ///
    /// Does not touch cluster state; callers invalidate it separately so
    /// the two mutations stay explicit.
    pub fn set_data_points(&mut self, points: Vec<Point>) {
        self.data_points = points;
    }

    /// Replace the centroid sequence.
    ///
    /// During manual seeding this holds fewer centroids than the configured
    /// cluster count; the full-length invariant only applies once the
    /// session is initialized.
    pub fn set_centroids(&mut self, centroids: Vec<Point>) {
        self.centroids = centroids;
    }

    /// Replace the label sequence.
    ///
    /// Rejected while uninitialized, and rejected when the length does not
    /// match the data point sequence.
    pub fn set_labels(&mut self, labels: Vec<usize>) -> Result<()> {
        if self.phase == SessionPhase::Uninitialized {
            return Err(ClusterViewError::InvalidState(
                "labels cannot be set before the session is initialized".into(),
            ));
        }
        if labels.len() != self.data_points.len() {
            return Err(ClusterViewError::InvalidState(format!(
                "label count {} does not match data point count {}",
                labels.len(),
                self.data_points.len()
            )));
        }
        self.labels = labels;
        Ok(())
    }

    /// Append a user-picked seed centroid.
    pub fn push_manual_seed(&mut self, point: Point) {
        self.manual_seeds.push(point);
    }

    /// Transition the session phase.
    pub fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
    }

    /// Clear centroids, labels, and the manual seed buffer, returning the
    /// phase to uninitialized. Data points are untouched.
    pub fn clear_cluster_state(&mut self) {
        self.centroids.clear();
        self.labels.clear();
        self.manual_seeds.clear();
        self.phase = SessionPhase::Uninitialized;
    }

    /// The current data point sequence.
    pub fn data_points(&self) -> &[Point] {
        &self.data_points
    }

    /// The current centroids, ordered by cluster index.
    pub fn centroids(&self) -> &[Point] {
        &self.centroids
    }

    /// Cluster assignments, positionally aligned with the data points.
    /// Empty until the first step or run completes.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// User-picked seed centroids accumulated so far.
    pub fn manual_seeds(&self) -> &[Point] {
        &self.manual_seeds
    }

    /// Current session phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }
}
