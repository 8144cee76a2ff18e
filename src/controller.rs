//! Interaction and Initialization Controllers
//!
//! The session state machine. [`InitializationController`] owns the
//! seeding configuration (method and cluster count) and decides when
//! enough input exists to start a backend session; [`InteractionController`]
//! wires user actions to the full sequence: validate, ensure the session
//! is initialized, perform the backend exchange, mirror the acknowledged
//! result into the store, redraw.
//!
//! Every action takes `&mut self`, so a second action cannot begin while
//! one is pending: the exclusive borrow is the single-slot in-flight
//! guard that serializes overlapping triggers.
//!
//! # Example
//!
//! ```rust,no_run
//! use clusterview::client::MockBackend;
//! use clusterview::controller::InteractionController;
//! use clusterview::render::RecordingSurface;
//!
//! #[tokio::main]
//! async fn main() -> clusterview::Result<()> {
//!     let mut ui = InteractionController::new(MockBackend::new(), RecordingSurface::default());
//!     ui.generate_data().await?;
//!     ui.select_method("random")?;
//!     ui.set_cluster_count(3)?;
//!     ui.run().await?;
//!     Ok(())
//! }
//! ```

use tracing::{debug, info, warn};

use crate::client::SessionBackend;
use crate::coords::{data_from_pixel, PlotGeometry, PointerEvent};
use crate::error::{ClusterViewError, Result};
use crate::protocol::{InitMethod, Point};
use crate::render::{build_scene, DrawSurface, RenderConfig};
use crate::state::{SessionPhase, SessionStateStore};

// ── Initialization Controller ────────────────────────────────────────────────

/// Result of offering a canvas click to the manual seeding buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The point was appended to the seed buffer.
    Recorded {
        /// True when this click filled the buffer to the cluster count.
        complete: bool,
    },
    /// Not in manual mode, or the buffer is already full.
    Ignored,
}

/// Owns the seeding configuration and the initialize transition.
#[derive(Debug, Clone)]
pub struct InitializationController {
    method: InitMethod,
    n_clusters: usize,
}

impl Default for InitializationController {
    fn default() -> Self {
        Self {
            method: InitMethod::Random,
            n_clusters: 4,
        }
    }
}

impl InitializationController {
    /// Controller with the default seeding configuration (random, 4 clusters).
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected seeding method.
    pub fn method(&self) -> InitMethod {
        self.method
    }

    /// Configured cluster count.
    pub fn cluster_count(&self) -> usize {
        self.n_clusters
    }

    /// Switch seeding method, invalidating all downstream cluster state.
    pub fn select_method(&mut self, store: &mut SessionStateStore, method: InitMethod) {
        self.method = method;
        store.clear_cluster_state();
        debug!(%method, "seeding method selected, cluster state cleared");
    }

    /// Change the cluster count, invalidating all downstream cluster state.
    pub fn set_cluster_count(&mut self, store: &mut SessionStateStore, n: usize) -> Result<()> {
        if n == 0 {
            return Err(ClusterViewError::Validation(
                "cluster count must be at least 1".into(),
            ));
        }
        self.n_clusters = n;
        store.clear_cluster_state();
        debug!(n_clusters = n, "cluster count changed, cluster state cleared");
        Ok(())
    }

    /// Offer a data-space click to the manual seed buffer.
    ///
    /// Accepted only in manual mode while the buffer is below the cluster
    /// count. On acceptance the buffer is mirrored into the centroids for
    /// immediate visual feedback.
    pub fn record_manual_click(
        &self,
        store: &mut SessionStateStore,
        point: Point,
    ) -> ClickOutcome {
        if self.method != InitMethod::Manual || store.manual_seeds().len() >= self.n_clusters {
            return ClickOutcome::Ignored;
        }
        store.push_manual_seed(point);
        store.set_centroids(store.manual_seeds().to_vec());
        ClickOutcome::Recorded {
            complete: store.manual_seeds().len() == self.n_clusters,
        }
    }

    /// True when step/run may proceed: either a non-manual method, or the
    /// seed buffer holds exactly one point per cluster.
    pub fn manual_seeding_complete(&self, store: &SessionStateStore) -> bool {
        self.method != InitMethod::Manual || store.manual_seeds().len() == self.n_clusters
    }

    /// Idempotent initialize guard.
    ///
    /// Resolves immediately without a network call when the session is
    /// already initialized, so repeated calls cannot create duplicate
    /// backend sessions. Otherwise performs one initialize exchange; on
    /// success the acknowledged centroids are stored and the phase becomes
    /// `Initialized`, on failure the phase stays `Uninitialized`.
    ///
    /// Returns true when an exchange was performed.
    pub async fn ensure_initialized<B: SessionBackend>(
        &self,
        store: &mut SessionStateStore,
        backend: &B,
    ) -> Result<bool> {
        if store.phase() != SessionPhase::Uninitialized {
            return Ok(false);
        }

        let manual = (self.method == InitMethod::Manual).then(|| store.manual_seeds().to_vec());
        debug!(method = %self.method, n_clusters = self.n_clusters, "initializing session");

        let centroids = backend
            .initialize(self.method, self.n_clusters, manual.as_deref())
            .await
            .inspect_err(|e| warn!(error = %e, "initialization failed"))?;

        if centroids.len() != self.n_clusters {
            return Err(ClusterViewError::Api {
                message: format!(
                    "server returned {} centroids for {} clusters",
                    centroids.len(),
                    self.n_clusters
                ),
                status_code: None,
            });
        }

        store.set_centroids(centroids);
        store.set_phase(SessionPhase::Initialized);
        info!("session initialized");
        Ok(true)
    }
}

// ── Interaction Controller ───────────────────────────────────────────────────

/// Outcome of a single step action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// True when the server signaled convergence on this step.
    pub converged: bool,
}

/// Top-level wiring from user actions to the session state machine.
///
/// Owns the store, the seeding controller, the backend adapter, and the
/// drawing surface. Every mutation is followed by a redraw so the
/// rendered view stays a faithful mirror of the store.
pub struct InteractionController<B: SessionBackend, S: DrawSurface> {
    backend: B,
    surface: S,
    store: SessionStateStore,
    init: InitializationController,
    render: RenderConfig,
}

impl<B: SessionBackend, S: DrawSurface> InteractionController<B, S> {
    /// Controller with default seeding and render configuration.
    ///
    /// Draws the initial (empty) scene, so the surface shows the pinned
    /// axis ranges before any data exists.
    pub fn new(backend: B, surface: S) -> Self {
        Self::with_render_config(backend, surface, RenderConfig::default())
    }

    /// Controller with explicit render configuration.
    pub fn with_render_config(backend: B, mut surface: S, render: RenderConfig) -> Self {
        let store = SessionStateStore::new();
        surface.draw(build_scene(&store, &render));
        Self {
            backend,
            surface,
            store,
            init: InitializationController::new(),
            render,
        }
    }

    /// Read access to the session state.
    pub fn store(&self) -> &SessionStateStore {
        &self.store
    }

    /// Read access to the drawing surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Read access to the backend adapter.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Currently selected seeding method.
    pub fn method(&self) -> InitMethod {
        self.init.method()
    }

    /// Configured cluster count.
    pub fn cluster_count(&self) -> usize {
        self.init.cluster_count()
    }

    /// Generate a fresh data set, replacing the current one and clearing
    /// all cluster state.
    pub async fn generate_data(&mut self) -> Result<()> {
        let points = self
            .backend
            .generate_data()
            .await
            .inspect_err(|e| warn!(error = %e, "data generation aborted"))?;
        info!(points = points.len(), "data set replaced");
        self.store.set_data_points(points);
        self.store.clear_cluster_state();
        self.redraw();
        Ok(())
    }

    /// Select a seeding method from its UI name.
    ///
    /// Local invalidation only; the backend session is invalidated lazily
    /// on the next initialize. Unrecognized names are rejected.
    pub fn select_method(&mut self, name: &str) -> Result<()> {
        let method: InitMethod = name.parse()?;
        self.init.select_method(&mut self.store, method);
        self.redraw();
        Ok(())
    }

    /// Change the cluster count. Local invalidation only.
    pub fn set_cluster_count(&mut self, n: usize) -> Result<()> {
        self.init.set_cluster_count(&mut self.store, n)?;
        self.redraw();
        Ok(())
    }

    /// Advance the algorithm by one iteration.
    pub async fn step(&mut self) -> Result<StepOutcome> {
        self.require_manual_seeds()?;
        if self
            .init
            .ensure_initialized(&mut self.store, &self.backend)
            .await?
        {
            self.redraw();
        }

        let update = self
            .backend
            .step()
            .await
            .inspect_err(|e| warn!(error = %e, "step aborted"))?;
        self.apply_cluster_update(update.centroids, update.labels)?;
        if update.converged {
            self.store.set_phase(SessionPhase::Converged);
            info!("kmeans converged");
        }
        self.redraw();
        Ok(StepOutcome {
            converged: update.converged,
        })
    }

    /// Run the algorithm to convergence.
    pub async fn run(&mut self) -> Result<()> {
        self.require_manual_seeds()?;
        if self
            .init
            .ensure_initialized(&mut self.store, &self.backend)
            .await?
        {
            self.redraw();
        }

        let update = self
            .backend
            .run()
            .await
            .inspect_err(|e| warn!(error = %e, "run aborted"))?;
        self.apply_cluster_update(update.centroids, update.labels)?;
        self.store.set_phase(SessionPhase::Converged);
        info!("run completed");
        self.redraw();
        Ok(())
    }

    /// Discard the clustering session, keeping the data set.
    ///
    /// Clears the seeding buffer and phase unconditionally, regardless of
    /// the selected method.
    pub async fn reset(&mut self) -> Result<()> {
        self.backend
            .reset()
            .await
            .inspect_err(|e| warn!(error = %e, "reset aborted"))?;
        self.store.clear_cluster_state();
        info!("session reset");
        self.redraw();
        Ok(())
    }

    /// Handle a raw canvas click.
    ///
    /// The pixel event is mapped to data space, offered to the manual seed
    /// buffer, and — when the click completes the buffer — the initialize
    /// round-trip is triggered automatically. Clicks outside manual mode,
    /// with a full buffer, or outside the plot content are ignored.
    pub async fn canvas_click(
        &mut self,
        event: PointerEvent,
        geometry: &PlotGeometry,
    ) -> Result<()> {
        let Some(point) = data_from_pixel(geometry, &self.render.bounds, &event) else {
            debug!("click outside plot content ignored");
            return Ok(());
        };

        match self.init.record_manual_click(&mut self.store, point) {
            ClickOutcome::Ignored => {
                debug!("click ignored: not seeding manually or buffer full");
                Ok(())
            }
            ClickOutcome::Recorded { complete } => {
                debug!(x = point.x, y = point.y, complete, "manual centroid recorded");
                self.redraw();
                if complete
                    && self
                        .init
                        .ensure_initialized(&mut self.store, &self.backend)
                        .await?
                {
                    self.redraw();
                }
                Ok(())
            }
        }
    }

    /// Mirror an acknowledged step/run payload into the store.
    ///
    /// Both lengths are validated before either mutation; a malformed
    /// response leaves the store, and therefore the view, untouched.
    fn apply_cluster_update(&mut self, centroids: Vec<Point>, labels: Vec<usize>) -> Result<()> {
        if centroids.len() != self.init.cluster_count() {
            return Err(ClusterViewError::Api {
                message: format!(
                    "server returned {} centroids for {} clusters",
                    centroids.len(),
                    self.init.cluster_count()
                ),
                status_code: None,
            });
        }
        if labels.len() != self.store.data_points().len() {
            return Err(ClusterViewError::Api {
                message: format!(
                    "server returned {} labels for {} data points",
                    labels.len(),
                    self.store.data_points().len()
                ),
                status_code: None,
            });
        }
        self.store.set_centroids(centroids);
        self.store.set_labels(labels)?;
        Ok(())
    }

    fn require_manual_seeds(&self) -> Result<()> {
        if self.init.manual_seeding_complete(&self.store) {
            Ok(())
        } else {
            Err(ClusterViewError::Validation(
                "select all centroids before proceeding".into(),
            ))
        }
    }

    fn redraw(&mut self) {
        self.surface.draw(build_scene(&self.store, &self.render));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockBackend, MockBackendConfig};
    use crate::render::RecordingSurface;

    fn controller() -> InteractionController<MockBackend, RecordingSurface> {
        InteractionController::new(MockBackend::new(), RecordingSurface::default())
    }

    #[test]
    fn test_initial_scene_is_drawn() {
        let ui = controller();
        assert_eq!(ui.surface().scenes().len(), 1);
        assert!(ui.surface().last().unwrap().layers.is_empty());
    }

    #[test]
    fn test_unrecognized_method_rejected() {
        let mut ui = controller();
        let err = ui.select_method("kmeans++").unwrap_err();
        assert!(matches!(err, ClusterViewError::Validation(_)));
        assert_eq!(ui.method(), InitMethod::Random);
    }

    #[test]
    fn test_zero_cluster_count_rejected() {
        let mut ui = controller();
        assert!(ui.set_cluster_count(0).is_err());
        assert_eq!(ui.cluster_count(), 4);
    }

    #[tokio::test]
    async fn test_ensure_initialized_is_idempotent() {
        let backend = MockBackend::new();
        let mut store = SessionStateStore::new();
        let init = InitializationController::new();

        store.set_data_points(backend.generate_data().await.unwrap());
        assert!(init.ensure_initialized(&mut store, &backend).await.unwrap());
        assert!(!init.ensure_initialized(&mut store, &backend).await.unwrap());
        assert_eq!(backend.initialize_calls(), 1);
        assert_eq!(store.phase(), SessionPhase::Initialized);
        assert_eq!(store.centroids().len(), 4);
    }

    #[tokio::test]
    async fn test_failed_initialize_stays_uninitialized() {
        let backend = MockBackend::with_config(MockBackendConfig {
            fail_initialize: Some("invalid cluster count".into()),
            ..Default::default()
        });
        let mut store = SessionStateStore::new();
        store.set_data_points(backend.generate_data().await.unwrap());

        let init = InitializationController::new();
        let err = init
            .ensure_initialized(&mut store, &backend)
            .await
            .unwrap_err();
        assert!(err.is_backend_failure());
        assert_eq!(store.phase(), SessionPhase::Uninitialized);
        assert!(store.centroids().is_empty());
    }

    #[test]
    fn test_manual_click_gating() {
        let mut store = SessionStateStore::new();
        let mut init = InitializationController::new();

        // Clicks do nothing outside manual mode.
        assert_eq!(
            init.record_manual_click(&mut store, Point::new(0.0, 0.0)),
            ClickOutcome::Ignored
        );

        init.select_method(&mut store, InitMethod::Manual);
        init.set_cluster_count(&mut store, 2).unwrap();

        assert_eq!(
            init.record_manual_click(&mut store, Point::new(1.0, 1.0)),
            ClickOutcome::Recorded { complete: false }
        );
        // Buffer mirrored into centroids for preview.
        assert_eq!(store.centroids().len(), 1);

        assert_eq!(
            init.record_manual_click(&mut store, Point::new(2.0, 2.0)),
            ClickOutcome::Recorded { complete: true }
        );

        // Buffer full: further clicks ignored.
        assert_eq!(
            init.record_manual_click(&mut store, Point::new(3.0, 3.0)),
            ClickOutcome::Ignored
        );
        assert_eq!(store.manual_seeds().len(), 2);
    }

    #[tokio::test]
    async fn test_method_change_invalidates_state() {
        let mut ui = controller();
        ui.generate_data().await.unwrap();
        ui.set_cluster_count(3).unwrap();
        ui.run().await.unwrap();
        assert_eq!(ui.store().phase(), SessionPhase::Converged);

        ui.select_method("manual").unwrap();
        assert_eq!(ui.store().phase(), SessionPhase::Uninitialized);
        assert!(ui.store().centroids().is_empty());
        assert!(ui.store().labels().is_empty());
        // Local invalidation only: no extra backend traffic.
        assert_eq!(ui.backend().reset_calls(), 0);
    }

    #[tokio::test]
    async fn test_step_surfaces_convergence() {
        let backend = MockBackend::with_config(MockBackendConfig {
            converge_after: 2,
            ..Default::default()
        });
        let mut ui = InteractionController::new(backend, RecordingSurface::default());
        ui.generate_data().await.unwrap();
        ui.set_cluster_count(3).unwrap();

        let first = ui.step().await.unwrap();
        assert!(!first.converged);
        assert_eq!(ui.store().phase(), SessionPhase::Initialized);

        let second = ui.step().await.unwrap();
        assert!(second.converged);
        assert_eq!(ui.store().phase(), SessionPhase::Converged);
        // One initialize for the two steps.
        assert_eq!(ui.backend().initialize_calls(), 1);
        assert_eq!(ui.backend().step_calls(), 2);
    }
}
