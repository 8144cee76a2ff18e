//! # Clusterview - Interactive KMeans Session Controller
//!
//! Clusterview is the client-side controller of an interactive, step-wise
//! KMeans visualizer. A user generates a 2-D point set, seeds cluster
//! centers automatically or by clicking the canvas, and advances the
//! algorithm one iteration at a time or runs it to convergence against a
//! stateful remote clustering service.
//!
//! The crate owns the interaction/session state machine: it validates and
//! accumulates manually placed centroids, translates pixel-space clicks
//! into data-space coordinates, sequences the asynchronous round-trips to
//! the backend service, and keeps the rendered view a faithful mirror of
//! the session state after every transition. The numeric clustering runs
//! on the remote service, and pixels are produced by an external drawing
//! surface; both are collaborators behind traits.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clusterview::client::{HttpClientConfig, HttpSessionClient};
//! use clusterview::controller::InteractionController;
//! use clusterview::render::{DrawSurface, Scene};
//!
//! struct ConsoleSurface;
//!
//! impl DrawSurface for ConsoleSurface {
//!     fn draw(&mut self, scene: Scene) {
//!         println!("drawing {} layers", scene.layers.len());
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> clusterview::Result<()> {
//!     let backend = HttpSessionClient::new(HttpClientConfig::default())?;
//!     let mut ui = InteractionController::new(backend, ConsoleSurface);
//!
//!     ui.generate_data().await?;
//!     ui.select_method("random")?;
//!     ui.set_cluster_count(3)?;
//!
//!     let outcome = ui.step().await?;
//!     if outcome.converged {
//!         println!("converged after one step");
//!     }
//!
//!     ui.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Control flow for every user action:
//!
//! UI event → [`controller::InteractionController`] →
//! ([`controller::InitializationController`] validation) →
//! [`client::SessionBackend`] round-trip → [`state::SessionStateStore`]
//! update → [`render`] scene → [`render::DrawSurface`] draw.
//!
//! Canvas clicks pass through [`coords`] before reaching the seeding
//! buffer. State is session-scoped and memory-only; nothing persists
//! across reloads.

#![warn(missing_docs)]

// ── Core ──────────────────────────────────────────────────────────────────────
// Errors, wire protocol, session state.
pub mod error;
pub mod protocol;
pub mod state;

// ── Backend Adapter ───────────────────────────────────────────────────────────
pub mod client;

// ── Interaction ───────────────────────────────────────────────────────────────
// Coordinate mapping, scene construction, controllers.
pub mod controller;
pub mod coords;
pub mod render;

pub use client::{HttpClientConfig, HttpSessionClient, MockBackend, SessionBackend};
pub use controller::{InitializationController, InteractionController, StepOutcome};
pub use coords::{AxisBounds, PlotGeometry, PointerEvent};
pub use error::{ClusterViewError, Result};
pub use protocol::{InitMethod, Point};
pub use render::{DrawSurface, RecordingSurface, RenderConfig, Scene};
pub use state::{SessionPhase, SessionStateStore};
