//! Render Pipeline
//!
//! Pure projection of the session state into the draw-call shape the
//! external plotting surface expects: a points layer, an optional
//! centroids layer, and a layout pinning the fixed axis ranges. The
//! surface itself is a fire-and-forget sink behind [`DrawSurface`];
//! nothing here reads or writes state beyond its inputs, so rebuilding
//! the scene after every mutation is safe and idempotent.

use crate::coords::AxisBounds;
use crate::state::SessionStateStore;

/// How a layer's markers are colored.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerColor {
    /// Single flat color for every marker.
    Flat(String),
    /// Per-marker color derived from cluster labels through a palette.
    ByLabel {
        /// Cluster index per marker, aligned with the layer's points.
        labels: Vec<usize>,
        /// Palette name understood by the drawing surface.
        palette: String,
    },
}

/// Marker styling for one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Marker size in pixels.
    pub size: f64,
    /// Marker symbol name ("circle", "x", ...).
    pub symbol: String,
    /// Coloring rule.
    pub color: MarkerColor,
}

/// One named scatter layer with parallel coordinate sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Layer name shown in the plot legend.
    pub name: String,
    /// X coordinates.
    pub xs: Vec<f64>,
    /// Y coordinates, parallel to `xs`.
    pub ys: Vec<f64>,
    /// Marker styling.
    pub marker: Marker,
}

/// Fixed layout handed to the surface with every draw.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotLayout {
    /// Plot title.
    pub title: String,
    /// X axis range.
    pub x_range: (f64, f64),
    /// Y axis range.
    pub y_range: (f64, f64),
}

/// A complete draw call: layers plus layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Scatter layers, points first, centroids last.
    pub layers: Vec<Layer>,
    /// Axis-range layout.
    pub layout: PlotLayout,
}

impl Scene {
    /// The layer with the given name, if drawn.
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }
}

/// Styling configuration for scene construction.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Plot title.
    pub title: String,
    /// Fixed axis ranges.
    pub bounds: AxisBounds,
    /// Data point marker size.
    pub point_size: f64,
    /// Centroid marker size.
    pub centroid_size: f64,
    /// Flat color used for unlabeled data points.
    pub point_color: String,
    /// Centroid marker color.
    pub centroid_color: String,
    /// Palette used when coloring points by label.
    pub palette: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "KMeans Clustering".to_string(),
            bounds: AxisBounds::default(),
            point_size: 6.0,
            centroid_size: 12.0,
            point_color: "blue".to_string(),
            centroid_color: "red".to_string(),
            palette: "Viridis".to_string(),
        }
    }
}

/// Name of the data point layer.
pub const POINTS_LAYER: &str = "Data Points";
/// Name of the centroid layer.
pub const CENTROIDS_LAYER: &str = "Centroids";

/// Project the store into a scene.
///
/// Points are colored by label when labels exist, otherwise flat. A
/// centroids layer appears whenever any centroids exist, including the
/// partial manual-seeding preview.
pub fn build_scene(store: &SessionStateStore, config: &RenderConfig) -> Scene {
    let mut layers = Vec::with_capacity(2);

    if !store.data_points().is_empty() {
        let color = if store.labels().is_empty() {
            MarkerColor::Flat(config.point_color.clone())
        } else {
            MarkerColor::ByLabel {
                labels: store.labels().to_vec(),
                palette: config.palette.clone(),
            }
        };
        layers.push(Layer {
            name: POINTS_LAYER.to_string(),
            xs: store.data_points().iter().map(|p| p.x).collect(),
            ys: store.data_points().iter().map(|p| p.y).collect(),
            marker: Marker {
                size: config.point_size,
                symbol: "circle".to_string(),
                color,
            },
        });
    }

    if !store.centroids().is_empty() {
        layers.push(Layer {
            name: CENTROIDS_LAYER.to_string(),
            xs: store.centroids().iter().map(|p| p.x).collect(),
            ys: store.centroids().iter().map(|p| p.y).collect(),
            marker: Marker {
                size: config.centroid_size,
                symbol: "x".to_string(),
                color: MarkerColor::Flat(config.centroid_color.clone()),
            },
        });
    }

    Scene {
        layers,
        layout: PlotLayout {
            title: config.title.clone(),
            x_range: (config.bounds.x_min, config.bounds.x_max),
            y_range: (config.bounds.y_min, config.bounds.y_max),
        },
    }
}

/// Sink for completed scenes.
///
/// Implementations hand the scene to the real drawing surface; nothing is
/// returned to the controller.
pub trait DrawSurface {
    /// Draw the scene, replacing whatever was shown before.
    fn draw(&mut self, scene: Scene);
}

/// Test surface that records every drawn scene.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    scenes: Vec<Scene>,
}

impl RecordingSurface {
    /// All scenes drawn so far, oldest first.
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// The most recently drawn scene.
    pub fn last(&self) -> Option<&Scene> {
        self.scenes.last()
    }
}

impl DrawSurface for RecordingSurface {
    fn draw(&mut self, scene: Scene) {
        self.scenes.push(scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Point;
    use crate::state::SessionPhase;

    fn store_with_points(n: usize) -> SessionStateStore {
        let mut store = SessionStateStore::new();
        store.set_data_points((0..n).map(|i| Point::new(i as f64, i as f64)).collect());
        store
    }

    #[test]
    fn test_empty_store_draws_no_layers() {
        let scene = build_scene(&SessionStateStore::new(), &RenderConfig::default());
        assert!(scene.layers.is_empty());
        assert_eq!(scene.layout.x_range, (-10.0, 10.0));
        assert_eq!(scene.layout.y_range, (-10.0, 10.0));
    }

    #[test]
    fn test_unlabeled_points_are_flat_colored() {
        let store = store_with_points(4);
        let scene = build_scene(&store, &RenderConfig::default());
        assert_eq!(scene.layers.len(), 1);
        let points = scene.layer(POINTS_LAYER).unwrap();
        assert_eq!(points.xs.len(), 4);
        assert_eq!(points.marker.color, MarkerColor::Flat("blue".into()));
        assert!(scene.layer(CENTROIDS_LAYER).is_none());
    }

    #[test]
    fn test_labeled_points_use_palette() {
        let mut store = store_with_points(3);
        store.set_phase(SessionPhase::Initialized);
        store.set_centroids(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        store.set_labels(vec![0, 1, 0]).unwrap();

        let scene = build_scene(&store, &RenderConfig::default());
        let points = scene.layer(POINTS_LAYER).unwrap();
        match &points.marker.color {
            MarkerColor::ByLabel { labels, palette } => {
                assert_eq!(labels, &vec![0, 1, 0]);
                assert_eq!(palette, "Viridis");
            }
            other => panic!("expected label coloring, got {:?}", other),
        }

        let centroids = scene.layer(CENTROIDS_LAYER).unwrap();
        assert_eq!(centroids.xs.len(), 2);
        assert_eq!(centroids.marker.symbol, "x");
        assert_eq!(centroids.marker.size, 12.0);
    }

    #[test]
    fn test_manual_preview_renders_partial_centroids() {
        let mut store = store_with_points(2);
        store.set_centroids(vec![Point::new(-3.0, 3.0)]);
        let scene = build_scene(&store, &RenderConfig::default());
        assert_eq!(scene.layer(CENTROIDS_LAYER).unwrap().xs.len(), 1);
    }

    #[test]
    fn test_scene_is_idempotent_given_same_store() {
        let store = store_with_points(5);
        let config = RenderConfig::default();
        assert_eq!(build_scene(&store, &config), build_scene(&store, &config));
    }

    #[test]
    fn test_recording_surface_captures_order() {
        let store = store_with_points(1);
        let config = RenderConfig::default();
        let mut surface = RecordingSurface::default();
        surface.draw(build_scene(&SessionStateStore::new(), &config));
        surface.draw(build_scene(&store, &config));
        assert_eq!(surface.scenes().len(), 2);
        assert_eq!(surface.last().unwrap().layers.len(), 1);
    }
}
