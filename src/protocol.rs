//! Session Service Wire Protocol
//!
//! Request and response bodies exchanged with the backend clustering
//! service, plus the small domain types shared across the crate. The
//! service speaks JSON: points travel as two-element `[x, y]` arrays,
//! initialization methods as lowercase strings, and every response carries
//! a `status` discriminant of `"success"` or `"error"`.
//!
//! The wire shapes here are deliberately dumb — status checking and
//! normalization into domain results happens in [`crate::client`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ClusterViewError;

// ── Domain Types ─────────────────────────────────────────────────────────────

/// A 2-D point in data space.
///
/// Serialized as a two-element JSON array to match the service encoding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point from data-space coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from(pair: [f64; 2]) -> Self {
        Self {
            x: pair[0],
            y: pair[1],
        }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Centroid seeding strategy for a clustering session.
///
/// Selecting a new method invalidates all downstream session state; see
/// [`crate::controller::InitializationController::select_method`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitMethod {
    /// Server picks the initial centroids.
    Random,
    /// The user places each initial centroid by clicking the canvas.
    Manual,
}

impl InitMethod {
    /// Wire name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            InitMethod::Random => "random",
            InitMethod::Manual => "manual",
        }
    }
}

impl fmt::Display for InitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InitMethod {
    type Err = ClusterViewError;

    /// Unrecognized method names are rejected rather than silently
    /// defaulted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(InitMethod::Random),
            "manual" => Ok(InitMethod::Manual),
            other => Err(ClusterViewError::Validation(format!(
                "unrecognized initialization method '{}'",
                other
            ))),
        }
    }
}

// ── Wire Bodies ──────────────────────────────────────────────────────────────

/// Response outcome discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The operation completed.
    Success,
    /// The operation failed; `message` carries the reason.
    Error,
}

/// Body for `POST /initialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeRequest {
    /// Seeding strategy.
    pub init_method: InitMethod,
    /// Requested cluster count, at least 1.
    pub n_clusters: usize,
    /// User-picked centroids; `null` for non-manual methods.
    pub initial_centroids: Option<Vec<Point>>,
}

/// Response from `POST /generate_data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateDataResponse {
    /// Outcome discriminant.
    pub status: Status,
    /// The freshly generated point set.
    #[serde(default)]
    pub data_points: Vec<Point>,
    /// Failure reason when `status` is `Error`.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response from `POST /initialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResponse {
    /// Outcome discriminant.
    pub status: Status,
    /// Initial centroids, one per cluster.
    #[serde(default)]
    pub centroids: Vec<Point>,
    /// Failure reason when `status` is `Error`.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response from `POST /step`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResponse {
    /// Outcome discriminant.
    pub status: Status,
    /// Centroids after the iteration.
    #[serde(default)]
    pub centroids: Vec<Point>,
    /// Cluster assignment per data point.
    #[serde(default)]
    pub labels: Vec<usize>,
    /// True when the iteration produced no further change.
    #[serde(default)]
    pub converged: bool,
    /// Failure reason when `status` is `Error`.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response from `POST /run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    /// Outcome discriminant.
    pub status: Status,
    /// Centroids at convergence.
    #[serde(default)]
    pub centroids: Vec<Point>,
    /// Cluster assignment per data point.
    #[serde(default)]
    pub labels: Vec<usize>,
    /// Failure reason when `status` is `Error`.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response from `POST /reset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResponse {
    /// Outcome discriminant.
    pub status: Status,
    /// Failure reason when `status` is `Error`.
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_wire_format() {
        let json = serde_json::to_string(&Point::new(1.5, -2.0)).unwrap();
        assert_eq!(json, "[1.5,-2.0]");

        let p: Point = serde_json::from_str("[3.0, 4.0]").unwrap();
        assert_eq!(p, Point::new(3.0, 4.0));
    }

    #[test]
    fn test_init_method_parsing() {
        assert_eq!("random".parse::<InitMethod>().unwrap(), InitMethod::Random);
        assert_eq!("manual".parse::<InitMethod>().unwrap(), InitMethod::Manual);
        assert!("kmeans++".parse::<InitMethod>().is_err());
        assert!("".parse::<InitMethod>().is_err());
    }

    #[test]
    fn test_initialize_request_null_centroids() {
        let req = InitializeRequest {
            init_method: InitMethod::Random,
            n_clusters: 3,
            initial_centroids: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["init_method"], "random");
        assert_eq!(json["n_clusters"], 3);
        assert!(json["initial_centroids"].is_null());
    }

    #[test]
    fn test_initialize_request_manual_centroids() {
        let req = InitializeRequest {
            init_method: InitMethod::Manual,
            n_clusters: 2,
            initial_centroids: Some(vec![Point::new(0.0, 1.0), Point::new(2.0, 3.0)]),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["init_method"], "manual");
        assert_eq!(json["initial_centroids"][1][0], 2.0);
    }

    #[test]
    fn test_error_response_without_payload() {
        // Error bodies carry only status and message; payload fields default.
        let resp: StepResponse =
            serde_json::from_str(r#"{"status": "error", "message": "KMeans not initialized."}"#)
                .unwrap();
        assert_eq!(resp.status, Status::Error);
        assert!(resp.centroids.is_empty());
        assert!(resp.labels.is_empty());
        assert!(!resp.converged);
        assert_eq!(resp.message.as_deref(), Some("KMeans not initialized."));
    }

    #[test]
    fn test_step_response_success() {
        let resp: StepResponse = serde_json::from_str(
            r#"{"status": "success", "centroids": [[0.0, 0.0], [5.0, 5.0]],
                "labels": [0, 1, 1], "converged": true}"#,
        )
        .unwrap();
        assert_eq!(resp.status, Status::Success);
        assert_eq!(resp.centroids.len(), 2);
        assert_eq!(resp.labels, vec![0, 1, 1]);
        assert!(resp.converged);
    }
}
