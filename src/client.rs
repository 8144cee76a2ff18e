//! Session Backend Client
//!
//! Abstraction layer over the remote clustering session service, with an
//! HTTP implementation and a deterministic mock for testing. Each trait
//! method is a single request/response exchange with no implicit retry or
//! caching; success and failure are surfaced to the caller as-is.
//!
//! Transport failures, malformed bodies, and server-reported logical
//! failures all normalize to [`ClusterViewError`](crate::ClusterViewError)
//! variants that callers treat identically: log, abort the pending action,
//! leave prior state untouched.
//!
//! # Example
//!
//! ```rust,no_run
//! use clusterview::client::{HttpClientConfig, HttpSessionClient, SessionBackend};
//! use clusterview::protocol::InitMethod;
//!
//! #[tokio::main]
//! async fn main() -> clusterview::Result<()> {
//!     let backend = HttpSessionClient::new(HttpClientConfig::default())?;
//!
//!     let points = backend.generate_data().await?;
//!     println!("generated {} points", points.len());
//!
//!     let centroids = backend.initialize(InitMethod::Random, 3, None).await?;
//!     println!("seeded {} centroids", centroids.len());
//!     Ok(())
//! }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{ClusterViewError, Result};
use crate::protocol::{
    GenerateDataResponse, InitMethod, InitializeRequest, InitializeResponse, Point, ResetResponse,
    RunResponse, Status, StepResponse,
};

// ── Domain Results ───────────────────────────────────────────────────────────

/// Outcome of a single KMeans iteration.
#[derive(Debug, Clone)]
pub struct StepUpdate {
    /// Centroids after the iteration.
    pub centroids: Vec<Point>,
    /// Cluster assignment per data point, aligned with the point sequence.
    pub labels: Vec<usize>,
    /// True when the server signaled no further change.
    pub converged: bool,
}

/// Outcome of running the algorithm to convergence.
#[derive(Debug, Clone)]
pub struct RunUpdate {
    /// Centroids at convergence.
    pub centroids: Vec<Point>,
    /// Cluster assignment per data point.
    pub labels: Vec<usize>,
}

// ── Core Trait ───────────────────────────────────────────────────────────────

/// Request/response adapter to the backend clustering session service.
///
/// One method per backend capability. Implementations must not retry and
/// must not hold state the server has not acknowledged.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Generate a fresh 2-D data set, replacing the server-side one.
    async fn generate_data(&self) -> Result<Vec<Point>>;

    /// Start a clustering session. `manual_centroids` is sent only for
    /// manual seeding and must then contain exactly `n_clusters` points.
    /// Returns the initial centroids the server committed to.
    async fn initialize(
        &self,
        method: InitMethod,
        n_clusters: usize,
        manual_centroids: Option<&[Point]>,
    ) -> Result<Vec<Point>>;

    /// Advance the session by one iteration.
    async fn step(&self) -> Result<StepUpdate>;

    /// Run the session to convergence.
    async fn run(&self) -> Result<RunUpdate>;

    /// Discard the server-side session. The generated data set survives.
    async fn reset(&self) -> Result<()>;
}

// ── HTTP Client ──────────────────────────────────────────────────────────────

/// Configuration for [`HttpSessionClient`].
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL of the session service.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl HttpClientConfig {
    /// Config pointing at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// HTTP implementation of [`SessionBackend`].
pub struct HttpSessionClient {
    config: HttpClientConfig,
    client: reqwest::Client,
}

impl HttpSessionClient {
    /// Build a client with the given configuration.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ClusterViewError::Network(format!("failed to create HTTP client: {}", e))
            })?;
        Ok(Self { config, client })
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<T> {
        let url = format!("{}{}", self.config.base_url, path);
        let mut request = self.client.post(&url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| ClusterViewError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ClusterViewError::Network(e.to_string()))?;

        // The service reports logical failures with both a non-2xx status
        // and a JSON body; prefer the body's message when it parses.
        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v["message"].as_str().map(String::from))
                .unwrap_or(text);
            return Err(ClusterViewError::Api {
                message,
                status_code: Some(status.as_u16()),
            });
        }

        serde_json::from_str(&text).map_err(|e| ClusterViewError::Serialization(e.to_string()))
    }
}

fn logical_failure(message: Option<String>) -> ClusterViewError {
    ClusterViewError::Api {
        message: message.unwrap_or_default(),
        status_code: None,
    }
}

#[async_trait]
impl SessionBackend for HttpSessionClient {
    async fn generate_data(&self) -> Result<Vec<Point>> {
        let resp: GenerateDataResponse = self.post("/generate_data", None::<&()>).await?;
        if resp.status == Status::Error {
            return Err(logical_failure(resp.message));
        }
        debug!(points = resp.data_points.len(), "data set generated");
        Ok(resp.data_points)
    }

    async fn initialize(
        &self,
        method: InitMethod,
        n_clusters: usize,
        manual_centroids: Option<&[Point]>,
    ) -> Result<Vec<Point>> {
        let body = InitializeRequest {
            init_method: method,
            n_clusters,
            initial_centroids: manual_centroids.map(<[Point]>::to_vec),
        };
        let resp: InitializeResponse = self.post("/initialize", Some(&body)).await?;
        if resp.status == Status::Error {
            return Err(logical_failure(resp.message));
        }
        debug!(%method, n_clusters, "session initialized");
        Ok(resp.centroids)
    }

    async fn step(&self) -> Result<StepUpdate> {
        let resp: StepResponse = self.post("/step", None::<&()>).await?;
        if resp.status == Status::Error {
            return Err(logical_failure(resp.message));
        }
        Ok(StepUpdate {
            centroids: resp.centroids,
            labels: resp.labels,
            converged: resp.converged,
        })
    }

    async fn run(&self) -> Result<RunUpdate> {
        let resp: RunResponse = self.post("/run", None::<&()>).await?;
        if resp.status == Status::Error {
            return Err(logical_failure(resp.message));
        }
        Ok(RunUpdate {
            centroids: resp.centroids,
            labels: resp.labels,
        })
    }

    async fn reset(&self) -> Result<()> {
        let resp: ResetResponse = self.post("/reset", None::<&()>).await?;
        if resp.status == Status::Error {
            return Err(logical_failure(resp.message));
        }
        Ok(())
    }
}

// ── Mock Backend ─────────────────────────────────────────────────────────────

/// Configuration for [`MockBackend`].
#[derive(Debug, Clone)]
pub struct MockBackendConfig {
    /// Number of points `generate_data` produces.
    pub n_points: usize,
    /// Seed for deterministic point and centroid generation.
    pub seed: u64,
    /// Number of steps before the session reports convergence.
    pub converge_after: u64,
    /// When set, `initialize` fails with this message.
    pub fail_initialize: Option<String>,
    /// When set, step and run report these labels instead of the derived
    /// assignment, regardless of the data point count.
    pub labels_override: Option<Vec<usize>>,
    /// When set, step and run report these centroids instead of the
    /// session's, regardless of the cluster count.
    pub centroids_override: Option<Vec<Point>>,
}

impl Default for MockBackendConfig {
    fn default() -> Self {
        Self {
            n_points: 300,
            seed: 42,
            converge_after: 3,
            fail_initialize: None,
            labels_override: None,
            centroids_override: None,
        }
    }
}

#[derive(Debug, Default)]
struct MockSession {
    n_clusters: usize,
    centroids: Vec<Point>,
    n_points: usize,
    steps_taken: u64,
}

/// Deterministic in-memory [`SessionBackend`] for tests.
///
/// Mirrors the real service's session lifecycle: step and run fail until a
/// session is initialized, and reset discards the session but not the data
/// set. Per-operation call counters support exactly-once assertions.
pub struct MockBackend {
    config: MockBackendConfig,
    session: Mutex<Option<MockSession>>,
    data_count: Mutex<usize>,
    generate_calls: AtomicU64,
    initialize_calls: AtomicU64,
    step_calls: AtomicU64,
    run_calls: AtomicU64,
    reset_calls: AtomicU64,
}

impl MockBackend {
    /// Mock with default configuration.
    pub fn new() -> Self {
        Self::with_config(MockBackendConfig::default())
    }

    /// Mock with explicit configuration.
    pub fn with_config(config: MockBackendConfig) -> Self {
        Self {
            config,
            session: Mutex::new(None),
            data_count: Mutex::new(0),
            generate_calls: AtomicU64::new(0),
            initialize_calls: AtomicU64::new(0),
            step_calls: AtomicU64::new(0),
            run_calls: AtomicU64::new(0),
            reset_calls: AtomicU64::new(0),
        }
    }

    /// How many times `generate_data` was called.
    pub fn generate_calls(&self) -> u64 {
        self.generate_calls.load(Ordering::Relaxed)
    }

    /// How many times `initialize` was called.
    pub fn initialize_calls(&self) -> u64 {
        self.initialize_calls.load(Ordering::Relaxed)
    }

    /// How many times `step` was called.
    pub fn step_calls(&self) -> u64 {
        self.step_calls.load(Ordering::Relaxed)
    }

    /// How many times `run` was called.
    pub fn run_calls(&self) -> u64 {
        self.run_calls.load(Ordering::Relaxed)
    }

    /// How many times `reset` was called.
    pub fn reset_calls(&self) -> u64 {
        self.reset_calls.load(Ordering::Relaxed)
    }

    fn lcg_points(seed: u64, count: usize) -> Vec<Point> {
        let mut state = seed;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 33) as f64 / u32::MAX as f64) * 20.0 - 10.0
        };
        (0..count)
            .map(|_| {
                let x = next();
                let y = next();
                Point::new(x, y)
            })
            .collect()
    }

    fn assignments(n_points: usize, n_clusters: usize) -> Vec<usize> {
        (0..n_points).map(|i| i % n_clusters.max(1)).collect()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionBackend for MockBackend {
    async fn generate_data(&self) -> Result<Vec<Point>> {
        self.generate_calls.fetch_add(1, Ordering::Relaxed);
        let points = Self::lcg_points(self.config.seed, self.config.n_points);
        *self.data_count.lock() = points.len();
        *self.session.lock() = None;
        Ok(points)
    }

    async fn initialize(
        &self,
        _method: InitMethod,
        n_clusters: usize,
        manual_centroids: Option<&[Point]>,
    ) -> Result<Vec<Point>> {
        self.initialize_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(message) = &self.config.fail_initialize {
            return Err(ClusterViewError::Api {
                message: message.clone(),
                status_code: Some(500),
            });
        }
        let n_points = *self.data_count.lock();
        if n_points == 0 {
            return Err(ClusterViewError::Api {
                message: "Data not generated yet.".into(),
                status_code: Some(400),
            });
        }
        let centroids = match manual_centroids {
            Some(seeds) => seeds.to_vec(),
            None => Self::lcg_points(self.config.seed.wrapping_add(1), n_clusters),
        };
        *self.session.lock() = Some(MockSession {
            n_clusters,
            centroids: centroids.clone(),
            n_points,
            steps_taken: 0,
        });
        Ok(centroids)
    }

    async fn step(&self) -> Result<StepUpdate> {
        self.step_calls.fetch_add(1, Ordering::Relaxed);
        let mut guard = self.session.lock();
        let session = guard.as_mut().ok_or_else(|| ClusterViewError::Api {
            message: "KMeans not initialized.".into(),
            status_code: Some(400),
        })?;
        session.steps_taken += 1;
        Ok(StepUpdate {
            centroids: self
                .config
                .centroids_override
                .clone()
                .unwrap_or_else(|| session.centroids.clone()),
            labels: self
                .config
                .labels_override
                .clone()
                .unwrap_or_else(|| Self::assignments(session.n_points, session.n_clusters)),
            converged: session.steps_taken >= self.config.converge_after,
        })
    }

    async fn run(&self) -> Result<RunUpdate> {
        self.run_calls.fetch_add(1, Ordering::Relaxed);
        let mut guard = self.session.lock();
        let session = guard.as_mut().ok_or_else(|| ClusterViewError::Api {
            message: "KMeans not initialized.".into(),
            status_code: Some(400),
        })?;
        session.steps_taken = self.config.converge_after;
        Ok(RunUpdate {
            centroids: self
                .config
                .centroids_override
                .clone()
                .unwrap_or_else(|| session.centroids.clone()),
            labels: self
                .config
                .labels_override
                .clone()
                .unwrap_or_else(|| Self::assignments(session.n_points, session.n_clusters)),
        })
    }

    async fn reset(&self) -> Result<()> {
        self.reset_calls.fetch_add(1, Ordering::Relaxed);
        *self.session.lock() = None;
        Ok(())
    }
}
