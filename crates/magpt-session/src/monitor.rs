//! Connection monitoring and reconnection for the generation backend

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use magpt_api::{ApiClient, ApiError, HEALTH_TIMEOUT};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::events::{EventSink, UiEvent};
use crate::scheduler::{Scheduler, TaskFuture, TaskHandle};

/// Status text for a probe that hit the hard timeout
pub const TIMEOUT_MESSAGE: &str = "Connection timeout - API not responding";

/// Backend reachability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Snapshot of what the status area shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    /// Serving device reported by the last successful probe
    pub device: Option<String>,
    /// Cause of the last failed probe
    pub last_error: Option<String>,
    /// A probe is running
    pub checking: bool,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            device: None,
            last_error: None,
            checking: false,
        }
    }
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Text for the status indicator
    pub fn status_text(&self) -> String {
        match (&self.state, &self.last_error) {
            (ConnectionState::Connected, _) => {
                format!("Connected ({})", self.device.as_deref().unwrap_or("unknown"))
            }
            (ConnectionState::Disconnected, Some(cause)) => cause.clone(),
            (ConnectionState::Disconnected, None) => "Connecting...".to_string(),
        }
    }

    /// Whether the manual reconnect action is offered
    pub fn show_reconnect(&self) -> bool {
        !self.checking && self.state == ConnectionState::Disconnected && self.last_error.is_some()
    }
}

/// Human-readable cause of a failed probe
pub fn describe_failure(err: &ApiError) -> String {
    match err {
        ApiError::Timeout(_) => TIMEOUT_MESSAGE.to_string(),
        ApiError::Status { status, .. } => match status.canonical_reason() {
            Some(reason) => format!(
                "Connection error: Connection failed: {} {}",
                status.as_u16(),
                reason
            ),
            None => format!("Connection error: Connection failed: {}", status.as_u16()),
        },
        other => format!("Connection error: {}", other),
    }
}

/// Timing of probes, retries and polling
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Hard limit on one health probe
    pub health_timeout: Duration,
    /// Delay before the single retry after a failure
    pub retry_delay: Duration,
    /// Period of the background ticker
    pub poll_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            health_timeout: HEALTH_TIMEOUT,
            retry_delay: Duration::from_secs(10),
            poll_interval: Duration::from_secs(30),
        }
    }
}

#[derive(Default)]
struct MonitorState {
    status: ConnectionStatus,
    /// Start sequence of the probe whose result is shown
    applied: u64,
    in_flight: usize,
    retry: Option<TaskHandle>,
    ticker: Option<TaskHandle>,
}

struct MonitorInner {
    api: Arc<dyn ApiClient>,
    scheduler: Arc<dyn Scheduler>,
    events: EventSink,
    config: MonitorConfig,
    started: AtomicU64,
    state: Mutex<MonitorState>,
}

/// Tracks whether the backend is reachable
///
/// Cheap to clone; clones share state. Any number of checks may overlap
/// (ticker, retry, manual reconnect, send guard): each runs its own probe and
/// the result of the most recently started probe is the one that sticks.
#[derive(Clone)]
pub struct ConnectionMonitor {
    inner: Arc<MonitorInner>,
}

impl ConnectionMonitor {
    pub fn new(api: Arc<dyn ApiClient>, scheduler: Arc<dyn Scheduler>, events: EventSink) -> Self {
        Self::with_config(api, scheduler, events, MonitorConfig::default())
    }

    pub fn with_config(
        api: Arc<dyn ApiClient>,
        scheduler: Arc<dyn Scheduler>,
        events: EventSink,
        config: MonitorConfig,
    ) -> Self {
        Self {
            inner: Arc::new(MonitorInner {
                api,
                scheduler,
                events,
                config,
                started: AtomicU64::new(0),
                state: Mutex::new(MonitorState::default()),
            }),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.inner.state.lock().status.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.state.lock().status.is_connected()
    }

    /// Whether a retry is waiting to fire
    pub fn has_pending_retry(&self) -> bool {
        self.inner
            .state
            .lock()
            .retry
            .as_ref()
            .map(|handle| !handle.is_cancelled())
            .unwrap_or(false)
    }

    /// Probe `/health` and update the connection state
    ///
    /// Never fails: the outcome is recorded, published and returned.
    pub async fn check_connection(&self) -> ConnectionStatus {
        let seq = self.inner.started.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Checking connection (probe {})", seq);
        self.begin_probe();

        let timeout = self.inner.config.health_timeout;
        let outcome = match tokio::time::timeout(timeout, self.inner.api.health()).await {
            Ok(Ok(health)) => Ok(health.device),
            Ok(Err(err)) => Err(describe_failure(&err)),
            Err(_) => Err(TIMEOUT_MESSAGE.to_string()),
        };

        self.finish_probe(seq, outcome)
    }

    /// Manual reconnect: probe immediately
    pub async fn reconnect(&self) -> ConnectionStatus {
        info!("Manual reconnect requested");
        self.check_connection().await
    }

    /// Start a probe in the background
    pub fn request_check(&self) -> JoinHandle<ConnectionStatus> {
        let monitor = self.clone();
        tokio::spawn(async move { monitor.check_connection().await })
    }

    /// Start the background ticker that probes while disconnected
    pub fn start_polling(&self) {
        let monitor = self.clone();
        let period = self.inner.config.poll_interval;
        let handle = self.inner.scheduler.schedule_repeating(
            period,
            Box::new(move || -> TaskFuture {
                let monitor = monitor.clone();
                Box::pin(async move {
                    if !monitor.is_connected() {
                        debug!("Ticker probing disconnected backend");
                        monitor.check_connection().await;
                    }
                })
            }),
        );

        if let Some(previous) = self.inner.state.lock().ticker.replace(handle) {
            previous.cancel();
        }
    }

    /// Cancel the ticker and any pending retry
    pub fn shutdown(&self) {
        let mut state = self.inner.state.lock();
        if let Some(ticker) = state.ticker.take() {
            ticker.cancel();
        }
        if let Some(retry) = state.retry.take() {
            retry.cancel();
        }
    }

    fn begin_probe(&self) {
        let status = {
            let mut state = self.inner.state.lock();
            state.in_flight += 1;
            state.status.checking = true;
            state.status.clone()
        };
        self.inner.events.emit(UiEvent::StatusChanged(status));
    }

    fn finish_probe(&self, seq: u64, outcome: Result<String, String>) -> ConnectionStatus {
        let status = {
            let mut state = self.inner.state.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
            state.status.checking = state.in_flight > 0;

            if seq < state.applied {
                debug!("Discarding result of superseded probe {}", seq);
            } else {
                state.applied = seq;
                match outcome {
                    Ok(device) => {
                        info!("Connected to backend ({})", device);
                        state.status.state = ConnectionState::Connected;
                        state.status.device = Some(device);
                        state.status.last_error = None;
                        if let Some(retry) = state.retry.take() {
                            retry.cancel();
                        }
                    }
                    Err(cause) => {
                        error!("Backend unreachable: {}", cause);
                        state.status.state = ConnectionState::Disconnected;
                        state.status.last_error = Some(cause);
                        // Stored under the lock that applied the failure
                        self.schedule_retry(&mut state);
                    }
                }
            }

            state.status.clone()
        };

        self.inner.events.emit(UiEvent::StatusChanged(status.clone()));
        status
    }

    fn schedule_retry(&self, state: &mut MonitorState) {
        let monitor = self.clone();
        let delay = self.inner.config.retry_delay;
        debug!("Retrying connection in {:?}", delay);

        let handle = self.inner.scheduler.schedule(
            delay,
            Box::pin(async move {
                monitor.check_connection().await;
            }),
        );

        if let Some(previous) = state.retry.replace(handle) {
            previous.cancel();
        }
    }
}
