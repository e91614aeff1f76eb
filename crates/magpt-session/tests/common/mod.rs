//! Scripted backend shared by the session tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use magpt_api::{
    ApiClient, ApiError, GenerateRequest, GenerateResponse, GenerationMetrics, HealthStatus,
    ModelCatalog, ModelEntry, Result, StatusCode,
};
use magpt_config::{MemoryStorage, PreferenceStore, Preferences};
use magpt_session::{ChatSession, EventSink, TokioScheduler, UiEvent};
use parking_lot::Mutex;
use tokio::sync::{mpsc, Notify};

/// How `/health` answers
#[derive(Debug, Clone)]
pub enum HealthReply {
    Up(&'static str),
    /// Answers after the delay
    Slow(Duration, &'static str),
    Status(u16),
    Refused,
    /// Never answers
    Hang,
}

/// How `/generate` answers
#[derive(Debug, Clone)]
pub enum GenerateReply {
    Text(&'static str),
    /// Waits for `MockApi::release` before answering
    Gated(&'static str),
    Status(u16, Option<&'static str>),
    Refused,
}

#[derive(Debug, Clone)]
pub enum MetricsReply {
    Figures(GenerationMetrics),
    Unavailable,
    Refused,
}

pub struct MockApi {
    health: Mutex<VecDeque<HealthReply>>,
    health_default: Mutex<HealthReply>,
    generate: Mutex<GenerateReply>,
    metrics: Mutex<MetricsReply>,
    catalog: Mutex<Option<ModelCatalog>>,
    gate: Notify,
    pub health_calls: AtomicUsize,
    pub generate_calls: AtomicUsize,
    pub metrics_calls: AtomicUsize,
    pub last_request: Mutex<Option<GenerateRequest>>,
}

impl MockApi {
    pub fn new(health: HealthReply) -> Arc<Self> {
        Arc::new(Self {
            health: Mutex::new(VecDeque::new()),
            health_default: Mutex::new(health),
            generate: Mutex::new(GenerateReply::Text("Hi there")),
            metrics: Mutex::new(MetricsReply::Figures(sample_metrics())),
            catalog: Mutex::new(None),
            gate: Notify::new(),
            health_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
            metrics_calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    /// Answer the next probes with `replies`, then fall back to the default
    pub fn queue_health(&self, replies: impl IntoIterator<Item = HealthReply>) {
        self.health.lock().extend(replies);
    }

    pub fn set_health(&self, reply: HealthReply) {
        *self.health_default.lock() = reply;
    }

    pub fn set_generate(&self, reply: GenerateReply) {
        *self.generate.lock() = reply;
    }

    pub fn set_metrics(&self, reply: MetricsReply) {
        *self.metrics.lock() = reply;
    }

    pub fn set_catalog(&self, catalog: ModelCatalog) {
        *self.catalog.lock() = Some(catalog);
    }

    /// Let one gated generation finish
    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }
}

fn refused() -> ApiError {
    ApiError::Network("error sending request: connection refused".to_string())
}

fn status(code: u16, detail: Option<&str>) -> ApiError {
    ApiError::Status {
        status: StatusCode::from_u16(code).unwrap(),
        detail: detail.map(str::to_string),
    }
}

#[async_trait]
impl ApiClient for MockApi {
    async fn health(&self) -> Result<HealthStatus> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .health
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.health_default.lock().clone());

        match reply {
            HealthReply::Up(device) => Ok(HealthStatus {
                device: device.to_string(),
            }),
            HealthReply::Slow(delay, device) => {
                tokio::time::sleep(delay).await;
                Ok(HealthStatus {
                    device: device.to_string(),
                })
            }
            HealthReply::Status(code) => Err(status(code, None)),
            HealthReply::Refused => Err(refused()),
            HealthReply::Hang => std::future::pending::<Result<HealthStatus>>().await,
        }
    }

    async fn list_models(&self) -> Result<Option<ModelCatalog>> {
        Ok(self.catalog.lock().clone())
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some(request.clone());
        let reply = self.generate.lock().clone();

        match reply {
            GenerateReply::Text(text) => Ok(GenerateResponse {
                generated_text: text.to_string(),
            }),
            GenerateReply::Gated(text) => {
                self.gate.notified().await;
                Ok(GenerateResponse {
                    generated_text: text.to_string(),
                })
            }
            GenerateReply::Status(code, detail) => Err(status(code, detail)),
            GenerateReply::Refused => Err(refused()),
        }
    }

    async fn metrics(&self) -> Result<Option<GenerationMetrics>> {
        self.metrics_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.metrics.lock().clone();
        match reply {
            MetricsReply::Figures(metrics) => Ok(Some(metrics)),
            MetricsReply::Unavailable => Ok(None),
            MetricsReply::Refused => Err(refused()),
        }
    }
}

pub fn sample_metrics() -> GenerationMetrics {
    GenerationMetrics {
        tokens_per_second: 12.5,
        last_latency_seconds: 0.8,
        total_generated_tokens: 340,
        active_model_id: "syr-small".to_string(),
    }
}

pub fn sample_catalog() -> ModelCatalog {
    let mut catalog = ModelCatalog {
        active: Some("syr-small".to_string()),
        ..ModelCatalog::default()
    };
    catalog.models.insert(
        "syr-small".to_string(),
        ModelEntry {
            description: Some("Small model".to_string()),
            disabled: false,
        },
    );
    catalog.models.insert(
        "syr-large".to_string(),
        ModelEntry {
            description: Some("Large model".to_string()),
            disabled: true,
        },
    );
    catalog
}

pub fn store() -> Arc<PreferenceStore> {
    Arc::new(PreferenceStore::with_preferences(
        Arc::new(MemoryStorage::new()),
        Preferences::default(),
    ))
}

pub struct Harness {
    pub api: Arc<MockApi>,
    pub prefs: Arc<PreferenceStore>,
    pub session: ChatSession,
    pub events: mpsc::UnboundedReceiver<UiEvent>,
}

impl Harness {
    pub fn new(api: Arc<MockApi>) -> Self {
        let prefs = store();
        let (sink, events) = EventSink::channel();
        let session = ChatSession::new(
            prefs.clone(),
            api.clone(),
            Arc::new(TokioScheduler::new()),
            sink,
        );
        Self {
            api,
            prefs,
            session,
            events,
        }
    }

    /// Harness whose monitor has already seen the backend up
    pub async fn connected() -> Self {
        let harness = Self::new(MockApi::new(HealthReply::Up("cpu")));
        harness.session.monitor.check_connection().await;
        harness
    }

    pub fn drain(&mut self) -> Vec<UiEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }
}

/// Let spawned tasks run without moving the clock
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
