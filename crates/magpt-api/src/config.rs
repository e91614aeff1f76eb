//! API client configuration

use std::time::Duration;

use magpt_config::{ClientSettings, DEFAULT_ORIGIN};

/// Hard limit for a health probe
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// API client configuration
///
/// Generation requests deliberately carry no timeout; every other call is
/// bounded.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Origin used when the preferences leave the API URL empty
    pub origin: String,

    /// Timeout for `/health`
    pub health_timeout: Duration,

    /// Timeout for `/models` and `/metrics`
    pub lookup_timeout: Duration,

    /// TCP connect timeout (applies to every call)
    pub connect_timeout: Duration,

    /// Custom user agent
    pub user_agent: String,

    /// Pool idle timeout
    pub pool_idle_timeout: Duration,

    /// TCP keep-alive interval
    pub tcp_keepalive: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            health_timeout: HEALTH_TIMEOUT,
            lookup_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            user_agent: format!("magpt/{}", env!("CARGO_PKG_VERSION")),
            pool_idle_timeout: Duration::from_secs(90),
            tcp_keepalive: Duration::from_secs(60),
        }
    }
}

impl ApiConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the API config from the process settings
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self {
            origin: settings.origin.clone(),
            connect_timeout: Duration::from_secs(settings.connect_timeout_secs.max(1)),
            ..Default::default()
        }
    }

    /// Set the same-origin fallback
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Set the health probe timeout
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    /// Set the timeout for model and metrics lookups
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
