use std::time::Duration;

/// Timeouts for outbound calls and database access
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Whole request to the metadata webservice, including body download
    pub http_request: Duration,

    /// TCP connect to the metadata webservice
    pub http_connect: Duration,

    /// Waiting for a pooled database connection
    pub db_acquire: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        GLOBAL_TIMEOUT_CONFIG.clone()
    }
}

impl TimeoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the global timeout configuration
    pub fn global() -> &'static Self {
        &GLOBAL_TIMEOUT_CONFIG
    }
}

static GLOBAL_TIMEOUT_CONFIG: TimeoutConfig = TimeoutConfig {
    http_request: Duration::from_secs(30),
    http_connect: Duration::from_secs(10),
    db_acquire: Duration::from_secs(10),
};
