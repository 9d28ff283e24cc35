use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// Pause between the end of one cycle and the start of the next.
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    /// Samples kept per history series.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Bound on a single push to one observer; slower observers are dropped.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
    /// Messages queued per observer before sends start waiting.
    #[serde(default = "default_observer_buffer")]
    pub observer_buffer: usize,
    /// How often to log app stats (observers, cycles, pruned) at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

fn default_sample_interval_ms() -> u64 {
    5000
}

fn default_history_capacity() -> usize {
    crate::history::DEFAULT_HISTORY_CAPACITY
}

fn default_send_timeout_ms() -> u64 {
    crate::broadcaster::DEFAULT_SEND_TIMEOUT.as_millis() as u64
}

fn default_observer_buffer() -> usize {
    16
}

fn default_stats_log_interval_secs() -> u64 {
    60
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval_ms(),
            history_capacity: default_history_capacity(),
            send_timeout_ms: default_send_timeout_ms(),
            observer_buffer: default_observer_buffer(),
            stats_log_interval_secs: default_stats_log_interval_secs(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            self.monitoring.sample_interval_ms > 0,
            "monitoring.sample_interval_ms must be > 0, got {}",
            self.monitoring.sample_interval_ms
        );
        anyhow::ensure!(
            self.monitoring.history_capacity > 0,
            "monitoring.history_capacity must be > 0, got {}",
            self.monitoring.history_capacity
        );
        anyhow::ensure!(
            self.monitoring.send_timeout_ms > 0,
            "monitoring.send_timeout_ms must be > 0, got {}",
            self.monitoring.send_timeout_ms
        );
        anyhow::ensure!(
            self.monitoring.observer_buffer > 0,
            "monitoring.observer_buffer must be > 0, got {}",
            self.monitoring.observer_buffer
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        Ok(())
    }
}
