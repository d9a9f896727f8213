use serde::Deserialize;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub docker: DockerConfig,
    pub collector: CollectorSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Unix socket path. Unset: bollard defaults (`DOCKER_HOST`, then /var/run/docker.sock).
    pub socket: Option<String>,
    pub timeout_secs: u64,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            socket: None,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectorSettings {
    /// Max containers whose stats are fetched at the same time.
    pub max_concurrency: usize,
    /// Upper bound for one whole /docker-stats collection.
    pub request_timeout_ms: u64,
    /// Reuse a finished collection for this long; 0 disables the cache.
    pub cache_ttl_ms: u64,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            request_timeout_ms: 30_000,
            cache_ttl_ms: 0,
        }
    }
}

impl CollectorSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

impl AppConfig {
    /// Load from `CONFIG_FILE` (default `config.toml`). A missing default file
    /// means built-in defaults; a missing explicitly named file is an error.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("CONFIG_FILE") {
            Ok(path) => Self::load_from_path(&path),
            Err(_) if std::path::Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load_from_path(DEFAULT_CONFIG_FILE)
            }
            Err(_) => {
                tracing::info!("{} not found, using default config", DEFAULT_CONFIG_FILE);
                Self::load_from_str("")
            }
        }
    }

    fn load_from_path(path: &str) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path, e))?;
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
            self.docker.socket.as_deref() != Some(""),
            "docker.socket must be non-empty when set"
        );
        anyhow::ensure!(
            self.docker.timeout_secs > 0,
            "docker.timeout_secs must be > 0, got {}",
            self.docker.timeout_secs
        );
        anyhow::ensure!(
            self.collector.max_concurrency > 0,
            "collector.max_concurrency must be > 0, got {}",
            self.collector.max_concurrency
        );
        anyhow::ensure!(
            self.collector.request_timeout_ms > 0,
            "collector.request_timeout_ms must be > 0, got {}",
            self.collector.request_timeout_ms
        );
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
