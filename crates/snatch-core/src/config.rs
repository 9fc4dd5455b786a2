use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Hard cap on simultaneous connections used when the config does not override it.
pub const DEFAULT_MAX_CONNECTIONS: usize = 20;

/// Global configuration loaded from `~/.config/snatch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnatchConfig {
    /// Maximum simultaneous HTTP connections for one run. Excess segment fetches queue.
    pub max_connections: usize,
    /// Program used for concatenation (looked up on PATH when not absolute).
    pub tool_program: String,
    /// Seconds allowed for the TCP/TLS connect phase of each segment request.
    pub connect_timeout_secs: u64,
    /// Abort a transfer whose throughput stays below this many bytes/s ...
    pub low_speed_limit_bytes: u32,
    /// ... for this many seconds.
    pub low_speed_time_secs: u64,
    /// Optional hard wall-clock limit per segment request (None = no limit).
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for SnatchConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            tool_program: "ffmpeg".to_string(),
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            request_timeout_secs: None,
        }
    }
}

impl SnatchConfig {
    /// Transfer settings handed to the fetcher for every segment request.
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            max_connections: self.max_connections.max(1),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            low_speed_limit: self.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(self.low_speed_time_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Per-run transfer options derived from [`SnatchConfig`].
#[derive(Debug, Clone, Copy)]
pub struct FetchSettings {
    pub max_connections: usize,
    pub connect_timeout: Duration,
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    pub request_timeout: Option<Duration>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        SnatchConfig::default().fetch_settings()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("snatch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SnatchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SnatchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SnatchConfig = toml::from_str(&data)?;
    Ok(cfg)
}
