use crate::components::rotation::DisplayMode;
use crate::error::{config_error, env_error, SignageResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Maximum number of events kept for display
pub const DEFAULT_EVENT_LIMIT: usize = 6;

/// Default seconds each slide stays on screen
pub const DEFAULT_ROTATION_PERIOD_SECS: u64 = 10;

/// Default seconds between upstream refreshes
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3600;

/// Default bound on the outbound request
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Default number of slides shown side by side in multi mode
pub const DEFAULT_MULTI_COUNT: usize = 3;

/// Default description length on a slide
pub const DEFAULT_DESCRIPTION_MAX_CHARS: usize = 500;

/// Organizational prefixes stripped from titles unless overridden
pub const DEFAULT_TITLE_PREFIXES: [&str; 2] = ["Newhouse School | ", "Newhouse | "];

/// Where the enable map for components is read from
pub const COMPONENTS_FILE: &str = "config/components.toml";

/// Where the last-known-good event list is kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    /// Process memory, lost on restart
    Memory,
    /// JSON file on local disk
    File(PathBuf),
    /// Redis server at the given URL
    Redis(String),
}

/// Main configuration structure for the service
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream calendar endpoint
    pub events_api_url: Url,
    /// Maximum number of events selected for display
    pub event_limit: usize,
    /// Bound on the outbound fetch
    pub fetch_timeout: Duration,
    /// Period between refreshes of the event list
    pub refresh_interval: Duration,
    /// Period between slide advances
    pub rotation_period: Duration,
    /// Initial layout of the display
    pub display_mode: DisplayMode,
    /// Cache backend for the last-known-good list
    pub cache_backend: CacheBackend,
    /// Timezone used to format start times
    pub timezone: Tz,
    /// Title prefixes stripped for display
    pub title_prefixes: Vec<String>,
    /// Description truncation length
    pub description_max_chars: usize,
    /// Optional TOML file overriding the room directory
    pub rooms_file: Option<PathBuf>,
    /// Address the HTTP server binds to
    pub bind_addr: IpAddr,
    /// Port the HTTP server listens on
    pub port: u16,
    /// Map of component names to their enabled status
    pub components: HashMap<String, bool>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> SignageResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Self::from_lookup(|key| env::var(key).ok())?;

        // Load components configuration from file if it exists
        if let Ok(content) = fs::read_to_string(COMPONENTS_FILE) {
            let file_components = toml::from_str::<HashMap<String, bool>>(&content)?;
            config.components.extend(file_components);
        }

        Ok(config)
    }

    /// Build configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> SignageResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // The only required setting
        let raw_url = get("EVENTS_API_URL").ok_or_else(|| env_error("EVENTS_API_URL"))?;
        let events_api_url = Url::parse(raw_url.trim())
            .map_err(|e| config_error(&format!("Invalid EVENTS_API_URL: {}", e)))?;

        let event_limit = parse_or(&get, "EVENT_LIMIT", DEFAULT_EVENT_LIMIT)?;
        let fetch_timeout =
            Duration::from_secs(parse_or(&get, "FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?);
        let refresh_interval = Duration::from_secs(parse_or(
            &get,
            "REFRESH_INTERVAL_SECS",
            DEFAULT_REFRESH_INTERVAL_SECS,
        )?);
        let rotation_period = Duration::from_secs(parse_or(
            &get,
            "ROTATION_PERIOD_SECS",
            DEFAULT_ROTATION_PERIOD_SECS,
        )?);
        if rotation_period.is_zero() || refresh_interval.is_zero() {
            return Err(config_error("Periods must be at least one second"));
        }

        let multi_count = parse_or(&get, "DISPLAY_MULTI_COUNT", DEFAULT_MULTI_COUNT)?;
        let display_mode = match get("DISPLAY_MODE").as_deref().map(str::trim) {
            None | Some("single") | Some("portrait") => DisplayMode::Single,
            Some("multi") | Some("landscape") => DisplayMode::multi(multi_count),
            Some(other) => {
                return Err(config_error(&format!("Invalid DISPLAY_MODE value: {}", other)))
            }
        };

        let cache_backend = match get("CACHE_BACKEND").as_deref().map(str::trim) {
            None | Some("memory") => CacheBackend::Memory,
            Some("file") => CacheBackend::File(PathBuf::from(
                get("CACHE_PATH").unwrap_or_else(|| "./cache/events.json".to_string()),
            )),
            Some("redis") => CacheBackend::Redis(
                get("REDIS_URL").unwrap_or_else(|| "redis://127.0.0.1:6379".to_string()),
            ),
            Some(other) => {
                return Err(config_error(&format!("Invalid CACHE_BACKEND value: {}", other)))
            }
        };

        let timezone_name = get("TIMEZONE").unwrap_or_else(|| "America/New_York".to_string());
        let timezone = Tz::from_str(timezone_name.trim())
            .map_err(|_| config_error(&format!("Invalid TIMEZONE value: {}", timezone_name)))?;

        let title_prefixes = match get("TITLE_PREFIXES") {
            Some(raw) => raw
                .split(';')
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_TITLE_PREFIXES.iter().map(|p| p.to_string()).collect(),
        };

        let description_max_chars =
            parse_or(&get, "DESCRIPTION_MAX_CHARS", DEFAULT_DESCRIPTION_MAX_CHARS)?;
        let rooms_file = get("ROOMS_FILE").map(PathBuf::from);
        let bind_addr = parse_or(&get, "BIND_ADDR", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_or(&get, "PORT", 3000u16)?;

        // Initialize default components
        let mut components = HashMap::new();
        components.insert("events_feed".to_string(), true);

        Ok(Config {
            events_api_url,
            event_limit,
            fetch_timeout,
            refresh_interval,
            rotation_period,
            display_mode,
            cache_backend,
            timezone,
            title_prefixes,
            description_max_chars,
            rooms_file,
            bind_addr,
            port,
            components,
        })
    }

    /// Check if a component is enabled
    pub fn is_component_enabled(&self, name: &str) -> bool {
        *self.components.get(name).unwrap_or(&false)
    }
}

/// Parse an optional variable, falling back to a default when unset
fn parse_or<T, G>(get: &G, key: &str, default: T) -> SignageResult<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| config_error(&format!("Invalid {} value: {}", key, raw))),
        None => Ok(default),
    }
}
