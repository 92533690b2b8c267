use std::{collections::HashMap, time::Duration};

use serde::{Deserialize, Serialize};

/// Environment variable that overrides the default node URL.
pub const URL_ENV_VAR: &str = "ZKSYNC_WEB3_API_URL";

/// Node URL that is used when none is configured.
pub const DEFAULT_URL: &str = "http://localhost:3050";

/// Default interval between poll cycles.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_millis(500);

/// Default maximum number of blocks a filter watch queries at once, beyond
/// the head itself.
pub const DEFAULT_MAX_FILTER_BLOCK_RANGE: u64 = 10;

/// Default capacity of the event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Configuration of an [`crate::OlaProvider`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// URL of the node's JSON-RPC endpoint
    #[serde(default = "default_url")]
    pub url: String,
    /// Interval between poll cycles
    #[serde(default = "default_polling_interval", with = "millis")]
    pub polling_interval: Duration,
    /// Maximum number of blocks a filter watch queries at once, beyond the
    /// head itself
    #[serde(default = "default_max_filter_block_range")]
    pub max_filter_block_range: u64,
    /// Capacity of the event channel. Slow subscribers lag behind and miss
    /// events once it is exceeded.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    /// Extra HTTP headers sent with every request
    #[serde(default)]
    pub extra_headers: HashMap<String, String>,
}

impl ProviderConfig {
    /// Creates a configuration with the URL taken from the environment.
    pub fn from_env() -> Self {
        Self {
            url: default_url(),
            ..Self::default()
        }
    }

    /// Creates a configuration for the provided URL.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Time budget for fetching the chain head during a poll cycle.
    pub fn head_fetch_timeout(&self) -> Duration {
        Duration::from_millis(100) + self.polling_interval / 2
    }

    /// Maximum age of a cached chain head that is reused when counting
    /// confirmations.
    pub fn head_max_age(&self) -> Duration {
        Duration::from_millis(100) + self.polling_interval * 2
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            polling_interval: DEFAULT_POLLING_INTERVAL,
            max_filter_block_range: DEFAULT_MAX_FILTER_BLOCK_RANGE,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            extra_headers: HashMap::new(),
        }
    }
}

/// Returns the node URL from [`URL_ENV_VAR`], or [`DEFAULT_URL`] if it is
/// unset or empty.
pub fn default_url() -> String {
    std::env::var(URL_ENV_VAR)
        .ok()
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_URL.to_string())
}

fn default_polling_interval() -> Duration {
    DEFAULT_POLLING_INTERVAL
}

fn default_max_filter_block_range() -> u64 {
    DEFAULT_MAX_FILTER_BLOCK_RANGE
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
