use serde::Deserialize;

/// Connection settings for the recognition backend.
///
/// Loaded from defaults, then an optional TOML file, then `FACEDESK_*`
/// environment variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server origin, e.g. `http://127.0.0.1:8000`.
    pub base_url: String,
    /// Path prefix of the JSON API (default: `/api`).
    pub api_prefix: String,
    /// Path prefix of the stored-image route (default: `/images`, served from the root).
    pub images_prefix: String,
    pub user_agent: String,
    /// Delay between `rebuild_status` polls while waiting for a rebuild.
    pub rebuild_poll_interval_ms: u64,
    /// Maximum number of `rebuild_status` polls before giving up.
    pub rebuild_poll_max: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            api_prefix: "/api".to_string(),
            images_prefix: "/images".to_string(),
            user_agent: concat!("facedesk/", env!("CARGO_PKG_VERSION")).to_string(),
            rebuild_poll_interval_ms: 1000,
            rebuild_poll_max: 120,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by the environment.
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Override fields from `FACEDESK_*` environment variables that are set and parse.
    pub fn with_env(self) -> Self {
        Self {
            base_url: env_string("FACEDESK_BASE_URL", self.base_url),
            api_prefix: env_string("FACEDESK_API_PREFIX", self.api_prefix),
            images_prefix: env_string("FACEDESK_IMAGES_PREFIX", self.images_prefix),
            user_agent: env_string("FACEDESK_USER_AGENT", self.user_agent),
            rebuild_poll_interval_ms: env_parse(
                "FACEDESK_REBUILD_POLL_INTERVAL_MS",
                self.rebuild_poll_interval_ms,
            ),
            rebuild_poll_max: env_parse("FACEDESK_REBUILD_POLL_MAX", self.rebuild_poll_max),
        }
    }
}

fn env_string(key: &str, default: String) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.images_prefix, "/images");
        assert!(config.user_agent.starts_with("facedesk/"));
    }

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        assert_eq!(env_parse("FACEDESK_TEST_UNSET_VARIABLE", 7u32), 7);
    }
}
