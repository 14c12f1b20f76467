use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Self::Development => "debug",
            Self::Production => "info",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Listener
    pub bind_address: String,
    pub port: u16,
    pub environment: Environment,

    // Upstream query
    pub steam_api_key: String,
    pub upstream_url: String,
    pub upstream_app_id: u32,
    pub upstream_tag: String,
    pub upstream_limit: u32,
    pub upstream_timeout_secs: u64,

    // Cache
    pub cache_ttl_secs: u64,

    // Other configs
    pub region_rules_path: Option<String>,
    pub join_url_template: String,
}

pub const DEFAULT_UPSTREAM_URL: &str =
    "https://api.steampowered.com/IGameServersService/GetServerList/v1/";
pub const DEFAULT_JOIN_URL_TEMPLATE: &str = "steam://connect/{address}/?appid=440";

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            environment: Environment::Development,
            steam_api_key: String::new(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            upstream_app_id: 440, // TF2
            upstream_tag: "truequickplay".to_string(),
            upstream_limit: 100,
            upstream_timeout_secs: 10,
            cache_ttl_secs: 300, // 5 minutes
            region_rules_path: None,
            join_url_template: DEFAULT_JOIN_URL_TEMPLATE.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),

            environment: env::var("NODE_ENV")
                .or_else(|_| env::var("APP_ENV"))
                .map(|v| Environment::parse(&v))
                .unwrap_or(defaults.environment),

            steam_api_key: env::var("STEAM_API_KEY").unwrap_or(defaults.steam_api_key),

            upstream_url: env::var("UPSTREAM_URL").unwrap_or(defaults.upstream_url),

            upstream_app_id: env::var("UPSTREAM_APP_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.upstream_app_id),

            upstream_tag: env::var("UPSTREAM_TAG").unwrap_or(defaults.upstream_tag),

            upstream_limit: env::var("UPSTREAM_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.upstream_limit),

            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.upstream_timeout_secs),

            cache_ttl_secs: env::var("CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl_secs),

            region_rules_path: env::var("REGION_RULES_PATH").ok().filter(|p| !p.is_empty()),

            join_url_template: env::var("JOIN_URL_TEMPLATE")
                .unwrap_or(defaults.join_url_template),
        }
    }

    pub fn bind(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}
