use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

const DEV_UPSTREAM: &str = "http://localhost:8080";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub environment: Environment,
    pub upstream: UpstreamConfig,
    pub session: SessionConfig,
    pub routes: RouteConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base origin of the case-management API, without a trailing slash
    pub base_url: String,
    /// Credential used when a request carries no session cookie
    #[serde(skip_serializing)]
    pub default_key: Option<String>,
    /// Path (and query) probed with a candidate key at login
    pub probe_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub max_age_days: i64,
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    pub proxy_prefix: String,
    pub protected_prefix: String,
    pub login_path: String,
    pub logout_path: String,
    pub default_next: String,
    pub public_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub max_request_size_bytes: usize,
    pub proxy_cors: bool,
    pub ui_dir: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("UPSTREAM_API_ORIGIN must be set in {0:?}")]
    MissingUpstream(Environment),

    #[error("invalid upstream URL '{url}': {reason}")]
    InvalidUpstream { url: String, reason: String },

    #[error("{name} must be an absolute path starting with '/', got '{value}'")]
    InvalidPrefix { name: &'static str, value: String },
}

impl GatewayConfig {
    /// Build the configuration once from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Presets first, then specific env vars on top
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides();

        config.validated()
    }

    /// Development preset pointed at an explicit upstream, used by tests and embedders.
    pub fn for_upstream(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let mut config = Self::development();
        config.upstream.base_url = base_url.into();
        config.validated()
    }

    fn with_env_overrides(mut self) -> Self {
        // Upstream overrides
        if let Some(v) = non_empty_var("UPSTREAM_API_ORIGIN").or_else(|| non_empty_var("API_ORIGIN")) {
            self.upstream.base_url = v;
        }
        if let Some(v) = non_empty_var("GATEWAY_DEFAULT_ADMIN_KEY") {
            self.upstream.default_key = Some(v);
        }
        if let Some(v) = non_empty_var("GATEWAY_PROBE_PATH") {
            self.upstream.probe_path = v;
        }

        // Session overrides
        if let Some(v) = non_empty_var("SESSION_COOKIE_NAME") {
            self.session.cookie_name = v;
        }
        if let Ok(v) = env::var("SESSION_MAX_AGE_DAYS") {
            self.session.max_age_days = v.parse().unwrap_or(self.session.max_age_days);
        }
        if let Ok(v) = env::var("SESSION_COOKIE_SECURE") {
            self.session.secure = v.parse().unwrap_or(self.session.secure);
        }

        // Route overrides
        if let Some(v) = non_empty_var("GATEWAY_PROXY_PREFIX") {
            self.routes.proxy_prefix = v;
        }
        if let Some(v) = non_empty_var("GATEWAY_PROTECTED_PREFIX") {
            self.routes.protected_prefix = v;
        }
        if let Some(v) = non_empty_var("GATEWAY_LOGIN_PATH") {
            self.routes.login_path = v;
        }
        if let Some(v) = non_empty_var("GATEWAY_LOGOUT_PATH") {
            self.routes.logout_path = v;
        }
        if let Some(v) = non_empty_var("GATEWAY_DEFAULT_NEXT") {
            self.routes.default_next = v;
        }
        if let Ok(v) = env::var("GATEWAY_PUBLIC_PREFIXES") {
            self.routes.public_prefixes = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // API overrides
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Ok(v) = env::var("GATEWAY_PROXY_CORS") {
            self.api.proxy_cors = v.parse().unwrap_or(self.api.proxy_cors);
        }
        if let Some(v) = non_empty_var("GATEWAY_UI_DIR") {
            self.api.ui_dir = Some(PathBuf::from(v));
        }

        self
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        if self.upstream.base_url.is_empty() {
            return Err(ConfigError::MissingUpstream(self.environment));
        }

        let parsed = Url::parse(&self.upstream.base_url).map_err(|e| ConfigError::InvalidUpstream {
            url: self.upstream.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUpstream {
                url: self.upstream.base_url.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(ConfigError::InvalidUpstream {
                url: self.upstream.base_url.clone(),
                reason: "base URL must not carry a query or fragment".to_string(),
            });
        }
        self.upstream.base_url = self.upstream.base_url.trim_end_matches('/').to_string();

        if !self.upstream.probe_path.starts_with('/') {
            self.upstream.probe_path = format!("/{}", self.upstream.probe_path);
        }

        self.routes.proxy_prefix = normalize_prefix("GATEWAY_PROXY_PREFIX", &self.routes.proxy_prefix)?;
        self.routes.protected_prefix =
            normalize_prefix("GATEWAY_PROTECTED_PREFIX", &self.routes.protected_prefix)?;
        self.routes.login_path = normalize_prefix("GATEWAY_LOGIN_PATH", &self.routes.login_path)?;
        self.routes.logout_path = normalize_prefix("GATEWAY_LOGOUT_PATH", &self.routes.logout_path)?;

        Ok(self)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            upstream: UpstreamConfig {
                base_url: DEV_UPSTREAM.to_string(),
                default_key: None,
                probe_path: "/v1/admin/tasks?limit=1".to_string(),
            },
            session: SessionConfig {
                cookie_name: "admin_key".to_string(),
                max_age_days: 30,
                secure: false,
            },
            routes: RouteConfig::default(),
            api: ApiConfig {
                max_request_size_bytes: 25 * 1024 * 1024, // 25MB
                proxy_cors: false,
                ui_dir: None,
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::production();
        config.environment = Environment::Staging;
        config
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            upstream: UpstreamConfig {
                // No built-in origin outside development
                base_url: String::new(),
                default_key: None,
                probe_path: "/v1/admin/tasks?limit=1".to_string(),
            },
            session: SessionConfig {
                cookie_name: "admin_key".to_string(),
                max_age_days: 30,
                secure: true,
            },
            routes: RouteConfig::default(),
            api: ApiConfig {
                max_request_size_bytes: 25 * 1024 * 1024,
                proxy_cors: false,
                ui_dir: None,
            },
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            proxy_prefix: "/admin-proxy".to_string(),
            protected_prefix: "/admin".to_string(),
            login_path: "/admin/login".to_string(),
            logout_path: "/admin/logout".to_string(),
            default_next: "/admin/inbox".to_string(),
            public_prefixes: vec![
                "/_next/".to_string(),
                "/static/".to_string(),
                "/assets/".to_string(),
                "/favicon.ico".to_string(),
            ],
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn normalize_prefix(name: &'static str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim_end_matches('/');
    if !trimmed.starts_with('/') || trimmed.contains(['?', '#', '*', ':']) {
        return Err(ConfigError::InvalidPrefix {
            name,
            value: value.to_string(),
        });
    }
    Ok(trimmed.to_string())
}
