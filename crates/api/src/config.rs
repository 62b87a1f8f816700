use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. In production,
/// override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT verification settings.
    pub jwt: JwtConfig,
    /// Site, kernel and feature settings.
    pub site: SiteConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            site: SiteConfig::from_env(),
        }
    }
}

/// Kernel base URL used when no override is set.
pub const DEFAULT_KERNEL_BASE_URL: &str = "http://localhost:8000";

/// Env vars naming the kernel base URL, highest priority first.
pub const KERNEL_BASE_URL_VARS: [&str; 3] =
    ["SHARAYEH_API_BASE", "NEXT_PUBLIC_API_BASE", "NEXT_PUBLIC_API_URL"];

/// Site-level settings: kernel location, uploads, feature flags, locale
/// cookie and job tracking intervals.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub kernel_base_url: String,
    /// Sent to the kernel as a bearer token when set.
    pub kernel_api_key: Option<String>,
    /// Public origin of the site, used in page-shell responses.
    pub site_url: String,
    pub max_upload_mb: u64,
    pub feature_dubbing: bool,
    pub feature_uploads: bool,
    /// Cookie that remembers the visitor's locale.
    pub locale_cookie: String,
    pub job_poll_interval_ms: u64,
    /// `0` disables the background mirror sync.
    pub mirror_sync_interval_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            kernel_base_url: DEFAULT_KERNEL_BASE_URL.to_string(),
            kernel_api_key: None,
            site_url: "http://localhost:3000".to_string(),
            max_upload_mb: sharayeh_core::validation::DEFAULT_MAX_UPLOAD_MB,
            feature_dubbing: true,
            feature_uploads: true,
            locale_cookie: "NEXT_LOCALE".to_string(),
            job_poll_interval_ms: 2000,
            mirror_sync_interval_secs: 60,
        }
    }
}

impl SiteConfig {
    /// Load from the process environment.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `SHARAYEH_API_BASE` (etc.)   | `http://localhost:8000` |
    /// | `KERNEL_API_KEY`             | unset                   |
    /// | `NEXT_PUBLIC_SITE_URL`       | `http://localhost:3000` |
    /// | `MAX_UPLOAD_MB`              | `25`                    |
    /// | `FEATURE_DUBBING`            | `true`                  |
    /// | `FEATURE_UPLOADS`            | `true`                  |
    /// | `LOCALE_COOKIE`              | `NEXT_LOCALE`           |
    /// | `JOB_POLL_INTERVAL_MS`       | `2000`                  |
    /// | `MIRROR_SYNC_INTERVAL_SECS`  | `60`                    |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    ///
    /// # Panics
    ///
    /// Panics if a numeric or boolean variable does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let kernel_base_url = KERNEL_BASE_URL_VARS
            .iter()
            .find_map(|&key| get(key))
            .unwrap_or(defaults.kernel_base_url);

        let number = |key: &str, default: u64| -> u64 {
            get(key).map_or(default, |v| {
                v.parse()
                    .unwrap_or_else(|_| panic!("{key} must be a valid u64"))
            })
        };
        let flag = |key: &str, default: bool| -> bool {
            get(key).map_or(default, |v| match v.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => panic!("{key} must be a boolean"),
            })
        };

        Self {
            kernel_base_url,
            kernel_api_key: get("KERNEL_API_KEY"),
            site_url: get("NEXT_PUBLIC_SITE_URL").unwrap_or(defaults.site_url),
            max_upload_mb: number("MAX_UPLOAD_MB", defaults.max_upload_mb),
            feature_dubbing: flag("FEATURE_DUBBING", defaults.feature_dubbing),
            feature_uploads: flag("FEATURE_UPLOADS", defaults.feature_uploads),
            locale_cookie: get("LOCALE_COOKIE").unwrap_or(defaults.locale_cookie),
            job_poll_interval_ms: number("JOB_POLL_INTERVAL_MS", defaults.job_poll_interval_ms),
            mirror_sync_interval_secs: number(
                "MIRROR_SYNC_INTERVAL_SECS",
                defaults.mirror_sync_interval_secs,
            ),
        }
    }
}
