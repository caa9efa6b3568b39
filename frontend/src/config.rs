use once_cell::sync::Lazy;

pub const INDEX_PAGE: &str = "/index.html";
pub const LOGIN_PAGE: &str = "/login.html";
pub const UPLOAD_PAGE: &str = "/upload.html";
pub const ANALYSIS_PAGE: &str = "/receipt-analysis.html";
pub const ANALYTICS_PAGE: &str = "/analytics.html";

const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Settings baked into the bundle at build time.
///
/// The browser has no process environment, so values come from `option_env!`
/// when the WASM bundle is compiled and fall back to defaults otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Prefix for backend endpoints. Empty means same-origin relative paths.
    pub api_base_url: String,
    /// Largest receipt image accepted before any request is made.
    pub max_upload_bytes: u64,
    pub log_level: log::Level,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_level: log::Level::Info,
        }
    }
}

impl AppConfig {
    pub fn from_build_env() -> Self {
        Self::from_values(
            option_env!("RECEIPT_API_BASE_URL"),
            option_env!("RECEIPT_MAX_UPLOAD_BYTES"),
            option_env!("RECEIPT_LOG_LEVEL"),
        )
    }

    fn from_values(base_url: Option<&str>, max_bytes: Option<&str>, level: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            max_upload_bytes: max_bytes
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            log_level: level
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or(defaults.log_level),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }
}

static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_build_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}
