//! Central Configuration Constants
//!
//! Single source of truth for the defaults used by the nag checks.
//! Environment variables override the endpoint defaults, the tools file
//! overrides everything else.

/// Default Bugzilla instance
pub const DEFAULT_BUGZILLA_URL: &str = "https://bugzilla.mozilla.org";

/// Default location of the per-tool configuration file
pub const DEFAULT_TOOLS_CONFIG: &str = "configs/tools.json";

/// Default number of days to look back from the run date
pub const DEFAULT_DAYS_LOOKUP: i64 = 7;

/// Default Bugzilla query timeout (seconds)
pub const DEFAULT_BZ_QUERY_TIMEOUT: u64 = 60;

/// Default directory holding `model.onnx` + `metadata.json`
pub const DEFAULT_MODEL_PATH: &str = "models/defectenhancementtaskmodel";

/// Most bug ids sent in one Bugzilla request, keeps URLs short of server limits
pub const BUGZILLA_CHUNK_SIZE: usize = 100;

/// Header carrying the Bugzilla API key
pub const BUGZILLA_API_KEY_HEADER: &str = "X-BUGZILLA-API-KEY";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Environment variable names
// ============================================

pub const ENV_BUGZILLA_URL: &str = "BUGZILLA_URL";
pub const ENV_BUGZILLA_API_KEY: &str = "BUGZILLA_API_KEY";
pub const ENV_TOOLS_CONFIG: &str = "AUTONAG_CONFIG";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get Bugzilla base URL from environment or use default
pub fn get_bugzilla_url() -> String {
    std::env::var(ENV_BUGZILLA_URL)
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| DEFAULT_BUGZILLA_URL.to_string())
}

/// Get Bugzilla API key from environment (anonymous access when unset)
pub fn get_bugzilla_api_key() -> Option<String> {
    std::env::var(ENV_BUGZILLA_API_KEY)
        .ok()
        .filter(|key| !key.is_empty())
}

/// Get tools config path from environment or use default
pub fn get_tools_config_path() -> String {
    std::env::var(ENV_TOOLS_CONFIG)
        .unwrap_or_else(|_| DEFAULT_TOOLS_CONFIG.to_string())
}
