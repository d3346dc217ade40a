//! Configuration module
//!
//! Nag checks read their settings from a JSON tools file that holds one
//! section per check:
//!
//! ```json
//! {
//!   "defectenhancementtask": {
//!     "confidence_threshold": 0.8,
//!     "reporter_blacklist": ["intermittent-bug-filer@mozilla.bugs"]
//!   }
//! }
//! ```
//!
//! The loaded section is passed explicitly to the check and the runner.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants;
use crate::error::{NagError, NagResult};

/// All tool sections of the tools file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ToolsConfig {
    tools: HashMap<String, serde_json::Value>,
}

impl ToolsConfig {
    /// Load the tools file from disk
    pub fn load(path: impl AsRef<Path>) -> NagResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            NagError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> NagResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Resolve the section for `tool` into a typed config
    pub fn nag_config(&self, tool: &str) -> NagResult<NagConfig> {
        let section = self
            .tools
            .get(tool)
            .cloned()
            .ok_or_else(|| NagError::Config(format!("no section for tool '{}'", tool)))?;
        let raw: RawNagConfig = serde_json::from_value(section)
            .map_err(|e| NagError::Config(format!("{}: {}", tool, e)))?;
        raw.validate(tool)
    }
}

/// Section as written in the file; every field optional so that the
/// required ones can be reported by name.
#[derive(Debug, Default, Deserialize)]
struct RawNagConfig {
    confidence_threshold: Option<f32>,
    #[serde(default)]
    reporter_blacklist: Vec<String>,
    days_lookup: Option<i64>,
    bz_query_timeout: Option<u64>,
    model_path: Option<PathBuf>,
    model_url: Option<String>,
    model_sha256: Option<String>,
}

impl RawNagConfig {
    fn validate(self, tool: &str) -> NagResult<NagConfig> {
        let confidence_threshold = self.confidence_threshold.ok_or_else(|| {
            NagError::Config(format!("{}: confidence_threshold is required", tool))
        })?;
        if !(0.0..=1.0).contains(&confidence_threshold) {
            return Err(NagError::Config(format!(
                "{}: confidence_threshold must be within [0, 1], got {}",
                tool, confidence_threshold
            )));
        }

        let days_lookup = self.days_lookup.unwrap_or(constants::DEFAULT_DAYS_LOOKUP);
        if days_lookup < 0 {
            return Err(NagError::Config(format!(
                "{}: days_lookup must not be negative, got {}",
                tool, days_lookup
            )));
        }

        Ok(NagConfig {
            confidence_threshold,
            reporter_blacklist: self.reporter_blacklist,
            days_lookup,
            bz_query_timeout: self
                .bz_query_timeout
                .unwrap_or(constants::DEFAULT_BZ_QUERY_TIMEOUT),
            model_path: self
                .model_path
                .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_MODEL_PATH)),
            model_url: self.model_url,
            model_sha256: self.model_sha256.map(|h| h.to_lowercase()),
        })
    }
}

/// Settings of one nag check
#[derive(Debug, Clone, PartialEq)]
pub struct NagConfig {
    /// Minimum top-class probability for a prediction to be reported
    pub confidence_threshold: f32,

    /// Reporters whose bugs are never looked at
    pub reporter_blacklist: Vec<String>,

    /// How far back from the run date to look for new bugs
    pub days_lookup: i64,

    /// Bugzilla query timeout in seconds
    pub bz_query_timeout: u64,

    /// Directory holding the model bundle
    pub model_path: PathBuf,

    /// Where to fetch the model bundle from when it is not on disk
    pub model_url: Option<String>,

    /// Expected SHA-256 of `model.onnx` (lowercase hex)
    pub model_sha256: Option<String>,
}

impl NagConfig {
    /// Config with the given threshold and every other field defaulted
    pub fn with_threshold(confidence_threshold: f32) -> Self {
        Self {
            confidence_threshold,
            reporter_blacklist: Vec::new(),
            days_lookup: constants::DEFAULT_DAYS_LOOKUP,
            bz_query_timeout: constants::DEFAULT_BZ_QUERY_TIMEOUT,
            model_path: PathBuf::from(constants::DEFAULT_MODEL_PATH),
            model_url: None,
            model_sha256: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_applied() {
        let tools = ToolsConfig::from_json(
            r#"{"defectenhancementtask": {"confidence_threshold": 0.8}}"#,
        )
        .unwrap();
        let config = tools.nag_config("defectenhancementtask").unwrap();

        assert_eq!(config.confidence_threshold, 0.8);
        assert!(config.reporter_blacklist.is_empty());
        assert_eq!(config.days_lookup, 7);
        assert_eq!(config.bz_query_timeout, 60);
        assert_eq!(config.model_path, PathBuf::from(constants::DEFAULT_MODEL_PATH));
        assert_eq!(config.model_url, None);
    }

    #[test]
    fn test_missing_threshold_fails_loudly() {
        let tools = ToolsConfig::from_json(
            r#"{"defectenhancementtask": {"reporter_blacklist": ["a@b.c"]}}"#,
        )
        .unwrap();
        let err = tools.nag_config("defectenhancementtask").unwrap_err();

        assert!(matches!(err, NagError::Config(_)));
        assert!(err.to_string().contains("confidence_threshold is required"));
    }

    #[test]
    fn test_threshold_out_of_range() {
        let tools = ToolsConfig::from_json(
            r#"{"defectenhancementtask": {"confidence_threshold": 1.5}}"#,
        )
        .unwrap();
        assert!(matches!(
            tools.nag_config("defectenhancementtask"),
            Err(NagError::Config(_))
        ));
    }

    #[test]
    fn test_missing_section() {
        let tools = ToolsConfig::from_json(r#"{"other": {}}"#).unwrap();
        let err = tools.nag_config("defectenhancementtask").unwrap_err();
        assert!(err.to_string().contains("no section"));
    }

    #[test]
    fn test_wrong_field_type_is_config_error() {
        let tools = ToolsConfig::from_json(
            r#"{"defectenhancementtask": {"confidence_threshold": 0.8, "reporter_blacklist": "a@b.c"}}"#,
        )
        .unwrap();
        assert!(matches!(
            tools.nag_config("defectenhancementtask"),
            Err(NagError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"defectenhancementtask": {{
                "confidence_threshold": 0.9,
                "reporter_blacklist": ["bot@mozilla.org", "filer@mozilla.bugs"],
                "days_lookup": 3,
                "model_sha256": "ABCDEF"
            }}}}"#
        )
        .unwrap();

        let config = ToolsConfig::load(file.path())
            .unwrap()
            .nag_config("defectenhancementtask")
            .unwrap();

        assert_eq!(config.reporter_blacklist, vec!["bot@mozilla.org", "filer@mozilla.bugs"]);
        assert_eq!(config.days_lookup, 3);
        assert_eq!(config.model_sha256.as_deref(), Some("abcdef"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ToolsConfig::load("/nonexistent/tools.json").unwrap_err();
        assert!(matches!(err, NagError::Config(_)));
    }
}
