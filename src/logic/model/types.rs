//! Model Types
//!
//! Label set and model bundle metadata.
//! No inference logic here.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NagError;

// ============================================================================
// LABEL SET
// ============================================================================

/// Bug type, as declared on the bug or predicted by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BugType {
    Defect,
    Enhancement,
    Task,
}

impl BugType {
    pub const ALL: [BugType; 3] = [BugType::Defect, BugType::Enhancement, BugType::Task];

    pub fn as_str(&self) -> &'static str {
        match self {
            BugType::Defect => "defect",
            BugType::Enhancement => "enhancement",
            BugType::Task => "task",
        }
    }
}

impl std::fmt::Display for BugType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BugType {
    type Err = NagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "defect" => Ok(BugType::Defect),
            "enhancement" => Ok(BugType::Enhancement),
            "task" => Ok(BugType::Task),
            other => Err(NagError::InvalidSuggestion(other.to_string())),
        }
    }
}

// ============================================================================
// MODEL METADATA
// ============================================================================

/// `metadata.json` shipped next to `model.onnx`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Label encoder classes: class index -> label
    pub classes: Vec<String>,

    /// Width of the hashed feature vector the model was trained on
    pub n_features: usize,

    /// Name of the probability output; picked from the session outputs when absent
    #[serde(default)]
    pub probability_output: Option<String>,
}

impl ModelMetadata {
    pub fn decode(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrip_names() {
        for bug_type in BugType::ALL {
            assert_eq!(bug_type.as_str().parse::<BugType>().unwrap(), bug_type);
        }
    }

    #[test]
    fn test_unknown_label_is_invalid_suggestion() {
        let err = "regression".parse::<BugType>().unwrap_err();
        assert!(matches!(err, NagError::InvalidSuggestion(ref s) if s == "regression"));
        assert_eq!(err.to_string(), "Suggestion regression is invalid");
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        assert!("Defect".parse::<BugType>().is_err());
    }

    #[test]
    fn test_metadata_parse() {
        let metadata: ModelMetadata = serde_json::from_str(
            r#"{"classes": ["defect", "enhancement", "task"], "n_features": 1024}"#,
        )
        .unwrap();

        assert_eq!(metadata.decode(1), Some("enhancement"));
        assert_eq!(metadata.decode(3), None);
        assert_eq!(metadata.probability_output, None);
    }
}
