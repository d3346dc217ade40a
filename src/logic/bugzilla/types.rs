//! Bugzilla Types
//!
//! Records and wire types for the Bugzilla REST API.
//! No request logic here.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query fields of a bug search, in the REST API's own vocabulary
/// (`bug_status`, `f1`/`o1`/`v1` custom-search triplets, ...)
pub type BzParams = BTreeMap<String, String>;

/// Fields requested for every bug, enough for classification and the report
pub const INCLUDE_FIELDS: &[&str] = &[
    "id",
    "type",
    "summary",
    "groups",
    "product",
    "component",
    "keywords",
    "creator",
    "creation_time",
];

// ============================================================================
// BUG RECORD
// ============================================================================

/// A bug as returned by the search API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bug {
    pub id: u64,

    /// Declared type: defect, enhancement or task
    #[serde(rename = "type", default)]
    pub bug_type: String,

    #[serde(default)]
    pub summary: String,

    /// Security groups; non-empty means the bug is restricted
    #[serde(default)]
    pub groups: Vec<String>,

    #[serde(default)]
    pub product: String,

    #[serde(default)]
    pub component: String,

    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub creator: String,

    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,

    /// Text of comment 0, filled in after the search
    #[serde(default)]
    pub description: String,
}

impl Bug {
    pub fn is_restricted(&self) -> bool {
        !self.groups.is_empty()
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub bugs: Vec<Bug>,
}

#[derive(Debug, Deserialize)]
pub struct CommentsResponse {
    /// Keyed by bug id, as a string
    #[serde(default)]
    pub bugs: HashMap<String, BugComments>,
}

#[derive(Debug, Deserialize)]
pub struct BugComments {
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
pub struct Comment {
    /// Position of the comment on the bug; 0 is the description
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<i64>,
}

impl ErrorResponse {
    /// Message with the Bugzilla error code, when there is one
    pub fn describe(&self) -> String {
        match self.code {
            Some(code) => format!("{} (code {})", self.message, code),
            None => self.message.clone(),
        }
    }
}

impl CommentsResponse {
    /// Comment 0 of each bug, keyed by bug id
    pub fn descriptions(self) -> HashMap<u64, String> {
        self.bugs
            .into_iter()
            .filter_map(|(id, bug)| {
                let id = id.parse::<u64>().ok()?;
                let text = bug
                    .comments
                    .into_iter()
                    .find(|c| c.count == 0)
                    .map(|c| c.text)?;
                Some((id, text))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let body = r#"{
            "bugs": [
                {"id": 1520001, "type": "defect", "summary": "Crash in nsFoo",
                 "groups": [], "product": "Core", "component": "DOM",
                 "keywords": ["crash"], "creator": "someone@example.com",
                 "creation_time": "2019-01-15T10:00:00Z"},
                {"id": 1520002, "type": "task", "summary": "Hidden",
                 "groups": ["core-security"]}
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.bugs.len(), 2);
        assert_eq!(response.bugs[0].bug_type, "defect");
        assert_eq!(response.bugs[0].keywords, vec!["crash"]);
        assert!(response.bugs[0].creation_time.is_some());
        assert!(!response.bugs[0].is_restricted());
        assert!(response.bugs[1].is_restricted());
        assert_eq!(response.bugs[1].product, "");
    }

    #[test]
    fn test_descriptions_take_comment_zero() {
        let body = r#"{
            "bugs": {
                "10": {"comments": [
                    {"count": 0, "text": "Steps to reproduce"},
                    {"count": 1, "text": "Confirmed"}
                ]},
                "11": {"comments": [{"count": 3, "text": "late comment"}]},
                "not-a-number": {"comments": [{"count": 0, "text": "x"}]}
            },
            "comments": {}
        }"#;
        let response: CommentsResponse = serde_json::from_str(body).unwrap();
        let descriptions = response.descriptions();

        assert_eq!(descriptions.len(), 1);
        assert_eq!(descriptions[&10], "Steps to reproduce");
    }

    #[test]
    fn test_error_response_describe() {
        let error: ErrorResponse =
            serde_json::from_str(r#"{"error": true, "message": "Bug #9 does not exist.", "code": 101}"#).unwrap();
        assert_eq!(error.describe(), "Bug #9 does not exist. (code 101)");

        let error: ErrorResponse = serde_json::from_str(r#"{"message": "Denied"}"#).unwrap();
        assert_eq!(error.describe(), "Denied");
    }
}
