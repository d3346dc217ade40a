//! Bugzilla REST Client
//!
//! Blocking HTTP client for the search and comment endpoints.
//! No retries: failures go straight back to the caller.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use super::types::{Bug, BzParams, CommentsResponse, ErrorResponse, SearchResponse, INCLUDE_FIELDS};
use super::BugSource;
use crate::constants;
use crate::error::{NagError, NagResult};

/// Bugzilla connection settings
#[derive(Debug, Clone)]
pub struct BugzillaConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for BugzillaConfig {
    fn default() -> Self {
        Self {
            base_url: constants::get_bugzilla_url(),
            api_key: constants::get_bugzilla_api_key(),
            timeout_seconds: constants::DEFAULT_BZ_QUERY_TIMEOUT,
        }
    }
}

/// Bugzilla API client
pub struct BugzillaClient {
    config: BugzillaConfig,
    agent: ureq::Agent,
}

impl BugzillaClient {
    /// Create new client
    pub fn new(config: BugzillaConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&format!("bugbug-nag/{}", constants::APP_VERSION))
            .build();

        Self { config, agent }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// GET `path` with `pairs` and return the raw body
    fn get(&self, path: &str, pairs: &[(String, String)]) -> NagResult<String> {
        let url = format!("{}{}", self.config.base_url, path);

        let mut request = self.agent.get(&url);
        if let Some(key) = &self.config.api_key {
            request = request.set(constants::BUGZILLA_API_KEY_HEADER, key);
        }
        for (name, value) in pairs {
            request = request.query(name, value);
        }

        tracing::debug!("GET {} ({} params)", url, pairs.len());

        let response = request.call().map_err(map_error)?;
        response
            .into_string()
            .map_err(|e| NagError::Network(format!("reading {}: {}", url, e)))
    }

    /// Run a search and return the matching bugs (descriptions not filled in)
    fn search_raw(&self, pairs: &[(String, String)]) -> NagResult<Vec<Bug>> {
        let body = self.get("/rest/bug", pairs)?;
        let response: SearchResponse = serde_json::from_str(&body)?;
        Ok(response.bugs)
    }

    /// Fetch comment 0 for every bug in `ids`, one request per chunk
    pub fn fetch_descriptions(&self, ids: &[u64]) -> NagResult<HashMap<u64, String>> {
        let mut descriptions = HashMap::with_capacity(ids.len());

        for (path, pairs) in comment_requests(ids) {
            let body = self.get(&path, &pairs)?;
            let response: CommentsResponse = serde_json::from_str(&body)?;
            descriptions.extend(response.descriptions());
        }

        Ok(descriptions)
    }

    fn with_descriptions(&self, mut bugs: Vec<Bug>) -> NagResult<Vec<Bug>> {
        let ids: Vec<u64> = bugs.iter().map(|b| b.id).collect();
        let mut descriptions = self.fetch_descriptions(&ids)?;

        for bug in &mut bugs {
            if let Some(text) = descriptions.remove(&bug.id) {
                bug.description = text;
            }
        }
        Ok(bugs)
    }
}

impl BugSource for BugzillaClient {
    fn search(&self, params: &BzParams) -> NagResult<Vec<Bug>> {
        let bugs = self.search_raw(&query_pairs(params))?;
        tracing::info!("Bugzilla search returned {} bugs", bugs.len());
        self.with_descriptions(bugs)
    }

    fn get_bugs(&self, ids: &[u64]) -> NagResult<Vec<Bug>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut bugs = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(constants::BUGZILLA_CHUNK_SIZE) {
            bugs.extend(self.search_raw(&id_search_pairs(chunk))?);
        }
        tracing::info!("Fetched {} of {} requested bugs", bugs.len(), ids.len());
        self.with_descriptions(bugs)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Flatten query params for the REST call.
///
/// Custom-search triplets (`fN`, `oN`, `vN`) with an empty value are left
/// out entirely so that an empty constraint means no restriction.
pub fn query_pairs(params: &BzParams) -> Vec<(String, String)> {
    let empty: BTreeSet<&str> = params
        .iter()
        .filter(|(_, value)| value.is_empty())
        .filter_map(|(name, _)| name.strip_prefix('v'))
        .filter(|n| is_index(n))
        .collect();

    let mut pairs: Vec<(String, String)> = params
        .iter()
        .filter(|(name, _)| !is_empty_triplet_field(name, &empty))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    if !params.contains_key("include_fields") {
        pairs.push(("include_fields".to_string(), INCLUDE_FIELDS.join(",")));
    }
    pairs
}

fn is_index(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_empty_triplet_field(name: &str, empty: &BTreeSet<&str>) -> bool {
    ['f', 'o', 'v']
        .iter()
        .any(|prefix| name.strip_prefix(*prefix).is_some_and(|n| empty.contains(n)))
}

/// Search pairs fetching the bugs in `ids`
pub fn id_search_pairs(ids: &[u64]) -> Vec<(String, String)> {
    let mut params = BzParams::new();
    params.insert("id".to_string(), join_ids(ids));
    query_pairs(&params)
}

/// `(path, pairs)` of the comment requests covering `ids`.
/// The first id of a chunk goes in the path, the others as `ids` pairs.
pub fn comment_requests(ids: &[u64]) -> Vec<(String, Vec<(String, String)>)> {
    ids.chunks(constants::BUGZILLA_CHUNK_SIZE)
        .filter_map(|chunk| {
            let (first, rest) = chunk.split_first()?;
            let pairs = rest
                .iter()
                .map(|id| ("ids".to_string(), id.to_string()))
                .collect();
            Some((format!("/rest/bug/{}/comment", first), pairs))
        })
        .collect()
}

pub fn join_ids(ids: &[u64]) -> String {
    ids.iter().map(u64::to_string).collect::<Vec<_>>().join(",")
}

fn map_error(err: ureq::Error) -> NagError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.describe())
                .unwrap_or(body);
            NagError::BugzillaStatus { status, message }
        }
        other => NagError::Network(other.to_string()),
    }
}
