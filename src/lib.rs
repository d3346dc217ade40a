//! bugbug nag checks
//!
//! Looks at recently opened bugs, asks the bugbug classifier what type each
//! one should have, and reports confident disagreements for triage.
//!
//! ```text
//!  tools.json ──► NagConfig ─────────────┐
//!                                        ▼
//!  Bugzilla ──► BugbugScript ──► DefectEnhancementTask ──► report
//!                   ▲
//!  model.onnx ──────┘
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logic;

pub use config::{NagConfig, ToolsConfig};
pub use error::{NagError, NagResult};
