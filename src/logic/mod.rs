//! Logic Module - nag checks and their collaborators
//!
//! - `dates/` - run-date window
//! - `bugzilla/` - bug retrieval
//! - `model/` - bug type classifier (ONNX)
//! - `nag/` - checks, runner, report

pub mod bugzilla;
pub mod dates;
pub mod model;
pub mod nag;
