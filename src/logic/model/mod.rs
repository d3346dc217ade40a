//! Model Module - bug type classifier
//!
//! ## Structure
//! - `types`: label set and bundle metadata
//! - `features`: hashing vectorizer
//! - `inference`: ONNX-backed model
//! - `retrieve`: getting the bundle onto disk

pub mod features;
pub mod inference;
pub mod retrieve;
pub mod types;

pub use inference::DefectEnhancementTaskModel;
pub use retrieve::retrieve_model;
pub use types::{BugType, ModelMetadata};

use ndarray::Array2;

use crate::error::NagResult;
use crate::logic::bugzilla::Bug;

/// A trained classifier over bugs
pub trait BugClassifier {
    /// Class probabilities, one row per bug (same order), one column per class
    fn classify(&self, bugs: &[Bug]) -> NagResult<Array2<f32>>;

    /// Label for a class index, from the model's own label encoder
    fn decode_label(&self, index: usize) -> NagResult<String>;
}
