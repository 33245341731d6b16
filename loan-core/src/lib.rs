//! Loan Approval Core
//!
//! Everything the front-ends share:
//!
//! - `features/` - Reference schema, raw records and the feature aligner
//! - `model/` - Gradient-boosted classifier, trainer, artifact and serving state
//! - `dataset` - Training CSV loading and schema derivation
//!
//! Front-ends (REST, web form, trainer) go through [`LoanClassifier`] and
//! [`FeatureAligner`]; none of them encode features on their own.

pub mod constants;
pub mod dataset;
pub mod error;
pub mod features;
pub mod model;

pub use error::{ArtifactError, DatasetError, PredictionError};
pub use features::{align, AlignedVector, FeatureAligner, RawRecord, RawValue, ReferenceSchema};
pub use model::{LoanClassifier, ModelArtifact, Prediction};

#[cfg(test)]
mod test_support;
