//! Model Module - Classifier, Trainer, Artifact
//!
//! Ensemble inference, training, the on-disk artifact and the serving state
//! are kept apart so the front-ends only ever touch `LoanClassifier`.

pub mod artifact;
pub mod inference;
pub mod threshold;
pub mod training;
pub mod tree;

// Re-export common types
pub use artifact::{ModelArtifact, ARTIFACT_FORMAT_VERSION};
pub use inference::{EngineStatus, LoanClassifier, ModelMetadata, Prediction};
pub use threshold::{DecisionThreshold, LoanDecision};
pub use training::{GbdtConfig, GbdtTrainer};
pub use tree::{GbdtModel, Node, Tree};
