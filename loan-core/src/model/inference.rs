//! Inference Engine - Serving State
//!
//! `LoanClassifier` owns everything a prediction needs: the feature aligner,
//! the ensemble and the decision threshold. It is built once per process,
//! loaded before requests are accepted, and read concurrently afterwards.
//! Nothing in here is mutated after `install` apart from the counters.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use super::artifact::ModelArtifact;
use super::threshold::{DecisionThreshold, LoanDecision};
use super::tree::GbdtModel;
use crate::error::{ArtifactError, PredictionError};
use crate::features::{AlignedVector, FeatureAligner, RawRecord, ReferenceSchema};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub source: String,
    pub schema_hash: u32,
    pub feature_count: usize,
    pub tree_count: usize,
    pub trained_at: DateTime<Utc>,
    pub loaded_at: DateTime<Utc>,
}

/// Prediction output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub decision: LoanDecision,
    /// Class-1 probability, 0.0 - 1.0
    pub probability: f64,
    pub raw_score: f64,
    pub threshold: f64,
    pub inference_time_us: u64,
}

/// Engine status for health/status endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub metadata: Option<ModelMetadata>,
    pub decision_threshold: f64,
    pub inference_count: u64,
    pub avg_latency_ms: f64,
}

struct LoadedModel {
    model: GbdtModel,
    metadata: ModelMetadata,
}

// ============================================================================
// CLASSIFIER
// ============================================================================

pub struct LoanClassifier {
    aligner: FeatureAligner,
    loaded: OnceCell<LoadedModel>,
    threshold: DecisionThreshold,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl LoanClassifier {
    /// Not-ready classifier; call `install` or `load_from_file` before serving
    pub fn new(threshold: DecisionThreshold) -> Self {
        Self {
            aligner: FeatureAligner::new(),
            loaded: OnceCell::new(),
            threshold,
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        }
    }

    /// Load and install the artifact at `path`
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        let artifact = ModelArtifact::load(path)?;
        self.install_from(artifact, path.display().to_string())
    }

    /// Install an in-memory artifact
    pub fn install(&self, artifact: ModelArtifact) -> Result<(), ArtifactError> {
        self.install_from(artifact, "<memory>".to_string())
    }

    fn install_from(&self, artifact: ModelArtifact, source: String) -> Result<(), ArtifactError> {
        artifact.validate()?;

        if self.loaded.get().is_some() {
            return Err(ArtifactError::AlreadyInitialized);
        }

        let ModelArtifact {
            schema,
            schema_hash,
            model,
            trained_at,
            ..
        } = artifact;

        let metadata = ModelMetadata {
            source,
            schema_hash,
            feature_count: schema.len(),
            tree_count: model.tree_count(),
            trained_at,
            loaded_at: Utc::now(),
        };

        // Schema first: a model is only visible once its schema is
        self.aligner.initialize(schema)?;
        self.loaded
            .set(LoadedModel {
                model,
                metadata: metadata.clone(),
            })
            .map_err(|_| ArtifactError::AlreadyInitialized)?;

        log::info!(
            "Classifier ready: {} trees over {} columns from {}",
            metadata.tree_count,
            metadata.feature_count,
            metadata.source
        );
        Ok(())
    }

    /// Model and schema both installed
    pub fn is_ready(&self) -> bool {
        self.aligner.is_ready() && self.loaded.get().is_some()
    }

    pub fn schema(&self) -> Option<&ReferenceSchema> {
        self.aligner.schema()
    }

    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.loaded.get().map(|l| &l.metadata)
    }

    pub fn threshold(&self) -> DecisionThreshold {
        self.threshold
    }

    /// Align, score and label one record
    pub fn predict(&self, record: &RawRecord) -> Result<Prediction, PredictionError> {
        let start_time = Instant::now();

        let loaded = self
            .loaded
            .get()
            .ok_or_else(|| PredictionError::not_ready("model not loaded"))?;
        let vector = self.aligner.align(record)?;
        if let Some(schema) = self.aligner.schema() {
            check_layout(&vector, schema, loaded.metadata.schema_hash)?;
            log::debug!("Aligned vector: {}", vector.to_log_entry(schema));
        }

        let raw_score = loaded.model.raw_score(vector.as_slice());
        let probability = super::tree::sigmoid(raw_score);
        let decision = self.threshold.decide(probability);

        let inference_time_us = start_time.elapsed().as_micros() as u64;

        // Track metrics
        self.latency_sum_us.fetch_add(inference_time_us, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        log::debug!(
            "Prediction: {} (p={:.4}, {}us)",
            decision,
            probability,
            inference_time_us
        );

        Ok(Prediction {
            decision,
            probability,
            raw_score,
            threshold: self.threshold.cutoff(),
            inference_time_us,
        })
    }

    pub fn status(&self) -> EngineStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f64 / count as f64) / 1000.0 } else { 0.0 };

        EngineStatus {
            model_loaded: self.is_ready(),
            metadata: self.metadata().cloned(),
            decision_threshold: self.threshold.cutoff(),
            inference_count: count,
            avg_latency_ms: avg,
        }
    }
}

/// The vector must match the installed schema and the layout the model was
/// trained on
fn check_layout(
    vector: &AlignedVector,
    schema: &ReferenceSchema,
    trained_hash: u32,
) -> Result<(), PredictionError> {
    vector
        .validate(schema)
        .map_err(|e| PredictionError::not_ready(e.to_string()))?;

    if vector.layout_hash != trained_hash {
        return Err(PredictionError::not_ready(format!(
            "vector layout {:08x} does not match model layout {:08x}",
            vector.layout_hash, trained_hash
        )));
    }

    Ok(())
}

impl Default for LoanClassifier {
    fn default() -> Self {
        Self::new(DecisionThreshold::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::model::tree::{Node, Tree};
    use crate::test_support::{loan_schema, sample_record};

    /// Approves on good credit history, rejects otherwise
    fn credit_artifact() -> ModelArtifact {
        let schema = loan_schema();
        let credit = schema.column_index(CREDIT_HISTORY).unwrap();
        let tree = Tree::new(vec![
            Node::Split { feature: credit, threshold: 0.5, left: 1, right: 2 },
            Node::Leaf { value: -2.0 },
            Node::Leaf { value: 2.0 },
        ]);
        let model = GbdtModel::new(0.0, schema.len(), vec![tree]);
        ModelArtifact::new(schema, model).unwrap()
    }

    fn ready() -> LoanClassifier {
        let classifier = LoanClassifier::default();
        classifier.install(credit_artifact()).unwrap();
        classifier
    }

    #[test]
    fn test_not_ready_before_install() {
        let classifier = LoanClassifier::default();
        assert!(!classifier.is_ready());

        let err = classifier.predict(&sample_record()).unwrap_err();
        assert!(matches!(err, PredictionError::NotReady(_)));
        assert!(!classifier.status().model_loaded);
    }

    #[test]
    fn test_predict_approved() {
        let prediction = ready().predict(&sample_record()).unwrap();
        assert_eq!(prediction.decision, LoanDecision::Approved);
        assert!((prediction.probability - crate::model::tree::sigmoid(2.0)).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&prediction.probability));
    }

    #[test]
    fn test_predict_rejected() {
        let record = sample_record().with(CREDIT_HISTORY, 0.0);
        let prediction = ready().predict(&record).unwrap();
        assert_eq!(prediction.decision, LoanDecision::Rejected);
        assert!(prediction.probability < 0.5);
    }

    #[test]
    fn test_predict_propagates_missing_field() {
        let mut record = sample_record();
        record.remove(APPLICANT_INCOME);

        let err = ready().predict(&record).unwrap_err();
        assert_eq!(err, PredictionError::missing(APPLICANT_INCOME));
    }

    #[test]
    fn test_install_once() {
        let classifier = ready();
        assert!(matches!(
            classifier.install(credit_artifact()),
            Err(ArtifactError::AlreadyInitialized)
        ));
        assert!(classifier.is_ready());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        credit_artifact().save(&path).unwrap();

        let classifier = LoanClassifier::default();
        classifier.load_from_file(&path).unwrap();

        let metadata = classifier.metadata().unwrap();
        assert_eq!(metadata.tree_count, 1);
        assert_eq!(metadata.feature_count, 14);
        assert!(metadata.source.ends_with("model.json"));
    }

    #[test]
    fn test_failed_load_stays_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = LoanClassifier::default();

        assert!(classifier.load_from_file(dir.path().join("missing.json")).is_err());
        assert!(!classifier.is_ready());
        assert!(classifier.schema().is_none());
    }

    #[test]
    fn test_status_counts_inferences() {
        let classifier = ready();
        for _ in 0..3 {
            classifier.predict(&sample_record()).unwrap();
        }

        let status = classifier.status();
        assert!(status.model_loaded);
        assert_eq!(status.inference_count, 3);
        assert_eq!(status.decision_threshold, 0.5);
    }

    #[test]
    fn test_layout_check() {
        let schema = loan_schema();
        let vector = crate::features::align(&sample_record(), &schema).unwrap();
        assert!(check_layout(&vector, &schema, schema.layout_hash()).is_ok());

        // Aligned against a narrower schema than the one installed
        let narrow = ReferenceSchema::from_fields(
            schema.fields().iter().skip(1).cloned().collect(),
        );
        let stale = crate::features::align(&sample_record(), &narrow).unwrap();
        let err = check_layout(&stale, &schema, schema.layout_hash()).unwrap_err();
        assert!(matches!(err, PredictionError::NotReady(_)));

        // Installed schema agrees with the vector but not with the model
        let err = check_layout(&vector, &schema, schema.layout_hash() ^ 1).unwrap_err();
        assert!(matches!(err, PredictionError::NotReady(_)));
    }

    #[test]
    fn test_custom_threshold() {
        let classifier = LoanClassifier::new(DecisionThreshold::new(0.99));
        classifier.install(credit_artifact()).unwrap();

        // sigmoid(2.0) ≈ 0.88 falls below the cut-off
        let prediction = classifier.predict(&sample_record()).unwrap();
        assert_eq!(prediction.decision, LoanDecision::Rejected);
    }

    #[test]
    fn test_trained_from_csv_end_to_end() {
        use crate::dataset::TrainingData;
        use crate::model::training::GbdtTrainer;
        use crate::test_support::SAMPLE_CSV;

        let data = TrainingData::from_reader(SAMPLE_CSV.as_bytes()).unwrap();
        let model = GbdtTrainer::default().fit(&data.features, &data.labels).unwrap();
        let artifact = ModelArtifact::new(data.schema, model).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loan.json");
        artifact.save(&path).unwrap();

        let classifier = LoanClassifier::default();
        classifier.load_from_file(&path).unwrap();

        let good = classifier.predict(&sample_record()).unwrap();
        let poor = classifier
            .predict(&sample_record().with(CREDIT_HISTORY, 0.0))
            .unwrap();
        assert_eq!(good.decision, LoanDecision::Approved);
        assert_eq!(poor.decision, LoanDecision::Rejected);
        assert!(good.probability > poor.probability);
    }
}
