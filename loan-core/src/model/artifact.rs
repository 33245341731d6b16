//! Model Artifact - schema and ensemble as one deployable unit
//!
//! The reference schema travels inside the artifact so the two can never be
//! deployed apart. Loading refuses anything that does not check out:
//!
//! - format version
//! - non-empty, self-consistent schema whose hash matches the stored one
//! - SHA-256 checksum over the serialized ensemble
//! - ensemble width equal to the schema width

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::tree::GbdtModel;
use crate::error::ArtifactError;
use crate::features::ReferenceSchema;

/// Current artifact format
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub schema: ReferenceSchema,
    /// Layout hash of `schema` at training time
    pub schema_hash: u32,
    pub model: GbdtModel,
    /// Hex SHA-256 of the serialized `model`
    pub model_checksum: String,
    pub trained_at: DateTime<Utc>,
}

impl ModelArtifact {
    /// Bundle a freshly trained model with its schema
    pub fn new(schema: ReferenceSchema, model: GbdtModel) -> Result<Self, ArtifactError> {
        let artifact = Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            schema_hash: schema.layout_hash(),
            model_checksum: model_checksum(&model)?,
            schema,
            model,
            trained_at: Utc::now(),
        };

        artifact.validate()?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: self.format_version,
                expected: ARTIFACT_FORMAT_VERSION,
            });
        }

        if self.schema.is_empty() {
            return Err(ArtifactError::EmptySchema);
        }
        if !self.schema.is_consistent() {
            return Err(ArtifactError::InconsistentSchema);
        }
        self.schema.validate_layout(self.schema.version(), self.schema_hash)?;

        let actual = model_checksum(&self.model)?;
        if actual != self.model_checksum {
            return Err(ArtifactError::ChecksumMismatch {
                expected: self.model_checksum.clone(),
                actual,
            });
        }

        if self.model.feature_count != self.schema.len() {
            return Err(ArtifactError::FeatureCountMismatch {
                model: self.model.feature_count,
                schema: self.schema.len(),
            });
        }

        self.model.validate()
    }

    pub fn to_json(&self) -> Result<String, ArtifactError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let artifact: Self = serde_json::from_str(json)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Write to `path`, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_json()?)?;
        log::info!("Model artifact saved to {}", path.display());
        Ok(())
    }

    /// Read and validate from `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        log::info!("Loading model artifact from: {}", path.display());

        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Hex SHA-256 over the canonical JSON of the ensemble
pub fn model_checksum(model: &GbdtModel) -> Result<String, ArtifactError> {
    let bytes = serde_json::to_vec(model)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}
