//! Configuration module

use std::env;
use std::path::PathBuf;

use loan_core::constants::{DEFAULT_DECISION_THRESHOLD, DEFAULT_MODEL_PATH};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Model artifact (schema + classifier)
    pub model_path: PathBuf,

    /// Probability cut-off for "Approved"
    pub decision_threshold: f64,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_PATH)),

            decision_threshold: env::var("DECISION_THRESHOLD")
                .ok()
                .and_then(|t| t.parse::<f64>().ok())
                .filter(|t| t.is_finite())
                .map(|t| t.clamp(0.0, 1.0))
                .unwrap_or(DEFAULT_DECISION_THRESHOLD),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            decision_threshold: DEFAULT_DECISION_THRESHOLD,
            environment: "development".to_string(),
        }
    }
}
