use crate::data::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading the classifier or its column schema.
///
/// All of these are fatal at start-up: no prediction is served without a
/// model and schema that agree with each other.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("model column schema is empty")]
    EmptySchema,

    #[error("column `{0}` appears more than once in the model schema")]
    DuplicateColumn(String),

    #[error("invalid forest: {0}")]
    InvalidForest(String),

    #[error("forest expects {expected} features but the schema has {actual} columns")]
    FeatureCount { expected: usize, actual: usize },
}

/// Why a submission produced no prediction.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("feature row was encoded for a different schema ({actual} columns, model has {expected})")]
    SchemaMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
