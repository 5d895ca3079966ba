// src/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MongoFrameError {
    #[error("connection string '{0}' does not name a database")]
    MissingDatabaseName(String),

    #[error("either chunk_size or a batchSize parameter may be given, not both")]
    ConflictingBatchSize,

    #[error("invalid if-exists disposition '{0}' (expected fail, replace or append)")]
    InvalidDisposition(String),

    #[error("chunk size must be greater than zero (got {0})")]
    InvalidChunkSize(usize),

    #[error("Collection '{0}' already exists")]
    CollectionExists(String),

    #[error("column '{column}' holds {actual} values, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("no column named '{0}'")]
    UnknownColumn(String),

    #[error("unsupported aggregation stage: {0}")]
    UnsupportedStage(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MongoFrameError>;
