use thiserror::Error;

#[derive(Error, Debug)]
pub enum CipherForgeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    /// Ciphertext or key geometry that a strategy cannot run on.
    #[error("Input Shape Error: {0}")]
    InputShape(String),

    #[error("Stage '{stage}' failed: {reason}")]
    Stage { stage: String, reason: String },
}

pub type CfResult<T> = Result<T, CipherForgeError>;
