//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to parse manifest: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid manifest document {index}: {message}")]
    InvalidDocument { index: usize, message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
