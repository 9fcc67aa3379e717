//! Templater error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplaterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse templater config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Invalid project name {name:?}: {reason}")]
    InvalidProjectName { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, TemplaterError>;
