//! Templater configuration
//!
//! ```yaml
//! # kubechart.yaml
//! projectName: myproj
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, TemplaterError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplaterConfig {
    /// Kubebuilder project name, the prefix kustomize puts on every resource
    pub project_name: String,
}

impl TemplaterConfig {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
        }
    }

    /// Load and validate a config file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TemplaterError::ConfigNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a config from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject empty project names and names containing whitespace
    pub fn validate(&self) -> Result<()> {
        let name = &self.project_name;
        let reason = if name.trim().is_empty() {
            "must not be empty"
        } else if name.chars().any(char::is_whitespace) {
            "must not contain whitespace"
        } else {
            return Ok(());
        };

        Err(TemplaterError::InvalidProjectName {
            name: name.clone(),
            reason: reason.to_string(),
        })
    }
}
