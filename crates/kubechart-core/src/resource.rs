//! Resource descriptors
//!
//! The templater never looks inside a manifest to learn what it is. Callers
//! hand it a [`Resource`] alongside the text: the kind, apiVersion, name and
//! namespace as already parsed by whoever produced the manifest.

use serde::Deserialize;

use crate::error::{CoreError, Result};

/// Read-only view of a Kubernetes object's identity
pub trait Resource {
    fn kind(&self) -> &str;
    fn api_version(&self) -> &str;
    fn name(&self) -> &str;
    fn namespace(&self) -> &str;
}

/// Owned resource identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub kind: String,
    pub api_version: String,
    pub name: String,
    /// Often blank for kustomize output before namespace substitution
    pub namespace: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawObject {
    api_version: Option<String>,
    kind: Option<String>,
    #[serde(default)]
    metadata: RawMetadata,
}

#[derive(Deserialize, Default)]
struct RawMetadata {
    name: Option<String>,
    namespace: Option<String>,
}

impl ResourceDescriptor {
    pub fn new(
        kind: impl Into<String>,
        api_version: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            api_version: api_version.into(),
            name: name.into(),
            namespace: String::new(),
        }
    }

    /// Set the namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Extract the descriptor from a single YAML document
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid YAML or lacks `kind`,
    /// `apiVersion` or `metadata.name`.
    pub fn from_yaml(doc: &str) -> Result<Self> {
        let raw: RawObject = serde_yaml::from_str(doc)?;

        let kind = raw.kind.ok_or_else(|| missing("kind"))?;
        let api_version = raw.api_version.ok_or_else(|| missing("apiVersion"))?;
        let name = raw.metadata.name.ok_or_else(|| missing("metadata.name"))?;

        Ok(Self {
            kind,
            api_version,
            name,
            namespace: raw.metadata.namespace.unwrap_or_default(),
        })
    }

    /// API group of the apiVersion (`cert-manager.io` for `cert-manager.io/v1`)
    ///
    /// Core resources (`v1`) have an empty group.
    pub fn api_group(&self) -> &str {
        api_group(&self.api_version)
    }
}

/// API group portion of an apiVersion string
pub fn api_group(api_version: &str) -> &str {
    match api_version.split_once('/') {
        Some((group, _)) => group,
        None => "",
    }
}

fn missing(field: &str) -> CoreError {
    CoreError::MissingField {
        field: field.to_string(),
    }
}

impl Resource for ResourceDescriptor {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn api_version(&self) -> &str {
        &self.api_version
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl std::fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml() {
        let doc = r#"
apiVersion: cert-manager.io/v1
kind: Certificate
metadata:
  name: myproj-metrics-certs
  namespace: myproj-system
spec:
  secretName: metrics-server-cert
"#;
        let desc = ResourceDescriptor::from_yaml(doc).unwrap();
        assert_eq!(desc.kind(), "Certificate");
        assert_eq!(desc.api_version(), "cert-manager.io/v1");
        assert_eq!(desc.name(), "myproj-metrics-certs");
        assert_eq!(desc.namespace(), "myproj-system");
        assert_eq!(desc.api_group(), "cert-manager.io");
    }

    #[test]
    fn test_from_yaml_cluster_scoped() {
        let doc = "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: myproj-system\n";
        let desc = ResourceDescriptor::from_yaml(doc).unwrap();
        assert_eq!(desc.namespace(), "");
        assert_eq!(desc.api_group(), "");
    }

    #[test]
    fn test_from_yaml_missing_kind() {
        let doc = "apiVersion: v1\nmetadata:\n  name: x\n";
        let err = ResourceDescriptor::from_yaml(doc).unwrap_err();
        assert!(matches!(err, CoreError::MissingField { ref field } if field == "kind"));
    }

    #[test]
    fn test_from_yaml_missing_name() {
        let doc = "apiVersion: v1\nkind: Service\nmetadata: {}\n";
        let err = ResourceDescriptor::from_yaml(doc).unwrap_err();
        assert!(err.to_string().contains("metadata.name"));
    }

    #[test]
    fn test_from_yaml_invalid() {
        assert!(ResourceDescriptor::from_yaml("kind: [unclosed").is_err());
    }

    #[test]
    fn test_display() {
        let desc = ResourceDescriptor::new("Service", "v1", "webhook-service")
            .with_namespace("system");
        assert_eq!(desc.to_string(), "Service/webhook-service");
        assert_eq!(desc.namespace, "system");
    }
}
