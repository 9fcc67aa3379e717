//! kubechart Templater - kustomize output to Helm chart templates
//!
//! Takes one rendered Kubernetes document at a time, plus the descriptor of
//! the resource it describes, and rewrites it into a Helm template by
//! running an ordered battery of textual passes:
//!
//! 1. **Conditional wrap**: optional integrations (CRDs, cert-manager,
//!    Prometheus, metrics, RBAC helpers) are guarded by feature flags,
//!    the `Namespace` is dropped.
//! 2. **Naming**: the project namespace, service DNS names, issuer and
//!    ServiceMonitor names and the `managed-by` label become release- and
//!    chart-scoped expressions.
//! 3. **Deployment fields**: image, env, resources, security contexts and
//!    args of the `manager` container are exposed through
//!    `.Values.controllerManager`.
//! 4. **cert-manager toggles**: certificate path args, secret volumes and
//!    their mounts are guarded.
//! 5. **Cleanup**: blank lines next to guard directives are collapsed.
//!
//! Passes work on lines and indentation rather than a YAML tree, and each
//! one recognizes its own output, so templating a document twice gives the
//! same result as templating it once.
//!
//! # Example
//!
//! ```
//! use kubechart_core::ResourceDescriptor;
//! use kubechart_templater::HelmTemplater;
//!
//! let templater = HelmTemplater::new("myproj");
//! let resource = ResourceDescriptor::new("Service", "v1", "myproj-controller-manager-metrics-service");
//! let text = "apiVersion: v1\nkind: Service\nmetadata:\n  name: myproj-controller-manager-metrics-service\n  namespace: myproj-system\n";
//!
//! let out = templater.apply(text, &resource);
//! assert!(out.starts_with("{{- if .Values.metrics.enable }}\n"));
//! assert!(out.contains("namespace: {{ .Release.Namespace }}"));
//! ```

pub mod cleanup;
pub mod config;
pub mod directive;
pub mod error;
pub mod lines;
pub mod passes;
pub mod templater;
pub mod wrap;

pub use config::TemplaterConfig;
pub use directive::Condition;
pub use error::{Result, TemplaterError};
pub use templater::{HelmTemplater, PassOutcome, TemplateReport};
pub use wrap::WrapAction;
