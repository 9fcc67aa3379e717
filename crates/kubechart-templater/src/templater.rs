//! The templater entry point

use kubechart_core::Resource;

use crate::config::TemplaterConfig;
use crate::error::Result;
use crate::passes::{PIPELINE, PassContext};

/// Turns one kustomize-rendered document into a Helm template
///
/// Stateless apart from the project name; one instance can template any
/// number of documents, from any number of threads.
#[derive(Debug, Clone)]
pub struct HelmTemplater {
    config: TemplaterConfig,
}

/// Whether a single pass changed the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassOutcome {
    pub pass: &'static str,
    pub changed: bool,
}

/// Per-pass record of one templating run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateReport {
    pub passes: Vec<PassOutcome>,
}

impl TemplateReport {
    /// Names of the passes that changed the text, in pipeline order
    pub fn changed(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.passes.iter().filter(|p| p.changed).map(|p| p.pass)
    }

    pub fn is_unchanged(&self) -> bool {
        self.passes.iter().all(|p| !p.changed)
    }
}

impl HelmTemplater {
    /// Create a templater without validating the project name
    ///
    /// An empty name disables the name-based substitutions.
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            config: TemplaterConfig::new(project_name),
        }
    }

    pub fn from_config(config: TemplaterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn project_name(&self) -> &str {
        &self.config.project_name
    }

    /// Template `text`, the rendered form of `resource`
    ///
    /// Returns an empty string for resources the chart must not emit.
    pub fn apply(&self, text: &str, resource: &dyn Resource) -> String {
        self.run(text, resource, |_, _| {})
    }

    /// Like [`apply`](Self::apply), also reporting what each pass did
    pub fn apply_with_report(
        &self,
        text: &str,
        resource: &dyn Resource,
    ) -> (String, TemplateReport) {
        let mut report = TemplateReport::default();
        let out = self.run(text, resource, |pass, changed| {
            report.passes.push(PassOutcome { pass, changed });
        });
        (out, report)
    }

    fn run(
        &self,
        text: &str,
        resource: &dyn Resource,
        mut observe: impl FnMut(&'static str, bool),
    ) -> String {
        let ctx = PassContext {
            resource,
            project_name: self.project_name(),
        };

        let mut current = text.to_string();
        for pass in PIPELINE.iter().filter(|p| p.scope.includes(resource)) {
            let next = (pass.run)(&current, &ctx);
            let changed = next != current;
            if changed {
                tracing::debug!(
                    pass = pass.name,
                    kind = resource.kind(),
                    name = resource.name(),
                    "pass rewrote document"
                );
            } else {
                tracing::trace!(pass = pass.name, name = resource.name(), "pass skipped");
            }
            observe(pass.name, changed);
            current = next;
        }
        current
    }
}
