//! The ordered pass battery
//!
//! Each pass is a pure `text -> text` function. Order matters: conditional
//! wrapping must see the document before field passes reshape it, the args
//! block must be rebuilt before individual cert-path args are guarded, and
//! the blank-line cleanup always runs last.

use kubechart_core::Resource;

use crate::cleanup;
use crate::wrap::{self, KIND_CERTIFICATE, KIND_DEPLOYMENT, KIND_ISSUER, KIND_SERVICE_MONITOR};

pub mod args;
pub mod cert_manager;
pub mod deployment;
pub mod naming;

/// Everything a pass may read besides the text itself
#[derive(Clone, Copy)]
pub struct PassContext<'a> {
    pub resource: &'a dyn Resource,
    pub project_name: &'a str,
}

pub type PassFn = fn(&str, &PassContext<'_>) -> String;

/// Which resources a pass runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Kind(&'static str),
}

impl Scope {
    pub fn includes(self, resource: &dyn Resource) -> bool {
        match self {
            Self::All => true,
            Self::Kind(kind) => resource.kind() == kind,
        }
    }
}

/// A named step of the pipeline
pub struct Pass {
    pub name: &'static str,
    pub scope: Scope,
    pub run: PassFn,
}

impl std::fmt::Debug for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pass")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .finish()
    }
}

pub static PIPELINE: &[Pass] = &[
    Pass {
        name: "conditional-wrap",
        scope: Scope::All,
        run: |text, ctx| wrap::wrap(text, ctx.resource),
    },
    Pass {
        name: "namespace",
        scope: Scope::All,
        run: naming::substitute_namespace,
    },
    Pass {
        name: "certificate-dns-names",
        scope: Scope::Kind(KIND_CERTIFICATE),
        run: naming::substitute_certificate_dns_names,
    },
    Pass {
        name: "issuer-name",
        scope: Scope::Kind(KIND_ISSUER),
        run: naming::substitute_issuer_name,
    },
    Pass {
        name: "service-monitor-name",
        scope: Scope::Kind(KIND_SERVICE_MONITOR),
        run: naming::template_service_monitor_name,
    },
    Pass {
        name: "managed-by-label",
        scope: Scope::All,
        run: |text, _| naming::template_managed_by(text),
    },
    Pass {
        name: "image",
        scope: Scope::Kind(KIND_DEPLOYMENT),
        run: |text, _| deployment::template_image(text),
    },
    Pass {
        name: "env",
        scope: Scope::Kind(KIND_DEPLOYMENT),
        run: |text, _| deployment::template_env(text),
    },
    Pass {
        name: "pod-security-context",
        scope: Scope::Kind(KIND_DEPLOYMENT),
        run: |text, _| deployment::template_pod_security_context(text),
    },
    Pass {
        name: "container-security-context",
        scope: Scope::Kind(KIND_DEPLOYMENT),
        run: |text, _| deployment::template_container_security_context(text),
    },
    Pass {
        name: "resources",
        scope: Scope::Kind(KIND_DEPLOYMENT),
        run: |text, _| deployment::template_resources(text),
    },
    Pass {
        name: "controller-manager-args",
        scope: Scope::Kind(KIND_DEPLOYMENT),
        run: |text, _| args::template_controller_manager_args(text),
    },
    Pass {
        name: "cert-path-args",
        scope: Scope::Kind(KIND_DEPLOYMENT),
        run: |text, _| cert_manager::guard_cert_path_args(text),
    },
    Pass {
        name: "webhook-volume-mounts",
        scope: Scope::Kind(KIND_DEPLOYMENT),
        run: |text, _| cert_manager::WEBHOOK_VOLUME_MOUNT.apply(text),
    },
    Pass {
        name: "webhook-volumes",
        scope: Scope::Kind(KIND_DEPLOYMENT),
        run: |text, _| cert_manager::WEBHOOK_VOLUME.apply(text),
    },
    Pass {
        name: "metrics-volume-mounts",
        scope: Scope::Kind(KIND_DEPLOYMENT),
        run: |text, _| cert_manager::METRICS_VOLUME_MOUNT.apply(text),
    },
    Pass {
        name: "metrics-volumes",
        scope: Scope::Kind(KIND_DEPLOYMENT),
        run: |text, _| cert_manager::METRICS_VOLUME.apply(text),
    },
    Pass {
        name: "collapse-blank-lines",
        scope: Scope::All,
        run: |text, _| cleanup::collapse_blank_line_after_if(text),
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use kubechart_core::ResourceDescriptor;

    #[test]
    fn test_pipeline_order() {
        let names: Vec<&str> = PIPELINE.iter().map(|p| p.name).collect();
        let pos = |name: &str| names.iter().position(|n| *n == name).unwrap();

        assert_eq!(names.first(), Some(&"conditional-wrap"));
        assert_eq!(names.last(), Some(&"collapse-blank-lines"));
        assert!(pos("namespace") < pos("certificate-dns-names"));
        assert!(pos("controller-manager-args") < pos("cert-path-args"));
    }

    #[test]
    fn test_pass_names_unique() {
        let mut names: Vec<&str> = PIPELINE.iter().map(|p| p.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), PIPELINE.len());
    }

    #[test]
    fn test_scope() {
        let deployment = ResourceDescriptor::new("Deployment", "apps/v1", "x");
        let service = ResourceDescriptor::new("Service", "v1", "x");
        assert!(Scope::All.includes(&service));
        assert!(Scope::Kind("Deployment").includes(&deployment));
        assert!(!Scope::Kind("Deployment").includes(&service));
    }
}
