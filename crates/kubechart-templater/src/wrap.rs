//! Whole-resource conditional wrapping
//!
//! Decides from the descriptor alone whether a rendered resource should be
//! toggled by a feature flag. Optional integrations (CRDs, cert-manager
//! objects, monitoring, metrics, RBAC helper roles) get a guard; the
//! resources a controller needs to run are always emitted.
//!
//! The policy is an ordered table evaluated top to bottom, first match wins:
//!
//! | Resource                                                  | Action                          |
//! |-----------------------------------------------------------|---------------------------------|
//! | `Namespace`                                               | dropped                         |
//! | `CustomResourceDefinition`                                | `crd.enable`                    |
//! | cert-manager `Certificate` named `*metrics*`              | `certManager` and `metrics`     |
//! | cert-manager `Certificate` / `Issuer`                     | `certManager.enable`            |
//! | monitoring `ServiceMonitor`                               | `prometheus.enable`             |
//! | RBAC named `*admin-role*`, `*editor-role*`, `*viewer-role*` | `rbacHelpers.enable`          |
//! | RBAC named `*metrics*`                                    | `metrics.enable`                |
//! | other RBAC                                                | kept                            |
//! | webhook configurations                                    | only the CA injection annotation |
//! | `Service` named `*metrics*`                               | `metrics.enable`                |
//! | anything else                                             | kept                            |

use kubechart_core::Resource;
use kubechart_core::resource::api_group;
use phf::phf_set;

use crate::directive::{Condition, END};
use crate::lines::{Line, leading_whitespace};

pub const KIND_NAMESPACE: &str = "Namespace";
pub const KIND_CRD: &str = "CustomResourceDefinition";
pub const KIND_CERTIFICATE: &str = "Certificate";
pub const KIND_ISSUER: &str = "Issuer";
pub const KIND_SERVICE: &str = "Service";
pub const KIND_SERVICE_MONITOR: &str = "ServiceMonitor";
pub const KIND_DEPLOYMENT: &str = "Deployment";

const GROUP_CERT_MANAGER: &str = "cert-manager.io";
const GROUP_MONITORING: &str = "monitoring.coreos.com";

const INJECT_CA_ANNOTATION: &str = "cert-manager.io/inject-ca-from";

static RBAC_KINDS: phf::Set<&'static str> = phf_set! {
    "ServiceAccount",
    "Role",
    "ClusterRole",
    "RoleBinding",
    "ClusterRoleBinding",
};

static WEBHOOK_KINDS: phf::Set<&'static str> = phf_set! {
    "ValidatingWebhookConfiguration",
    "MutatingWebhookConfiguration",
};

const HELPER_ROLE_MARKERS: [&str; 3] = ["admin-role", "editor-role", "viewer-role"];

/// What happens to a resource as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapAction {
    /// Emit nothing
    Drop,
    /// Wrap the whole document in a guard
    Guard(Condition),
    /// Keep the document, guarding only the CA injection annotation
    GuardAnnotation,
    /// Emit unchanged
    Keep,
}

struct WrapRule {
    matches: fn(&dyn Resource) -> bool,
    action: WrapAction,
}

static WRAP_RULES: &[WrapRule] = &[
    WrapRule {
        matches: is_namespace,
        action: WrapAction::Drop,
    },
    WrapRule {
        matches: is_crd,
        action: WrapAction::Guard(Condition::Crd),
    },
    WrapRule {
        matches: is_metrics_certificate,
        action: WrapAction::Guard(Condition::CertManagerAndMetrics),
    },
    WrapRule {
        matches: is_certificate,
        action: WrapAction::Guard(Condition::CertManager),
    },
    WrapRule {
        matches: is_issuer,
        action: WrapAction::Guard(Condition::CertManager),
    },
    WrapRule {
        matches: is_service_monitor,
        action: WrapAction::Guard(Condition::Prometheus),
    },
    WrapRule {
        matches: is_helper_rbac,
        action: WrapAction::Guard(Condition::RbacHelpers),
    },
    WrapRule {
        matches: is_metrics_rbac,
        action: WrapAction::Guard(Condition::Metrics),
    },
    WrapRule {
        matches: is_rbac,
        action: WrapAction::Keep,
    },
    WrapRule {
        matches: is_webhook_configuration,
        action: WrapAction::GuardAnnotation,
    },
    WrapRule {
        matches: is_metrics_service,
        action: WrapAction::Guard(Condition::Metrics),
    },
    WrapRule {
        matches: is_service,
        action: WrapAction::Keep,
    },
];

fn is_namespace(r: &dyn Resource) -> bool {
    r.kind() == KIND_NAMESPACE
}

fn is_crd(r: &dyn Resource) -> bool {
    r.kind() == KIND_CRD
}

fn is_certificate(r: &dyn Resource) -> bool {
    r.kind() == KIND_CERTIFICATE && api_group(r.api_version()) == GROUP_CERT_MANAGER
}

fn is_metrics_certificate(r: &dyn Resource) -> bool {
    is_certificate(r) && r.name().contains("metrics")
}

fn is_issuer(r: &dyn Resource) -> bool {
    r.kind() == KIND_ISSUER && api_group(r.api_version()) == GROUP_CERT_MANAGER
}

fn is_service_monitor(r: &dyn Resource) -> bool {
    r.kind() == KIND_SERVICE_MONITOR && api_group(r.api_version()) == GROUP_MONITORING
}

fn is_rbac(r: &dyn Resource) -> bool {
    RBAC_KINDS.contains(r.kind())
}

fn is_helper_rbac(r: &dyn Resource) -> bool {
    is_rbac(r) && HELPER_ROLE_MARKERS.iter().any(|m| r.name().contains(m))
}

fn is_metrics_rbac(r: &dyn Resource) -> bool {
    is_rbac(r) && r.name().contains("metrics")
}

fn is_webhook_configuration(r: &dyn Resource) -> bool {
    WEBHOOK_KINDS.contains(r.kind())
}

fn is_service(r: &dyn Resource) -> bool {
    r.kind() == KIND_SERVICE
}

fn is_metrics_service(r: &dyn Resource) -> bool {
    is_service(r) && r.name().contains("metrics")
}

/// Look up the action for a resource
pub fn decide(resource: &dyn Resource) -> WrapAction {
    WRAP_RULES
        .iter()
        .find(|rule| (rule.matches)(resource))
        .map(|rule| rule.action)
        .unwrap_or(WrapAction::Keep)
}

/// Apply the resource's wrap action to its rendered text
pub fn wrap(text: &str, resource: &dyn Resource) -> String {
    match decide(resource) {
        WrapAction::Drop => String::new(),
        WrapAction::Guard(condition) => wrap_document(text, condition),
        WrapAction::GuardAnnotation => guard_inject_ca_annotation(text),
        WrapAction::Keep => text.to_string(),
    }
}

/// Wrap a whole document in `condition`
///
/// A document that already opens with the same guard is returned as is.
pub fn wrap_document(text: &str, condition: Condition) -> String {
    let open = condition.open();
    if text.trim().is_empty() || text.lines().next().map(str::trim) == Some(open.as_str()) {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + open.len() + END.len() + 3);
    out.push_str(&open);
    out.push('\n');
    out.push_str(text);
    if !text.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(END);
    out.push('\n');
    out
}

/// Guard each `cert-manager.io/inject-ca-from` annotation line
pub fn guard_inject_ca_annotation(text: &str) -> String {
    if !text.contains(INJECT_CA_ANNOTATION) {
        return text.to_string();
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 2);
    for (i, raw) in lines.iter().enumerate() {
        let line = Line::parse(raw);
        if line.indent > 0
            && line.has_key(INJECT_CA_ANNOTATION)
            && !Condition::CertManager.guards(&lines, i)
        {
            let indent = leading_whitespace(raw);
            out.extend(Condition::CertManager.wrap_lines(indent, &[format!("{indent}{}", line.trimmed)]));
        } else {
            out.push(raw.to_string());
        }
    }
    out.join("\n")
}
