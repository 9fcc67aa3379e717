//! Name, namespace and label substitutions
//!
//! Kustomize bakes the project name into namespaces, service DNS names and
//! issuer references. These passes swap those literals for release- and
//! chart-scoped template expressions.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::PassContext;

pub const RELEASE_NAMESPACE: &str = "{{ .Release.Namespace }}";
pub const CHART_NAME: &str = "{{ include \"chart.name\" . }}";

const METRICS_SERVICE_SUFFIX: &str = "controller-manager-metrics-service";
const METRICS_MONITOR_SUFFIX: &str = "controller-manager-metrics-monitor";
const SERVICE_DNS_PLACEHOLDER: &str = "SERVICE_NAME.SERVICE_NAMESPACE.svc";

static MANAGED_BY_KUSTOMIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)app\.kubernetes\.io/managed-by:[ \t]+kustomize[ \t]*$")
        .expect("valid regex")
});

/// `<project>-system` becomes the release namespace, everywhere
pub fn substitute_namespace(text: &str, ctx: &PassContext<'_>) -> String {
    if ctx.project_name.is_empty() {
        return text.to_string();
    }
    let hardcoded = format!("{}-system", ctx.project_name);
    text.replace(&hardcoded, RELEASE_NAMESPACE)
}

/// Point certificate DNS names and issuer references at chart helpers
///
/// Only metrics certificates get their service DNS names rewritten; every
/// certificate gets the self-signed issuer reference templated.
pub fn substitute_certificate_dns_names(text: &str, ctx: &PassContext<'_>) -> String {
    if ctx.project_name.is_empty() {
        return text.to_string();
    }

    let mut text = text.to_string();

    if ctx.resource.name().contains("metrics") {
        let service = metrics_service_name();
        let namespace = "{{ include \"chart.namespaceName\" . }}";
        let fqdn = format!("{service}.{namespace}.svc");

        text = text
            .replace(
                &format!("{SERVICE_DNS_PLACEHOLDER}.cluster.local"),
                &format!("{fqdn}.cluster.local"),
            )
            .replace(SERVICE_DNS_PLACEHOLDER, &fqdn)
            .replace(
                &format!("{}-{METRICS_SERVICE_SUFFIX}", ctx.project_name),
                &service,
            );
    }

    substitute_issuer_name(&text, ctx)
}

/// `<project>-selfsigned-issuer` becomes `<chart name>-selfsigned-issuer`
///
/// Runs on the Issuer itself and on every Certificate referencing it, so
/// `issuerRef.name` keeps resolving.
pub fn substitute_issuer_name(text: &str, ctx: &PassContext<'_>) -> String {
    if ctx.project_name.is_empty() {
        return text.to_string();
    }
    let issuer = format!("{}-selfsigned-issuer", ctx.project_name);
    text.replace(&issuer, &format!("{CHART_NAME}-selfsigned-issuer"))
}

fn metrics_service_name() -> String {
    format!(
        "{{{{ include \"chart.serviceName\" (dict \"suffix\" \"{METRICS_SERVICE_SUFFIX}\" \"context\" .) }}}}"
    )
}

/// Rename a ServiceMonitor to `<chart name>-<suffix>`
///
/// Only names following the scaffolding convention (`<project>-...`, or
/// the bare `controller-manager-metrics-monitor`) are templated; anything
/// else was chosen by a user and is left alone.
pub fn template_service_monitor_name(text: &str, ctx: &PassContext<'_>) -> String {
    let name = ctx.resource.name();
    if name.is_empty() {
        return text.to_string();
    }

    let prefix = format!("{}-", ctx.project_name);
    let suffix = match name.strip_prefix(&prefix) {
        Some(suffix) if !ctx.project_name.is_empty() && !suffix.is_empty() => suffix,
        _ if name == METRICS_MONITOR_SUFFIX => name,
        _ => return text.to_string(),
    };

    let pattern = format!(r"(?m)^([ \t]*)name:[ \t]*{}[ \t]*$", regex::escape(name));
    let Ok(re) = Regex::new(&pattern) else {
        return text.to_string();
    };

    let templated = format!("{CHART_NAME}-{suffix}");
    re.replace_all(text, |caps: &Captures| format!("{}name: {}", &caps[1], templated))
        .into_owned()
}

/// `app.kubernetes.io/managed-by: kustomize` becomes the release service
pub fn template_managed_by(text: &str) -> String {
    MANAGED_BY_KUSTOMIZE
        .replace_all(text, "${1}app.kubernetes.io/managed-by: {{ .Release.Service }}")
        .into_owned()
}
