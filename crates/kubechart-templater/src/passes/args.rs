//! Controller-manager command line
//!
//! The scaffolded `args:` list mixes flags the chart must own (metrics and
//! health endpoints, certificate paths) with flags users tune. The list is
//! rebuilt so the owned flags stay literal and everything else comes from
//! `.Values.controllerManager.args`.

use crate::directive::{Condition, ELSE, END, Probe};
use crate::lines::{BlockStyle, Line, leading_whitespace, locate_block, pad, splice};

use super::deployment::Container;

const ARGS_PROBE: Probe = Probe::new(".Values.controllerManager.args");

const METRICS_BIND_ADDRESS: &str = "--metrics-bind-address";
const HEALTH_PROBE_BIND_ADDRESS: &str = "--health-probe-bind-address";
pub const WEBHOOK_CERT_PATH: &str = "--webhook-cert-path";
pub const METRICS_CERT_PATH: &str = "--metrics-cert-path";

/// How a single `- --flag` item is carried into the rebuilt list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgKind {
    MetricsBind,
    HealthProbe,
    CertPath,
    User,
}

impl ArgKind {
    fn classify(item: &str) -> Self {
        if item.contains(METRICS_BIND_ADDRESS) {
            Self::MetricsBind
        } else if item.contains(HEALTH_PROBE_BIND_ADDRESS) {
            Self::HealthProbe
        } else if item.contains(WEBHOOK_CERT_PATH) || item.contains(METRICS_CERT_PATH) {
            Self::CertPath
        } else {
            Self::User
        }
    }
}

/// Rebuild the manager's `args:` list
///
/// Output order: the metrics bind address under a `metrics.enable` guard
/// (binding `:0` otherwise), the health probe address, a range over the
/// values-supplied args, then any certificate path flags.
pub fn template_controller_manager_args(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let Some(container) = Container::manager(&lines) else {
        return text.to_string();
    };
    let Some(at) = container.key("args") else {
        return text.to_string();
    };

    let block = locate_block(&lines, at, BlockStyle::Sequence);
    if block.is_empty() || ARGS_PROBE.found(&lines, &block) {
        return text.to_string();
    }

    let mut metrics: Option<&str> = None;
    let mut health: Option<&str> = None;
    let mut preserved: Vec<&str> = Vec::new();
    let mut item_indent: Option<&str> = None;

    for &raw in &lines[block.body()] {
        let line = Line::parse(raw);
        if !line.is_list_item {
            continue;
        }
        item_indent.get_or_insert(leading_whitespace(raw));

        match ArgKind::classify(line.content()) {
            ArgKind::MetricsBind => metrics = Some(raw),
            ArgKind::HealthProbe => health = Some(raw),
            ArgKind::CertPath => preserved.push(raw),
            ArgKind::User => {}
        }
    }

    let fallback_indent = pad(block.indent + 2);
    let item_indent = item_indent.unwrap_or(&fallback_indent);

    let mut rebuilt: Vec<String> = vec![lines[at].to_string()];
    if let Some(raw) = metrics {
        let mi = leading_whitespace(raw);
        rebuilt.push(format!("{mi}{}", Condition::Metrics.open()));
        rebuilt.push(raw.to_string());
        rebuilt.push(format!("{mi}{ELSE}"));
        rebuilt.push(format!(
            "{mi}# Bind to :0 to disable the controller-runtime managed metrics server"
        ));
        rebuilt.push(format!("{mi}- {METRICS_BIND_ADDRESS}=0"));
        rebuilt.push(format!("{mi}{END}"));
    }
    if let Some(raw) = health {
        rebuilt.push(raw.to_string());
    }
    rebuilt.push(format!("{item_indent}{{{{- range {} }}}}", ARGS_PROBE.marker()));
    rebuilt.push(format!("{item_indent}- {{{{ . }}}}"));
    rebuilt.push(format!("{item_indent}{END}"));
    rebuilt.extend(preserved.iter().map(|raw| raw.to_string()));

    splice(&lines, block.span(), &rebuilt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(ArgKind::classify("--metrics-bind-address=:8443"), ArgKind::MetricsBind);
        assert_eq!(ArgKind::classify("--health-probe-bind-address=:8081"), ArgKind::HealthProbe);
        assert_eq!(
            ArgKind::classify("--webhook-cert-path=/tmp/k8s-webhook-server/serving-certs"),
            ArgKind::CertPath
        );
        assert_eq!(
            ArgKind::classify("--metrics-cert-path=/tmp/k8s-metrics-server/metrics-certs"),
            ArgKind::CertPath
        );
        assert_eq!(ArgKind::classify("--leader-elect"), ArgKind::User);
    }

    #[test]
    fn test_template_args() {
        let text = "\
      containers:
      - args:
        - --metrics-bind-address=:8443
        - --leader-elect
        - --health-probe-bind-address=:8081
        - --webhook-cert-path=/tmp/k8s-webhook-server/serving-certs
        command:
        - /manager
        name: manager
";
        let out = template_controller_manager_args(text);
        assert_eq!(
            out,
            "\
      containers:
      - args:
        {{- if .Values.metrics.enable }}
        - --metrics-bind-address=:8443
        {{- else }}
        # Bind to :0 to disable the controller-runtime managed metrics server
        - --metrics-bind-address=0
        {{- end }}
        - --health-probe-bind-address=:8081
        {{- range .Values.controllerManager.args }}
        - {{ . }}
        {{- end }}
        - --webhook-cert-path=/tmp/k8s-webhook-server/serving-certs
        command:
        - /manager
        name: manager
"
        );
        assert_eq!(template_controller_manager_args(&out), out);
    }

    #[test]
    fn test_template_args_without_owned_flags() {
        let text = "      - args:\n        - --leader-elect\n        name: manager\n";
        let out = template_controller_manager_args(text);
        assert_eq!(
            out,
            "      - args:\n        {{- range .Values.controllerManager.args }}\n        - {{ . }}\n        {{- end }}\n        name: manager\n"
        );
    }

    #[test]
    fn test_template_args_needs_manager() {
        let text = "      - args:\n        - --verbose\n        name: proxy\n";
        assert_eq!(template_controller_manager_args(text), text);
    }
}
