//! cert-manager toggles inside the Deployment
//!
//! Certificate paths, secret volumes and their mounts only exist when
//! cert-manager issues the certificates, so each is guarded by the same
//! flag that guards the `Certificate` itself.

use crate::directive::Condition;
use crate::lines::{Block, BlockStyle, Line, leading_whitespace, locate_block};

use super::args::{METRICS_CERT_PATH, WEBHOOK_CERT_PATH};

/// Guard `- --webhook-cert-path=` and `- --metrics-cert-path=` args
pub fn guard_cert_path_args(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    for (i, raw) in lines.iter().enumerate() {
        let line = Line::parse(raw);
        let condition = match line.is_list_item.then(|| line.content()) {
            Some(flag) if flag.starts_with(&format!("{WEBHOOK_CERT_PATH}=")) => {
                Some(Condition::CertManager)
            }
            Some(flag) if flag.starts_with(&format!("{METRICS_CERT_PATH}=")) => {
                Some(Condition::CertManagerAndMetrics)
            }
            _ => None,
        };

        match condition {
            Some(condition) if !condition.guards(&lines, i) => {
                out.extend(condition.wrap_lines(leading_whitespace(raw), &[raw]));
            }
            _ => out.push((*raw).to_string()),
        }
    }
    out.join("\n")
}

/// Guards a whole list item recognized by its head and a terminating entry
///
/// `head` must be the entry on the item's `- ` line; `terminator` must
/// appear somewhere in the item's body.
#[derive(Debug, Clone, Copy)]
pub struct ItemGuard {
    head: (&'static str, &'static str),
    terminator: (&'static str, &'static str),
    condition: Condition,
}

pub const WEBHOOK_VOLUME_MOUNT: ItemGuard = ItemGuard {
    head: ("mountPath", "/tmp/k8s-webhook-server/serving-certs"),
    terminator: ("readOnly", "true"),
    condition: Condition::CertManager,
};

pub const WEBHOOK_VOLUME: ItemGuard = ItemGuard {
    head: ("name", "webhook-certs"),
    terminator: ("secretName", "webhook-server-cert"),
    condition: Condition::CertManager,
};

pub const METRICS_VOLUME_MOUNT: ItemGuard = ItemGuard {
    head: ("mountPath", "/tmp/k8s-metrics-server/metrics-certs"),
    terminator: ("readOnly", "true"),
    condition: Condition::CertManagerAndMetrics,
};

pub const METRICS_VOLUME: ItemGuard = ItemGuard {
    head: ("name", "metrics-certs"),
    terminator: ("secretName", "metrics-server-cert"),
    condition: Condition::CertManagerAndMetrics,
};

impl ItemGuard {
    pub fn apply(&self, text: &str) -> String {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut out: Vec<String> = Vec::with_capacity(lines.len());

        let mut i = 0;
        while i < lines.len() {
            match self.item_at(&lines, i) {
                Some(block) => {
                    let indent = leading_whitespace(lines[i]);
                    out.extend(self.condition.wrap_lines(indent, &lines[block.span()]));
                    i = block.end;
                }
                None => {
                    out.push(lines[i].to_string());
                    i += 1;
                }
            }
        }
        out.join("\n")
    }

    /// The unguarded item starting at `i`, if it is one this guard targets
    fn item_at(&self, lines: &[&str], i: usize) -> Option<Block> {
        let line = Line::parse(lines[i]);
        let (key, value) = self.head;
        if !line.is_list_item || !line.is_entry(key, value) || self.condition.guards(lines, i) {
            return None;
        }

        let block = locate_block(lines, i, BlockStyle::Item);
        let (key, value) = self.terminator;
        lines[block.body()]
            .iter()
            .any(|raw| Line::parse(raw).is_entry(key, value))
            .then_some(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_cert_path_args() {
        let text = "\
        - --health-probe-bind-address=:8081
        - --webhook-cert-path=/tmp/k8s-webhook-server/serving-certs
        - --metrics-cert-path=/tmp/k8s-metrics-server/metrics-certs
        command:";
        let out = guard_cert_path_args(text);
        assert_eq!(
            out,
            "\
- --health-probe-bind-address=:8081
        {{- if .Values.certManager.enable }}
        - --webhook-cert-path=/tmp/k8s-webhook-server/serving-certs
        {{- end }}
        {{- if and .Values.certManager.enable .Values.metrics.enable }}
        - --metrics-cert-path=/tmp/k8s-metrics-server/metrics-certs
        {{- end }}
        command:"
        );
        assert_eq!(guard_cert_path_args(&out), out);
    }

    #[test]
    fn test_guard_cert_path_ignores_non_items() {
        let text = "  # --webhook-cert-path=/tmp\n";
        assert_eq!(guard_cert_path_args(text), text);
    }

    #[test]
    fn test_webhook_volume_mount() {
        let text = "\
        volumeMounts:
        - mountPath: /tmp/k8s-webhook-server/serving-certs
          name: webhook-certs
          readOnly: true
      securityContext: {}
";
        let out = WEBHOOK_VOLUME_MOUNT.apply(text);
        assert_eq!(
            out,
            "\
volumeMounts:
        {{- if .Values.certManager.enable }}
        - mountPath: /tmp/k8s-webhook-server/serving-certs
          name: webhook-certs
          readOnly: true
        {{- end }}
      securityContext: {}
"
        );
        assert_eq!(WEBHOOK_VOLUME_MOUNT.apply(&out), out);
    }

    #[test]
    fn test_volumes() {
        let text = "      volumes:
      - name: webhook-certs
        secret:
          secretName: webhook-server-cert
      - name: metrics-certs
        secret:
          optional: false
          secretName: metrics-server-cert
";
        let out = METRICS_VOLUME.apply(&WEBHOOK_VOLUME.apply(text));
        assert_eq!(
            out,
            "      volumes:
      {{- if .Values.certManager.enable }}
      - name: webhook-certs
        secret:
          secretName: webhook-server-cert
      {{- end }}
      {{- if and .Values.certManager.enable .Values.metrics.enable }}
      - name: metrics-certs
        secret:
          optional: false
          secretName: metrics-server-cert
      {{- end }}
"
        );
    }

    #[test]
    fn test_volume_without_terminator_untouched() {
        let text = "      - name: webhook-certs\n        emptyDir: {}\n";
        assert_eq!(WEBHOOK_VOLUME.apply(text), text);
    }

    #[test]
    fn test_volume_head_must_be_dash_line() {
        let text = "        - mountPath: /tmp/k8s-webhook-server/serving-certs\n          name: webhook-certs\n          readOnly: true\n";
        assert_eq!(WEBHOOK_VOLUME.apply(text), text);
    }
}
