//! Helm guard directives and re-entry probes
//!
//! The templater only knows directives as literal lines it writes and
//! substrings it looks for. Every rewrite that inserts one first asks a
//! [`Probe`] whether its own output is already there, which is what makes
//! running the templater twice a no-op.

use crate::lines::{Block, Line};

pub const ELSE: &str = "{{- else }}";
pub const END: &str = "{{- end }}";

/// Feature flag a guard is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Crd,
    CertManager,
    Metrics,
    CertManagerAndMetrics,
    Prometheus,
    RbacHelpers,
}

impl Condition {
    /// Template expression tested by the guard
    pub fn expr(self) -> &'static str {
        match self {
            Self::Crd => ".Values.crd.enable",
            Self::CertManager => ".Values.certManager.enable",
            Self::Metrics => ".Values.metrics.enable",
            Self::CertManagerAndMetrics => "and .Values.certManager.enable .Values.metrics.enable",
            Self::Prometheus => ".Values.prometheus.enable",
            Self::RbacHelpers => ".Values.rbacHelpers.enable",
        }
    }

    /// Opening directive, without indentation
    pub fn open(self) -> String {
        open_if(self.expr())
    }

    /// Wrap `body` lines in this guard, placing both directives at `indent`
    pub fn wrap_lines<S: AsRef<str>>(self, indent: &str, body: &[S]) -> Vec<String> {
        let mut out = Vec::with_capacity(body.len() + 2);
        out.push(format!("{indent}{}", self.open()));
        out.extend(body.iter().map(|l| l.as_ref().to_string()));
        out.push(format!("{indent}{END}"));
        out
    }

    /// Whether the line right above `at` opens this guard
    pub fn guards(self, lines: &[&str], at: usize) -> bool {
        at > 0 && Line::parse(lines[at - 1]).trimmed == self.open()
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.expr())
    }
}

/// `{{- if <expr> }}`
pub fn open_if(expr: &str) -> String {
    format!("{{{{- if {expr} }}}}")
}

/// Looks for a rewrite's output marker around a block
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    marker: &'static str,
    lookahead: usize,
}

impl Probe {
    pub const fn new(marker: &'static str) -> Self {
        Self {
            marker,
            lookahead: 0,
        }
    }

    /// Also scan `lines` past the end of the block
    pub const fn lookahead(mut self, lines: usize) -> Self {
        self.lookahead = lines;
        self
    }

    pub fn marker(&self) -> &'static str {
        self.marker
    }

    /// Whether the marker already appears in the block or the window after it
    pub fn found(&self, lines: &[&str], block: &Block) -> bool {
        let stop = (block.end + self.lookahead).min(lines.len());
        lines[block.start..stop]
            .iter()
            .any(|line| line.contains(self.marker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::{BlockStyle, locate_block};

    #[test]
    fn test_open() {
        assert_eq!(Condition::Crd.open(), "{{- if .Values.crd.enable }}");
        assert_eq!(
            Condition::CertManagerAndMetrics.open(),
            "{{- if and .Values.certManager.enable .Values.metrics.enable }}"
        );
        assert_eq!(
            open_if(".Values.controllerManager.env"),
            "{{- if .Values.controllerManager.env }}"
        );
    }

    #[test]
    fn test_wrap_lines() {
        let out = Condition::CertManager.wrap_lines("  ", &["  a: 1"]);
        assert_eq!(
            out,
            vec![
                "  {{- if .Values.certManager.enable }}",
                "  a: 1",
                "  {{- end }}",
            ]
        );
    }

    #[test]
    fn test_guards() {
        let lines = vec!["    {{- if .Values.certManager.enable }}", "    - --x"];
        assert!(Condition::CertManager.guards(&lines, 1));
        assert!(!Condition::Metrics.guards(&lines, 1));
        assert!(!Condition::CertManager.guards(&lines, 0));
    }

    #[test]
    fn test_probe_lookahead() {
        let lines = vec![
            "securityContext:",
            "  runAsNonRoot: true",
            "name: manager",
            "# .Values.controllerManager.securityContext",
        ];
        let block = locate_block(&lines, 0, BlockStyle::Mapping);
        let probe = Probe::new(".Values.controllerManager.securityContext");
        assert!(!probe.found(&lines, &block));
        assert!(probe.lookahead(2).found(&lines, &block));
        assert!(probe.lookahead(50).found(&lines, &block));
    }
}
