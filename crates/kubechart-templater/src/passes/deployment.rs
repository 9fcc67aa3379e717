//! Controller-manager Deployment fields exposed through values
//!
//! Every pass here works inside the `manager` container (found with
//! [`container_scope`]) except the pod security context, which sits on the
//! pod spec next to `serviceAccountName`.

use crate::directive::{ELSE, END, Probe, open_if};
use crate::lines::{BlockStyle, Line, container_scope, locate_block, pad, splice};

/// Name of the container the values target
pub const MANAGER_CONTAINER: &str = "manager";

const IMAGE_REPOSITORY: &str = ".Values.controllerManager.image.repository";

/// A key whose value is replaced by a values lookup with a literal fallback
struct ValuesBlock {
    key: &'static str,
    path: &'static str,
    fallback: &'static str,
    style: BlockStyle,
    probe: Probe,
}

const ENV: ValuesBlock = ValuesBlock {
    key: "env",
    path: ".Values.controllerManager.env",
    fallback: "[]",
    style: BlockStyle::Sequence,
    probe: Probe::new(".Values.controllerManager.env"),
};

const RESOURCES: ValuesBlock = ValuesBlock {
    key: "resources",
    path: ".Values.controllerManager.resources",
    fallback: "{}",
    style: BlockStyle::Mapping,
    probe: Probe::new(".Values.controllerManager.resources"),
};

const POD_SECURITY_CONTEXT: ValuesBlock = ValuesBlock {
    key: "securityContext",
    path: ".Values.controllerManager.podSecurityContext",
    fallback: "{}",
    style: BlockStyle::Mapping,
    probe: Probe::new(".Values.controllerManager.podSecurityContext"),
};

const CONTAINER_SECURITY_CONTEXT: ValuesBlock = ValuesBlock {
    key: "securityContext",
    path: ".Values.controllerManager.securityContext",
    fallback: "{}",
    style: BlockStyle::Mapping,
    probe: Probe::new(".Values.controllerManager.securityContext").lookahead(5),
};

impl ValuesBlock {
    /// Replace the block keyed at `at`, unless it was already templated
    fn rewrite(&self, lines: &[&str], at: usize) -> Option<String> {
        let block = locate_block(lines, at, self.style);
        if self.probe.found(lines, &block) {
            return None;
        }
        let line = Line::parse(lines[at]);
        let prefix = key_prefix(lines[at]);
        Some(splice(lines, block.span(), &self.render(prefix, line.column())))
    }

    /// Insert a fresh block at `at`, with the key at `column`
    fn insert(&self, lines: &[&str], at: usize, column: usize) -> String {
        splice(lines, at..at, &self.render(&pad(column), column))
    }

    fn render(&self, prefix: &str, column: usize) -> Vec<String> {
        let width = column + 2;
        let child = pad(width);
        vec![
            format!("{prefix}{}:", self.key),
            format!("{child}{}", open_if(self.path)),
            format!("{child}{{{{- toYaml {} | nindent {width} }}}}", self.path),
            format!("{child}{ELSE}"),
            format!("{child}{}", self.fallback),
            format!("{child}{END}"),
        ]
    }
}

/// Indentation plus any `- ` marker in front of a key
fn key_prefix(raw: &str) -> &str {
    let line = Line::parse(raw);
    &raw[..line.column()]
}

/// Manager container lines plus the column its keys start at
pub(super) struct Container<'l, 'a> {
    lines: &'l [&'a str],
    pub(super) start: usize,
    pub(super) end: usize,
    pub(super) column: usize,
}

impl<'l, 'a> Container<'l, 'a> {
    pub(super) fn manager(lines: &'l [&'a str]) -> Option<Self> {
        let scope = container_scope(lines, MANAGER_CONTAINER)?;
        let column = Line::parse(lines[scope.start]).column();
        Some(Self {
            lines,
            start: scope.start,
            end: scope.end,
            column,
        })
    }

    /// First direct key of the container named `key`
    pub(super) fn key(&self, key: &str) -> Option<usize> {
        (self.start..self.end).find(|&i| {
            let line = Line::parse(self.lines[i]);
            line.column() == self.column && line.has_key(key)
        })
    }
}

/// Point the manager image at values and set its pull policy
pub fn template_image(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let Some(container) = Container::manager(&lines) else {
        return text.to_string();
    };
    let Some(at) = container.key("image") else {
        return text.to_string();
    };
    if lines[at].contains(IMAGE_REPOSITORY) {
        return text.to_string();
    }

    let prefix = key_prefix(lines[at]);
    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 1);
    for (i, raw) in lines.iter().enumerate() {
        if i == at {
            out.push(format!(
                "{prefix}image: \"{{{{ {IMAGE_REPOSITORY} }}}}:{{{{ .Values.controllerManager.image.tag }}}}\""
            ));
            out.push(format!(
                "{}imagePullPolicy: {{{{ .Values.controllerManager.image.pullPolicy }}}}",
                pad(container.column)
            ));
            continue;
        }
        if (container.start..container.end).contains(&i) {
            let line = Line::parse(raw);
            if !line.is_list_item
                && line.column() == container.column
                && line.has_key("imagePullPolicy")
            {
                continue;
            }
        }
        out.push((*raw).to_string());
    }
    out.join("\n")
}

/// Replace the manager `env:` list, adding one if the container has none
pub fn template_env(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let Some(container) = Container::manager(&lines) else {
        return text.to_string();
    };
    match container.key(ENV.key) {
        Some(at) => ENV.rewrite(&lines, at).unwrap_or_else(|| text.to_string()),
        None => ENV.insert(&lines, container.end, container.column),
    }
}

/// Replace the manager `resources:` mapping
pub fn template_resources(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    Container::manager(&lines)
        .and_then(|container| container.key(RESOURCES.key))
        .and_then(|at| RESOURCES.rewrite(&lines, at))
        .unwrap_or_else(|| text.to_string())
}

/// Replace the manager container's own `securityContext:`
pub fn template_container_security_context(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    Container::manager(&lines)
        .and_then(|container| container.key(CONTAINER_SECURITY_CONTEXT.key))
        .filter(|&at| !followed_by_service_account(&lines, at))
        .and_then(|at| CONTAINER_SECURITY_CONTEXT.rewrite(&lines, at))
        .unwrap_or_else(|| text.to_string())
}

/// Replace the pod-level `securityContext:`
///
/// The pod context is recognized by the `serviceAccountName:` key that
/// kustomize sorts right after it.
pub fn template_pod_security_context(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let candidate = (0..lines.len()).find(|&i| {
        let line = Line::parse(lines[i]);
        !line.is_list_item
            && line.has_key(POD_SECURITY_CONTEXT.key)
            && followed_by_service_account(&lines, i)
    });

    candidate
        .and_then(|at| POD_SECURITY_CONTEXT.rewrite(&lines, at))
        .unwrap_or_else(|| text.to_string())
}

fn followed_by_service_account(lines: &[&str], at: usize) -> bool {
    let block = locate_block(lines, at, BlockStyle::Mapping);
    lines.get(block.end).is_some_and(|raw| {
        let line = Line::parse(raw);
        line.indent == block.indent && line.has_key("serviceAccountName")
    })
}
