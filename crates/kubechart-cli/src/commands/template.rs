//! Template command - turn a kustomize build into Helm chart templates

use console::style;
use kubechart_core::{Document, ResourceDescriptor, split_documents};
use kubechart_templater::{HelmTemplater, TemplaterConfig};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::CliError;

/// Documents that made it through, and the ones that did not
#[derive(Debug, Default)]
struct Summary {
    templated: usize,
    elided: usize,
    skipped: usize,
}

pub fn run(
    input: &Path,
    project_name: Option<&str>,
    config: Option<&Path>,
    output_dir: Option<&Path>,
) -> Result<()> {
    let templater = build_templater(project_name, config)?;
    let manifest = read_input(input)?;

    let documents = split_documents(&manifest);
    if documents.is_empty() {
        return Err(CliError::input_with_help(
            format!("No documents found in {}", input.display()),
            "Pass the output of `kustomize build config/default`",
        )
        .into());
    }
    tracing::debug!(count = documents.len(), "split manifest stream");

    let mut summary = Summary::default();
    let mut rendered: Vec<(ResourceDescriptor, String)> = Vec::with_capacity(documents.len());

    for doc in &documents {
        let Some(descriptor) = describe(doc) else {
            summary.skipped += 1;
            continue;
        };

        let out = templater.apply(&doc.content, &descriptor);
        if out.trim().is_empty() {
            tracing::debug!(resource = %descriptor, "resource elided from chart");
            summary.elided += 1;
            continue;
        }

        summary.templated += 1;
        rendered.push((descriptor, out));
    }

    match output_dir {
        Some(dir) => write_templates(dir, &rendered)?,
        None => print_templates(&rendered),
    }

    eprintln!(
        "{} {} templated, {} elided, {} skipped",
        style("kubechart").cyan().bold(),
        style(summary.templated).green(),
        summary.elided,
        if summary.skipped > 0 {
            style(summary.skipped).yellow()
        } else {
            style(summary.skipped)
        },
    );

    Ok(())
}

fn build_templater(project_name: Option<&str>, config: Option<&Path>) -> Result<HelmTemplater> {
    let mut config = match config {
        Some(path) => TemplaterConfig::load_from(path)
            .map_err(|e| CliError::config(format!("{}: {}", path.display(), e)))?,
        None => {
            let Some(name) = project_name else {
                return Err(CliError::config_with_help(
                    "No project name given",
                    "Pass --project-name <NAME> or --config <FILE> with a projectName entry",
                )
                .into());
            };
            TemplaterConfig::new(name)
        }
    };

    if let Some(name) = project_name {
        config.project_name = name.to_string();
    }

    HelmTemplater::from_config(config).map_err(|e| CliError::config(e.to_string()).into())
}

fn read_input(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .into_diagnostic()
            .wrap_err("Failed to read manifest from stdin")?;
        return Ok(buf);
    }

    if !input.exists() {
        return Err(CliError::input_with_help(
            format!("Input not found: {}", input.display()),
            "Use - to read the manifest from stdin",
        )
        .into());
    }

    fs::read_to_string(input)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", input.display()))
}

fn describe(doc: &Document) -> Option<ResourceDescriptor> {
    match doc.descriptor() {
        Ok(descriptor) => Some(descriptor),
        Err(e) => {
            tracing::warn!("Skipping document: {}", e);
            None
        }
    }
}

/// `templates/<kind>/<name>.yaml`, relative to the chart root
///
/// Names that would escape the kind directory are rejected.
fn template_path(descriptor: &ResourceDescriptor) -> Result<PathBuf, CliError> {
    let name = descriptor.name.as_str();
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(CliError::input_with_help(
            format!("Cannot write {descriptor}: invalid file name {name:?}"),
            "Resource names must not contain path separators",
        ));
    }

    Ok(Path::new("templates")
        .join(descriptor.kind.to_lowercase())
        .join(format!("{name}.yaml")))
}

fn write_templates(dir: &Path, rendered: &[(ResourceDescriptor, String)]) -> Result<()> {
    let mut targets = HashSet::with_capacity(rendered.len());
    for (descriptor, _) in rendered {
        let path = template_path(descriptor)?;
        if !targets.insert(path) {
            return Err(CliError::input_with_help(
                format!("Duplicate resource {descriptor}"),
                "Each kind/name pair may appear only once when writing to --output-dir",
            )
            .into());
        }
    }

    fs::create_dir_all(dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to create output directory: {}", dir.display()))?;

    for (descriptor, content) in rendered {
        let file_path = dir.join(template_path(descriptor)?);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).into_diagnostic()?;
        }

        fs::write(&file_path, content)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to write {}", file_path.display()))?;

        println!("{} {}", style("wrote").green(), file_path.display());
    }
    Ok(())
}

fn print_templates(rendered: &[(ResourceDescriptor, String)]) {
    for (i, (_, content)) in rendered.iter().enumerate() {
        if i > 0 {
            println!("---");
        }
        print!("{content}");
    }
}
