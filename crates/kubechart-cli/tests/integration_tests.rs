//! Integration tests for CLI commands

use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

/// Helper to run kubechart command
fn kubechart(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_kubechart"))
        .args(args)
        .env_remove("KUBECHART_PROJECT_NAME")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute kubechart")
}

/// Get the fixture manifest path
fn install_yaml() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures/kustomize/install.yaml")
}

mod template_command {
    use super::*;

    #[test]
    fn test_template_to_stdout() {
        let output = kubechart(&["template", install_yaml(), "--project-name", "myproj"]);

        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("{{- if .Values.crd.enable }}"));
        assert!(stdout.contains("namespace: {{ .Release.Namespace }}"));
        assert!(!stdout.contains("kind: Namespace"));
        assert_eq!(stdout.lines().filter(|l| *l == "---").count(), 12);

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("13 templated, 1 elided, 0 skipped"));
    }

    #[test]
    fn test_template_to_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let output = kubechart(&[
            "template",
            install_yaml(),
            "--project-name",
            "myproj",
            "--output-dir",
            dir.path().to_str().unwrap(),
        ]);
        assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

        let templates = dir.path().join("templates");
        let deployment = fs::read_to_string(templates.join("deployment/myproj-controller-manager.yaml")).unwrap();
        assert!(deployment.contains("{{- range .Values.controllerManager.args }}"));

        let monitor = fs::read_to_string(
            templates.join("servicemonitor/myproj-controller-manager-metrics-monitor.yaml"),
        )
        .unwrap();
        assert!(monitor.starts_with("{{- if .Values.prometheus.enable }}\n"));

        assert!(!templates.join("namespace").exists());
        assert!(templates.join("customresourcedefinition/guestbooks.webapp.example.com.yaml").exists());
    }

    #[test]
    fn test_template_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("kubechart.yaml");
        fs::write(&config, "projectName: myproj\n").unwrap();

        let output = kubechart(&["template", install_yaml(), "--config", config.to_str().unwrap()]);
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(!stdout.contains("myproj-system"));
    }

    #[test]
    fn test_template_from_stdin() {
        let mut child = Command::new(env!("CARGO_BIN_EXE_kubechart"))
            .args(["template", "-", "--project-name", "myproj"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to execute kubechart");

        child
            .stdin
            .take()
            .unwrap()
            .write_all(b"apiVersion: v1\nkind: Service\nmetadata:\n  name: myproj-metrics-service\n  namespace: myproj-system\n")
            .unwrap();

        let output = child.wait_with_output().unwrap();
        assert!(output.status.success());
        assert_eq!(
            String::from_utf8_lossy(&output.stdout),
            "{{- if .Values.metrics.enable }}\napiVersion: v1\nkind: Service\nmetadata:\n  name: myproj-metrics-service\n  namespace: {{ .Release.Namespace }}\n{{- end }}\n"
        );
    }

    #[test]
    fn test_undescribable_document_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.yaml");
        fs::write(&input, "foo: bar\n---\napiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cm\n").unwrap();

        let output = kubechart(&["template", input.to_str().unwrap(), "--project-name", "myproj"]);
        assert!(output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("1 templated, 0 elided, 1 skipped"));
    }

    #[test]
    fn test_missing_project_name() {
        let output = kubechart(&["template", install_yaml()]);
        assert_eq!(output.status.code(), Some(3));
    }

    #[test]
    fn test_missing_input() {
        let output = kubechart(&["template", "does-not-exist.yaml", "--project-name", "myproj"]);
        assert_eq!(output.status.code(), Some(2));
    }

    #[test]
    fn test_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.yaml");
        fs::write(&input, "# nothing here\n---\n").unwrap();

        let output = kubechart(&["template", input.to_str().unwrap(), "--project-name", "myproj"]);
        assert_eq!(output.status.code(), Some(2));
    }
}
