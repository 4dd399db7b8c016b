//! Artifact emission and post-generation validation helpers
//!
//! All adapters write through `write_artifact` and check their output
//! through `check_artifact`, so filesystem failure handling and the
//! minimal-well-formedness rules live in one place.

use gateway_config_gen_common::{GatewayError, Result, ValidationReport};
use std::fs;
use std::path::{Path, PathBuf};

/// Expected on-disk format of an emitted artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Yaml,
    /// Script; must start with a shebang line
    Shell,
    Xml,
    /// Free-form text; only the non-empty check applies
    Text,
}

/// Write one artifact under `dir`, creating the directory if needed
pub fn write_artifact(
    provider: &str,
    dir: &Path,
    file_name: &str,
    content: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| GatewayError::Generation {
        provider: provider.to_string(),
        message: format!("failed to create {}: {}", dir.display(), e),
    })?;

    let path = dir.join(file_name);
    fs::write(&path, content).map_err(|e| GatewayError::Generation {
        provider: provider.to_string(),
        message: format!("failed to write {}: {}", path.display(), e),
    })?;

    Ok(path)
}

/// Pretty-print a JSON artifact body with a trailing newline
///
/// Maps are BTreeMap-backed, so the output is byte-deterministic.
pub fn to_pretty_json(provider: &str, value: &serde_json::Value) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map(|s| s + "\n")
        .map_err(|e| GatewayError::Generation {
            provider: provider.to_string(),
            message: format!("failed to serialize JSON artifact: {}", e),
        })
}

/// Serialize a YAML artifact body
pub fn to_yaml_string(provider: &str, value: &serde_json::Value) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| GatewayError::Generation {
        provider: provider.to_string(),
        message: format!("failed to serialize YAML artifact: {}", e),
    })
}

/// Check one emitted artifact: present, non-empty, minimally well-formed
pub fn check_artifact(
    provider: &str,
    name: &str,
    path: &Path,
    format: ArtifactFormat,
    report: &mut ValidationReport,
) {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            report.error(format!(
                "[{}] artifact `{}` unreadable at {}: {}",
                provider,
                name,
                path.display(),
                e
            ));
            return;
        }
    };

    if content.trim().is_empty() {
        report.error(format!(
            "[{}] artifact `{}` is empty: {}",
            provider,
            name,
            path.display()
        ));
        return;
    }

    match format {
        ArtifactFormat::Json => {
            if let Err(e) = serde_json::from_str::<serde_json::Value>(&content) {
                report.error(format!(
                    "[{}] artifact `{}` is not valid JSON: {}",
                    provider, name, e
                ));
            }
        }
        ArtifactFormat::Yaml => {
            if let Err(e) = serde_yaml::from_str::<serde_yaml::Value>(&content) {
                report.error(format!(
                    "[{}] artifact `{}` is not valid YAML: {}",
                    provider, name, e
                ));
            }
        }
        ArtifactFormat::Shell => {
            if !content.starts_with("#!") {
                report.error(format!(
                    "[{}] artifact `{}` is missing a shebang line: {}",
                    provider,
                    name,
                    path.display()
                ));
            }
        }
        ArtifactFormat::Xml => {
            if !content.trim_start().starts_with('<') {
                report.error(format!(
                    "[{}] artifact `{}` does not look like XML: {}",
                    provider,
                    name,
                    path.display()
                ));
            }
        }
        ArtifactFormat::Text => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("aws");
        let path = write_artifact("aws", &nested, "template.json", "{}").unwrap();
        assert!(path.exists());
        assert_eq!(fs::read_to_string(path).unwrap(), "{}");
    }

    #[test]
    fn test_check_flags_missing_and_empty() {
        let dir = TempDir::new().unwrap();
        let mut report = ValidationReport::new();

        check_artifact(
            "aws",
            "template",
            &dir.path().join("absent.json"),
            ArtifactFormat::Json,
            &mut report,
        );
        assert!(report.has_errors());

        let empty = dir.path().join("empty.json");
        fs::write(&empty, "  \n").unwrap();
        let mut report = ValidationReport::new();
        check_artifact("aws", "template", &empty, ArtifactFormat::Json, &mut report);
        assert!(report.has_errors());
        assert!(report.error_messages()[0].contains("empty"));
    }

    #[test]
    fn test_check_format_rules() {
        let dir = TempDir::new().unwrap();

        let bad_json = dir.path().join("bad.json");
        fs::write(&bad_json, "{ not json").unwrap();
        let mut report = ValidationReport::new();
        check_artifact("aws", "template", &bad_json, ArtifactFormat::Json, &mut report);
        assert!(report.has_errors());

        let script = dir.path().join("deploy.sh");
        fs::write(&script, "echo no shebang\n").unwrap();
        let mut report = ValidationReport::new();
        check_artifact("aws", "deploy-script", &script, ArtifactFormat::Shell, &mut report);
        assert!(report.error_messages()[0].contains("shebang"));

        let good_script = dir.path().join("deploy2.sh");
        fs::write(&good_script, "#!/usr/bin/env bash\n").unwrap();
        let mut report = ValidationReport::new();
        check_artifact(
            "aws",
            "deploy-script",
            &good_script,
            ArtifactFormat::Shell,
            &mut report,
        );
        assert!(report.is_empty());
    }
}
