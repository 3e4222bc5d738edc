//! Workflow document loading: fetch, verify, parse

use crate::config::{DocumentLocation, HttpSettings, ToolError, WorkflowDefinition};
use serde_yaml::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a workflow document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowSource {
    File(PathBuf),
    Url(String),
}

impl WorkflowSource {
    /// Interpret a command-line or step location
    ///
    /// `http://` and `https://` locations are URLs; anything else is a path,
    /// with a leading `~` expanded.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::File(PathBuf::from(shellexpand::tilde(location).as_ref()))
        }
    }
}

impl fmt::Display for WorkflowSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowSource::File(path) => write!(f, "{}", path.display()),
            WorkflowSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Load, verify and parse a workflow
///
/// When `integrity` is given the raw bytes are checked before anything is
/// parsed, so an unverified document never yields a definition.
pub async fn load(
    source: &WorkflowSource,
    integrity: Option<&str>,
    client: &reqwest::Client,
) -> Result<WorkflowDefinition, ToolError> {
    let bytes = match source {
        WorkflowSource::File(path) => read_file(path).await?,
        WorkflowSource::Url(url) => fetch_remote(client, url).await?,
    };

    if let Some(expected) = integrity {
        verify_integrity(&bytes, expected)?;
    }

    parse_definition(&bytes)
}

async fn read_file(path: &Path) -> Result<Vec<u8>, ToolError> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            ToolError::usage(format!("workflow file '{}' not found", path.display()))
        }
        _ => ToolError::execution(format!("failed to read {}: {}", path.display(), e)),
    })
}

/// HTTP client for workflow downloads; honors the system proxy settings
pub fn http_client(http: &HttpSettings) -> Result<reqwest::Client, ToolError> {
    reqwest::Client::builder()
        .user_agent(http.user_agent.as_str())
        .build()
        .map_err(|e| ToolError::execution(format!("failed to create HTTP client: {}", e)))
}

/// Download a workflow document; anything but `200 OK` is an error
pub async fn fetch_remote(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, ToolError> {
    tracing::debug!(url = %url, "Fetching workflow");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ToolError::execution(format!("failed to fetch {}: {}", url, e)))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(ToolError::execution(format!(
            "failed to fetch {}: HTTP {}",
            url, status
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| ToolError::execution(format!("failed to read {}: {}", url, e)))?;
    Ok(body.to_vec())
}

/// Lowercase hex SHA-256 digest
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Check raw document bytes against an expected SHA-256 digest
pub fn verify_integrity(bytes: &[u8], expected: &str) -> Result<(), ToolError> {
    let expected = expected.trim().to_ascii_lowercase();
    let actual = sha256_hex(bytes);
    if actual != expected {
        return Err(ToolError::Integrity { expected, actual });
    }
    Ok(())
}

/// Parse workflow YAML into a definition
pub fn parse_definition(bytes: &[u8]) -> Result<WorkflowDefinition, ToolError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ToolError::definition(format!("workflow is not UTF-8: {}", e), None))?;

    let document: Value = serde_yaml::from_str(text).map_err(yaml_error)?;
    let Value::Mapping(root) = &document else {
        return Err(ToolError::definition("workflow root must be a mapping", None));
    };
    match root.get("steps") {
        Some(Value::Sequence(_)) => {}
        Some(_) => return Err(ToolError::definition("'steps' must be a sequence", None)),
        None => return Err(ToolError::definition("workflow has no 'steps'", None)),
    }

    // Reparse from text so shape errors keep their position
    serde_yaml::from_str(text).map_err(yaml_error)
}

fn yaml_error(e: serde_yaml::Error) -> ToolError {
    let location = e.location().map(|l| DocumentLocation {
        line: l.line(),
        column: l.column(),
    });
    ToolError::definition(e.to_string(), location)
}


#[cfg(test)]
mod tests {
    use super::testing::{local_client, serve_once};
    use super::*;
    use crate::config::ErrorClass;
    use tempfile::TempDir;

    const WORKFLOW: &str = "parameters:\n  name: sbom\nsteps:\n  - command: print\n";

    #[test]
    fn test_source_parse() {
        assert_eq!(
            WorkflowSource::parse("https://example.com/wf.yaml"),
            WorkflowSource::Url("https://example.com/wf.yaml".into())
        );
        assert_eq!(
            WorkflowSource::parse("flows/build.yaml"),
            WorkflowSource::File(PathBuf::from("flows/build.yaml"))
        );
        assert_eq!(
            WorkflowSource::parse("flows/build.yaml").to_string(),
            "flows/build.yaml"
        );
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_verify_integrity() {
        let digest = sha256_hex(WORKFLOW.as_bytes());
        assert!(verify_integrity(WORKFLOW.as_bytes(), &digest).is_ok());
        assert!(verify_integrity(WORKFLOW.as_bytes(), &digest.to_uppercase()).is_ok());

        let err = verify_integrity(WORKFLOW.as_bytes(), &"0".repeat(64)).unwrap_err();
        assert_eq!(err.class(), ErrorClass::Integrity);
    }

    #[test]
    fn test_parse_definition() {
        let definition = parse_definition(WORKFLOW.as_bytes()).unwrap();
        assert_eq!(definition.parameters["name"], "sbom");
        assert_eq!(definition.steps.len(), 1);
        assert_eq!(definition.steps[0].command, "print");
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        for (yaml, expected) in [
            ("- just\n- a list\n", "root must be a mapping"),
            ("", "root must be a mapping"),
            ("parameters: {}\n", "no 'steps'"),
            ("steps: print\n", "must be a sequence"),
        ] {
            let err = parse_definition(yaml.as_bytes()).unwrap_err();
            assert_eq!(err.class(), ErrorClass::Definition, "{}", yaml);
            assert!(err.to_string().contains(expected), "{}: {}", yaml, err);
        }
    }

    #[test]
    fn test_parse_error_has_location() {
        let yaml = "steps:\n  - command: print\n    unexpected: true\n";
        let err = parse_definition(yaml.as_bytes()).unwrap_err();
        match err {
            ToolError::Definition { location, .. } => {
                let location = location.expect("location");
                assert_eq!(location.line, 3);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wf.yaml");
        std::fs::write(&path, WORKFLOW).unwrap();

        let source = WorkflowSource::File(path);
        let definition = load(&source, None, &local_client()).await.unwrap();
        assert_eq!(definition.steps.len(), 1);

        let digest = sha256_hex(WORKFLOW.as_bytes());
        assert!(
            load(&source, Some(&digest), &local_client())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_integrity_checked_before_parse() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "this: [is not: valid").unwrap();

        let source = WorkflowSource::File(path);
        let err = load(&source, Some(&"ab".repeat(32)), &local_client())
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::Integrity);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let source = WorkflowSource::File(PathBuf::from("/definitely/not/here.yaml"));
        let err = load(&source, None, &local_client())
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::Usage);
    }

    #[tokio::test]
    async fn test_fetch_remote_ok() {
        let url = serve_once("200 OK", WORKFLOW).await;
        let bytes = fetch_remote(&local_client(), &url).await.unwrap();
        assert_eq!(bytes, WORKFLOW.as_bytes());
    }

    #[tokio::test]
    async fn test_fetch_remote_non_200() {
        let url = serve_once("404 Not Found", "missing").await;
        let err = fetch_remote(&local_client(), &url).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::Execution);
        assert!(err.to_string().contains("404"));
    }
}
