use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("plan file not found at {0}")]
    Missing(PathBuf),

    #[error("failed to read plan file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("plan file {path} is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Capability: "load the current plan".
/// Handlers depend on this trait so tests can swap in an in-memory fixture.
#[async_trait]
pub trait PlanSource: Send + Sync {
    /// Returns the parsed document exactly as stored. No schema validation.
    async fn load(&self) -> Result<Value, PlanError>;
}

/// Reads a single JSON file on every call. No caching, so external edits are
/// visible on the next request.
#[derive(Debug, Clone)]
pub struct FilePlanStore {
    path: PathBuf,
}

impl FilePlanStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PlanSource for FilePlanStore {
    async fn load(&self) -> Result<Value, PlanError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::NotFound => PlanError::Missing(self.path.clone()),
                _ => PlanError::Io {
                    path: self.path.clone(),
                    source,
                },
            })?;

        let plan = serde_json::from_str(&raw).map_err(|source| PlanError::Malformed {
            path: self.path.clone(),
            source,
        })?;

        debug!("Loaded plan from {}", self.path.display());
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_returns_parsed_content_unchanged() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"summary":{{"title":"Retire at 50"}},"extra":[1,2]}}"#).unwrap();

        let plan = FilePlanStore::new(file.path()).load().await.unwrap();
        assert_eq!(
            plan,
            json!({"summary": {"title": "Retire at 50"}, "extra": [1, 2]})
        );
    }

    #[tokio::test]
    async fn test_load_rereads_on_every_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        let store = FilePlanStore::new(&path);

        std::fs::write(&path, r#"{"v":1}"#).unwrap();
        assert_eq!(store.load().await.unwrap(), json!({"v": 1}));

        std::fs::write(&path, r#"{"v":2}"#).unwrap();
        assert_eq!(store.load().await.unwrap(), json!({"v": 2}));
    }

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = FilePlanStore::new(dir.path().join("plan.json"))
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, PlanError::Missing(_)));
    }

    #[tokio::test]
    async fn test_invalid_json_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = FilePlanStore::new(file.path()).load().await.unwrap_err();
        assert!(matches!(err, PlanError::Malformed { .. }));
    }
}
