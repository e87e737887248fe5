//! Project state sources.
//!
//! The analysis service reads project state through [`ProjectStateSource`].
//! Real integrations (Jira, Asana, Trello) live outside this crate and only
//! need to implement the trait.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::request::ProjectState;
use crate::{AnalysisError, Result};

/// Where project-state snapshots come from.
#[async_trait]
pub trait ProjectStateSource: Send + Sync {
    /// Latest snapshot for a project, or None when the project is unknown.
    async fn fetch(&self, project_id: &str) -> Result<Option<ProjectState>>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// In-memory source, keyed by project id.
#[derive(Default)]
pub struct InMemoryStateSource {
    states: RwLock<HashMap<String, ProjectState>>,
}

impl InMemoryStateSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source pre-populated with snapshots; later duplicates win.
    pub fn with_states(states: impl IntoIterator<Item = ProjectState>) -> Self {
        let map = states
            .into_iter()
            .map(|state| (state.project_id.clone(), state))
            .collect();
        Self {
            states: RwLock::new(map),
        }
    }

    /// Stores or replaces the snapshot for its project.
    pub async fn insert(&self, state: ProjectState) {
        self.states.write().await.insert(state.project_id.clone(), state);
    }

    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

#[async_trait]
impl ProjectStateSource for InMemoryStateSource {
    async fn fetch(&self, project_id: &str) -> Result<Option<ProjectState>> {
        Ok(self.states.read().await.get(project_id).cloned())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Reads `<dir>/<project_id>.json` per project.
#[derive(Clone, Debug)]
pub struct JsonFileStateSource {
    dir: PathBuf,
}

impl JsonFileStateSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, project_id: &str) -> Result<PathBuf> {
        let valid = !project_id.is_empty()
            && project_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && !project_id.starts_with('.');
        if !valid {
            return Err(AnalysisError::Source(format!(
                "project id '{}' cannot be mapped to a file name",
                project_id
            )));
        }
        Ok(self.dir.join(format!("{}.json", project_id)))
    }
}

#[async_trait]
impl ProjectStateSource for JsonFileStateSource {
    async fn fetch(&self, project_id: &str) -> Result<Option<ProjectState>> {
        let path = self.path_for(project_id)?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let state: ProjectState = serde_json::from_slice(&bytes)?;
        if state.project_id != project_id {
            tracing::warn!(
                "State file {} declares project '{}', expected '{}'",
                path.display(),
                state.project_id,
                project_id
            );
        }
        Ok(Some(state))
    }

    fn name(&self) -> &str {
        "json-file"
    }
}

/// Reads a single snapshot from a JSON file.
pub async fn load_state_file(path: impl AsRef<Path>) -> Result<ProjectState> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_fetch() {
        let source = InMemoryStateSource::new();
        assert!(source.is_empty().await);

        source.insert(ProjectState::new("apollo")).await;
        assert_eq!(source.len().await, 1);

        assert!(source.fetch("apollo").await.unwrap().is_some());
        assert!(source.fetch("gemini").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_file_fetch() {
        let temp = tempfile::tempdir().unwrap();
        let state = ProjectState::new("apollo");
        std::fs::write(
            temp.path().join("apollo.json"),
            serde_json::to_vec(&state).unwrap(),
        )
        .unwrap();

        let source = JsonFileStateSource::new(temp.path());
        let fetched = source.fetch("apollo").await.unwrap().unwrap();
        assert_eq!(fetched.project_id, "apollo");
        assert!(source.fetch("gemini").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_file_rejects_path_traversal() {
        let temp = tempfile::tempdir().unwrap();
        let source = JsonFileStateSource::new(temp.path());

        for id in ["../etc/passwd", "", ".hidden", "a/b"] {
            assert!(matches!(
                source.fetch(id).await,
                Err(AnalysisError::Source(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_json_file_reports_malformed_json() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("broken.json"), b"{not json").unwrap();

        let source = JsonFileStateSource::new(temp.path());
        assert!(matches!(source.fetch("broken").await, Err(AnalysisError::Json(_))));
    }
}
