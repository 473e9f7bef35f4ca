//! Directory-backed store
//!
//! Layout: `<root>/<id>.json`, one pretty-printed instance per file.
//! Writes go to a temporary sibling first and are renamed into place, so a
//! reader never observes a half-written instance.

use std::fs;
use std::path::{Path, PathBuf};

use holiday_model::{ConfigurationInstance, InstanceSummary};

use super::{ConfigStore, StoreError};

const EXTENSION: &str = "json";

/// Store reading and writing JSON files in one directory
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        let valid = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\'])
            && !id.starts_with('.');
        if !valid {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.root.join(format!("{id}.{EXTENSION}")))
    }

    fn read(path: &Path) -> Result<ConfigurationInstance, StoreError> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            origin: path.display().to_string(),
            source,
        })
    }
}

impl ConfigStore for DirectoryStore {
    fn list_all(&self) -> Result<Vec<InstanceSummary>, StoreError> {
        if !self.root.is_dir() {
            return Err(StoreError::Unavailable(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }

        let mut summaries = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            let summary: InstanceSummary =
                serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                    origin: path.display().to_string(),
                    source,
                })?;
            summaries.push(summary);
        }

        summaries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(summaries)
    }

    fn fetch(&self, id: &str) -> Result<ConfigurationInstance, StoreError> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let instance = Self::read(&path)?;
        if instance.id != id {
            return Err(StoreError::Rejected(format!(
                "{} holds instance '{}'",
                path.display(),
                instance.id
            )));
        }
        Ok(instance)
    }

    fn persist(&self, instance: &ConfigurationInstance) -> Result<(), StoreError> {
        let path = self.path_for(&instance.id)?;
        if !path.exists() {
            return Err(StoreError::NotFound(instance.id.clone()));
        }

        let mut body = serde_json::to_string_pretty(instance).map_err(|source| {
            StoreError::Parse {
                origin: instance.id.clone(),
                source,
            }
        })?;
        body.push('\n');

        let tmp = path.with_extension(format!("{EXTENSION}.tmp"));
        fs::write(&tmp, body)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        tracing::debug!(id = %instance.id, path = %path.display(), "persisted instance");
        Ok(())
    }
}
