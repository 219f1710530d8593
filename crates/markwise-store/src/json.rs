//! JSON-file-backed store.
//!
//! Layout: `<root>/modules/<module_id>.json` and
//! `<root>/students/<module_id>/<student_id>.json`. Writes go to a temporary
//! file in the target directory followed by a rename, so readers never see a
//! half-written record.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use markwise_core::model::{Module, Student};
use markwise_core::traits::{ModuleStore, StudentStore};

/// A store keeping one JSON file per record under a root directory.
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Insert or replace a module record.
    pub async fn upsert_module(&self, module: &Module) -> Result<()> {
        let path = self.module_path(&module.module_id)?;
        write_json(&path, module).await
    }

    fn module_path(&self, module_id: &str) -> Result<PathBuf> {
        Ok(self
            .root
            .join("modules")
            .join(format!("{}.json", safe_id(module_id)?)))
    }

    fn student_dir(&self, module_id: &str) -> Result<PathBuf> {
        Ok(self.root.join("students").join(safe_id(module_id)?))
    }

    fn student_path(&self, module_id: &str, student_id: &str) -> Result<PathBuf> {
        Ok(self
            .student_dir(module_id)?
            .join(format!("{}.json", safe_id(student_id)?)))
    }
}

/// Record ids become file names; reject anything that could escape the root.
fn safe_id(id: &str) -> Result<&str> {
    if id.is_empty()
        || id == "."
        || id == ".."
        || id.contains('/')
        || id.contains('\\')
        || id.contains('\0')
    {
        anyhow::bail!("invalid record id: {id:?}");
    }
    Ok(id)
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("no parent directory for {}", path.display()))?;
    tokio::fs::create_dir_all(parent)
        .await
        .with_context(|| format!("failed to create {}", parent.display()))?;

    let json = serde_json::to_string_pretty(value).context("failed to serialize record")?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("failed to move record into place at {}", path.display()))?;
    Ok(())
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            let value = serde_json::from_str(&content)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

#[async_trait]
impl ModuleStore for JsonStore {
    async fn find_module(&self, module_id: &str) -> Result<Option<Module>> {
        read_json(&self.module_path(module_id)?).await
    }
}

#[async_trait]
impl StudentStore for JsonStore {
    async fn list_students(&self, module_id: &str) -> Result<Vec<Student>> {
        let dir = self.student_dir(module_id)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).with_context(|| format!("failed to read {}", dir.display())),
        };

        let mut students = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("failed to read {}", dir.display()))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                match read_json::<Student>(&path).await {
                    Ok(Some(student)) => students.push(student),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!("skipping unreadable student record {}: {e:#}", path.display());
                    }
                }
            }
        }

        students.sort_by(|a, b| a.student_id.cmp(&b.student_id));
        Ok(students)
    }

    async fn find_student(&self, module_id: &str, student_id: &str) -> Result<Option<Student>> {
        read_json(&self.student_path(module_id, student_id)?).await
    }

    async fn upsert_student(&self, student: &Student) -> Result<()> {
        let path = self.student_path(&student.module_id, &student.student_id)?;
        write_json(&path, student).await
    }
}
