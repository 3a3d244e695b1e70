//! Sources of the current file listing.

use crate::error::{AssetError, Result};
use crate::models::{timestamp_from_secs, AssetRecord, FileType};
use globset::{Glob, GlobSet, GlobSetBuilder};
use providers::AssetService;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::task;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Lists the files the generation process has produced.
///
/// Each call fetches afresh. An empty listing is a valid answer, distinct
/// from a failure.
#[async_trait::async_trait]
pub trait FileCatalog: Send + Sync {
    async fn list_files(&self) -> Result<Vec<AssetRecord>>;
    /// Removes the underlying file.
    async fn delete_file(&self, path: &str) -> Result<()>;
}

/// Listing and deletion through the remote asset service.
pub struct ServiceCatalog {
    service: Arc<dyn AssetService>,
}

impl ServiceCatalog {
    pub fn new(service: Arc<dyn AssetService>) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl FileCatalog for ServiceCatalog {
    async fn list_files(&self) -> Result<Vec<AssetRecord>> {
        let files = self.service.list_files().await?;
        Ok(files.into_iter().map(AssetRecord::from).collect())
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        self.service.delete_file(path).await?;
        Ok(())
    }
}

/// Walks a local output directory.
pub struct DirectoryCatalog {
    root: PathBuf,
    excludes: GlobSet,
}

impl DirectoryCatalog {
    pub fn new(root: impl Into<PathBuf>, excludes: &[String]) -> anyhow::Result<Self> {
        Ok(Self {
            root: root.into(),
            excludes: build_globset(excludes)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a catalog path inside the root, refusing anything that
    /// could point outside it.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if path.is_empty() || escapes {
            return Err(AssetError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait::async_trait]
impl FileCatalog for DirectoryCatalog {
    async fn list_files(&self) -> Result<Vec<AssetRecord>> {
        let root = self.root.clone();
        let excludes = self.excludes.clone();
        let records = task::spawn_blocking(move || walk_output(&root, &excludes))
            .await
            .map_err(|e| AssetError::Fetch(e.to_string()))??;
        debug!(count = records.len(), root = %self.root.display(), "directory listed");
        Ok(records)
    }

    async fn delete_file(&self, path: &str) -> Result<()> {
        let full = self.resolve(path)?;
        if !full.is_file() {
            return Err(AssetError::RemoteRejection("File not found".to_string()));
        }
        let real_root = fs::canonicalize(&self.root).map_err(|e| AssetError::Fetch(e.to_string()))?;
        let real_file = fs::canonicalize(&full).map_err(|e| AssetError::Fetch(e.to_string()))?;
        if !real_file.starts_with(&real_root) {
            return Err(AssetError::InvalidPath(path.to_string()));
        }
        tokio::fs::remove_file(&real_file)
            .await
            .map_err(|e| AssetError::RemoteRejection(e.to_string()))?;
        info!(path, "deleted file");
        Ok(())
    }
}

fn walk_output(root: &Path, excludes: &GlobSet) -> Result<Vec<AssetRecord>> {
    if !root.is_dir() {
        return Err(AssetError::Fetch(format!(
            "output directory not found: {}",
            root.display()
        )));
    }
    let mut records = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !(is_hidden(e.path()) || excludes.is_match(e.path())))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let file_type = match path
            .extension()
            .and_then(|s| s.to_str())
            .and_then(FileType::from_extension)
        {
            Some(t) => t,
            None => continue,
        };
        let meta = match entry.metadata() {
            Ok(m) => m,
            Err(_) => continue,
        };
        let relative = match path.strip_prefix(root) {
            Ok(r) => r,
            Err(_) => continue,
        };
        let modified_at = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .and_then(|d| timestamp_from_secs(d.as_secs_f64()));

        records.push(AssetRecord {
            path: relative_key(relative),
            name: entry.file_name().to_string_lossy().into_owned(),
            file_type,
            size_bytes: Some(meta.len()),
            modified_at,
            url: None,
        });
    }
    records.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
    Ok(records)
}

/// Forward-slash relative path, stable across platforms.
fn relative_key(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}
