#![allow(dead_code)]

use asset_manager_core::catalog::ServiceCatalog;
use asset_manager_core::store::StateStore;
use asset_manager_core::AssetManager;
use providers::{
    AssetService, FileError, Organization, Project, ProviderError, RemoteFile, UploadRequest,
    UploadResponse, UploadStatus,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use storage::{KeyValueStore, MemoryStore};

#[derive(Debug, Clone)]
pub enum Reply {
    Success,
    Partial,
    Error(String),
    Transport,
}

impl Default for Reply {
    fn default() -> Self {
        Reply::Success
    }
}

/// In-memory asset service that records every call.
#[derive(Default)]
pub struct FakeService {
    pub files: Mutex<Vec<RemoteFile>>,
    pub reply: Mutex<Reply>,
    pub uploads: Mutex<Vec<UploadRequest>>,
    pub deletes: Mutex<Vec<String>>,
    pub list_calls: AtomicUsize,
    pub fail_list: AtomicBool,
    pub fail_delete: AtomicBool,
    pub upload_delay: Mutex<Option<std::time::Duration>>,
}

impl FakeService {
    pub fn with_files(paths: &[&str]) -> Arc<Self> {
        let svc = Self::default();
        svc.set_files(paths);
        Arc::new(svc)
    }

    pub fn set_files(&self, paths: &[&str]) {
        *self.files.lock().unwrap() = paths
            .iter()
            .map(|p| RemoteFile {
                path: p.to_string(),
                name: p.rsplit('/').next().unwrap().to_string(),
                file_type: "image".to_string(),
                url: None,
                size: Some(10),
                modified: Some(1_700_000_000.0),
            })
            .collect();
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn uploaded_paths(&self) -> Vec<Vec<String>> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.assets.clone())
            .collect()
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AssetService for FakeService {
    async fn list_files(&self) -> Result<Vec<RemoteFile>, ProviderError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(ProviderError::RequestFailed("connection refused".into()));
        }
        Ok(self.files.lock().unwrap().clone())
    }

    async fn list_organizations(&self, api_key: &str) -> Result<Vec<Organization>, ProviderError> {
        if api_key != "key" {
            return Err(ProviderError::Rejected("invalid api key".into()));
        }
        Ok(vec![Organization {
            id: "org-1".into(),
            name: "Studio".into(),
        }])
    }

    async fn list_projects(
        &self,
        _api_key: &str,
        organization_id: Option<&str>,
    ) -> Result<Vec<Project>, ProviderError> {
        Ok(vec![Project {
            id: format!("{}-proj", organization_id.unwrap_or("none")),
            name: "Renders".into(),
        }])
    }

    async fn upload_assets(
        &self,
        request: &UploadRequest,
    ) -> Result<UploadResponse, ProviderError> {
        self.uploads.lock().unwrap().push(request.clone());
        let delay = *self.upload_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let total = request.assets.len() as u64;
        let reply = self.reply.lock().unwrap().clone();
        let (status, message, failed, errors) = match reply {
            Reply::Success => (UploadStatus::Success, None, 0, vec![]),
            Reply::Partial => (
                UploadStatus::Partial,
                Some("Uploaded some assets".to_string()),
                1,
                vec![FileError {
                    file: request.assets[0].clone(),
                    error: "File not found".into(),
                }],
            ),
            Reply::Error(msg) => (UploadStatus::Error, Some(msg), total, vec![]),
            Reply::Transport => {
                return Err(ProviderError::RequestFailed("connection reset".into()))
            }
        };
        Ok(UploadResponse {
            status,
            message,
            total: Some(total),
            successful: Some(total - failed),
            failed: Some(failed),
            errors,
        })
    }

    async fn delete_file(&self, path: &str) -> Result<(), ProviderError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(ProviderError::Rejected("File not found".into()));
        }
        self.deletes.lock().unwrap().push(path.to_string());
        Ok(())
    }
}

pub async fn open_manager(service: Arc<FakeService>, kv: Arc<dyn KeyValueStore>) -> AssetManager {
    AssetManager::open(
        Arc::new(ServiceCatalog::new(service.clone())),
        service,
        StateStore::new(kv),
    )
    .await
}

pub async fn manager_with(paths: &[&str]) -> (Arc<FakeService>, AssetManager) {
    let service = FakeService::with_files(paths);
    let manager = open_manager(service.clone(), Arc::new(MemoryStore::new())).await;
    (service, manager)
}

pub async fn configure(manager: &AssetManager) {
    manager.save_settings("key", "org-1").await.unwrap();
    manager.select_project("proj-1").await;
}

pub fn paths(records: &[asset_manager_core::AssetRecord]) -> Vec<String> {
    records.iter().map(|r| r.path.clone()).collect()
}
