//! Remote service abstractions: the asset host that lists, uploads and
//! deletes generated files, and the organization/project directory.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod http;
pub mod noop;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("not implemented")]
    NotImplemented,
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("rejected by service: {0}")]
    Rejected(String),
}

/// A file as reported by `list-files`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub path: String,
    pub name: String,
    pub file_type: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    /// Seconds since the Unix epoch, fractional.
    #[serde(default)]
    pub modified: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadRequest {
    pub assets: Vec<String>,
    pub project_id: String,
    pub folder_id: String,
    pub organization_id: String,
    pub api_key: String,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Success,
    Partial,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub file: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: UploadStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub successful: Option<u64>,
    #[serde(default)]
    pub failed: Option<u64>,
    #[serde(default)]
    pub errors: Vec<FileError>,
}

/// The operations consumed from the asset host.
///
/// `upload_assets` hands back the service's verdict as-is, including an
/// `error` status; only transport and decoding failures are `Err`. The other
/// calls fold an `error` status into [`ProviderError::Rejected`].
#[async_trait::async_trait]
pub trait AssetService: Send + Sync {
    async fn list_files(&self) -> Result<Vec<RemoteFile>, ProviderError>;
    async fn list_organizations(&self, api_key: &str) -> Result<Vec<Organization>, ProviderError>;
    async fn list_projects(
        &self,
        api_key: &str,
        organization_id: Option<&str>,
    ) -> Result<Vec<Project>, ProviderError>;
    async fn upload_assets(&self, request: &UploadRequest)
        -> Result<UploadResponse, ProviderError>;
    async fn delete_file(&self, path: &str) -> Result<(), ProviderError>;
}
