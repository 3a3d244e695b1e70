use crate::{
    AssetService, Organization, Project, ProviderError, RemoteFile, UploadRequest, UploadResponse,
};
use bytes::Bytes;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct HttpServiceConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl HttpServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// JSON-over-HTTP client for the asset host.
#[derive(Clone)]
pub struct HttpAssetService {
    client: Client,
    cfg: Arc<HttpServiceConfig>,
}

impl HttpAssetService {
    pub fn new(cfg: HttpServiceConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            cfg: Arc::new(cfg),
        })
    }

    fn endpoint(&self, name: &str) -> String {
        endpoint_url(&self.cfg.base_url, name)
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ProviderError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.bytes().await.unwrap_or(Bytes::from_static(b""));
            return Err(ProviderError::RequestFailed(format!(
                "status {} body {:?}",
                status, body
            )));
        }
        resp.json()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))
    }
}

pub(crate) fn endpoint_url(base: &str, name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), name)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListFilesResponse {
    pub status: String,
    #[serde(default)]
    pub images: Vec<RemoteFile>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrganizationsResponse {
    pub status: String,
    #[serde(default)]
    pub organizations: Vec<Organization>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectsResponse {
    pub status: String,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Turns a `{status, message}` envelope into `Ok(payload)` or a rejection.
pub(crate) fn accept<T>(status: &str, message: Option<String>, payload: T) -> Result<T, ProviderError> {
    if status == "success" {
        Ok(payload)
    } else {
        Err(ProviderError::Rejected(
            message.unwrap_or_else(|| format!("service returned status {:?}", status)),
        ))
    }
}

#[async_trait::async_trait]
impl AssetService for HttpAssetService {
    async fn list_files(&self) -> Result<Vec<RemoteFile>, ProviderError> {
        let resp: ListFilesResponse = self
            .fetch(self.client.get(self.endpoint("list-files")))
            .await?;
        debug!(count = resp.images.len(), "list-files");
        accept(&resp.status, resp.message, resp.images)
    }

    async fn list_organizations(&self, api_key: &str) -> Result<Vec<Organization>, ProviderError> {
        let builder = self
            .client
            .get(self.endpoint("list-organizations"))
            .query(&[("api_key", api_key)]);
        let resp: OrganizationsResponse = self.fetch(builder).await?;
        accept(&resp.status, resp.message, resp.organizations)
    }

    async fn list_projects(
        &self,
        api_key: &str,
        organization_id: Option<&str>,
    ) -> Result<Vec<Project>, ProviderError> {
        let mut query = vec![("api_key", api_key)];
        if let Some(org) = organization_id {
            query.push(("organization_id", org));
        }
        let builder = self
            .client
            .get(self.endpoint("list-projects"))
            .query(&query);
        let resp: ProjectsResponse = self.fetch(builder).await?;
        accept(&resp.status, resp.message, resp.projects)
    }

    async fn upload_assets(
        &self,
        request: &UploadRequest,
    ) -> Result<UploadResponse, ProviderError> {
        debug!(count = request.assets.len(), project = %request.project_id, "upload-assets");
        self.fetch(self.client.post(self.endpoint("upload-assets")).json(request))
            .await
    }

    async fn delete_file(&self, path: &str) -> Result<(), ProviderError> {
        #[derive(Serialize)]
        struct DeleteRequest<'a> {
            image_path: &'a str,
        }
        let builder = self
            .client
            .post(self.endpoint("delete-file"))
            .json(&DeleteRequest { image_path: path });
        let resp: StatusResponse = self.fetch(builder).await?;
        accept(&resp.status, resp.message, ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UploadStatus;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint_url("http://127.0.0.1:8188/asset-manager/", "list-files"),
            "http://127.0.0.1:8188/asset-manager/list-files"
        );
        assert_eq!(endpoint_url("http://h", "delete-file"), "http://h/delete-file");
    }

    #[test]
    fn list_files_tolerates_missing_optional_fields() {
        let raw = r#"{
            "status": "success",
            "images": [
                {"path": "sub/a.png", "name": "a.png", "file_type": "image", "size": 12, "modified": 1700000000.5},
                {"path": "b.wav", "name": "b.wav", "file_type": "audio"}
            ],
            "count": 2
        }"#;
        let resp: ListFilesResponse = serde_json::from_str(raw).unwrap();
        let files = accept(&resp.status, resp.message, resp.images).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].size, Some(12));
        assert_eq!(files[1].url, None);
        assert_eq!(files[1].modified, None);
    }

    #[test]
    fn empty_listing_is_not_an_error() {
        let resp: ListFilesResponse =
            serde_json::from_str(r#"{"status": "success", "images": []}"#).unwrap();
        let files = accept(&resp.status, resp.message, resp.images).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn error_status_becomes_rejection_with_message() {
        let resp: StatusResponse =
            serde_json::from_str(r#"{"status": "error", "message": "File not found"}"#).unwrap();
        match accept(&resp.status, resp.message, ()) {
            Err(ProviderError::Rejected(msg)) => assert_eq!(msg, "File not found"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn partial_upload_response_keeps_per_file_errors() {
        let raw = r#"{
            "status": "partial",
            "total": 2,
            "successful": 1,
            "failed": 1,
            "errors": [{"file": "b.png", "error": "File not found"}],
            "message": "Uploaded 1/2 assets successfully"
        }"#;
        let resp: UploadResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.status, UploadStatus::Partial);
        assert_eq!(resp.failed, Some(1));
        assert_eq!(resp.errors[0].file, "b.png");
    }

    #[test]
    fn upload_request_uses_snake_case_fields() {
        let req = UploadRequest {
            assets: vec!["a.png".into()],
            project_id: "p".into(),
            folder_id: "p".into(),
            organization_id: "o".into(),
            api_key: "k".into(),
            metadata: serde_json::json!({"count": 1}),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["assets"][0], "a.png");
        assert_eq!(value["folder_id"], "p");
        assert_eq!(value["organization_id"], "o");
        assert_eq!(value["metadata"]["count"], 1);
    }
}
