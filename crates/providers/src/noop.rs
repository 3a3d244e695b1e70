use crate::{AssetService, Organization, Project, ProviderError, RemoteFile, UploadRequest, UploadResponse};

/// Stand-in used when no service URL is configured. Every call fails with
/// [`ProviderError::NotImplemented`].
#[derive(Debug, Default)]
pub struct NoopService;

#[async_trait::async_trait]
impl AssetService for NoopService {
    async fn list_files(&self) -> Result<Vec<RemoteFile>, ProviderError> {
        Err(ProviderError::NotImplemented)
    }

    async fn list_organizations(&self, _api_key: &str) -> Result<Vec<Organization>, ProviderError> {
        Err(ProviderError::NotImplemented)
    }

    async fn list_projects(
        &self,
        _api_key: &str,
        _organization_id: Option<&str>,
    ) -> Result<Vec<Project>, ProviderError> {
        Err(ProviderError::NotImplemented)
    }

    async fn upload_assets(
        &self,
        _request: &UploadRequest,
    ) -> Result<UploadResponse, ProviderError> {
        Err(ProviderError::NotImplemented)
    }

    async fn delete_file(&self, _path: &str) -> Result<(), ProviderError> {
        Err(ProviderError::NotImplemented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_call_is_not_implemented() {
        let svc = NoopService;
        assert!(matches!(svc.list_files().await, Err(ProviderError::NotImplemented)));
        assert!(matches!(
            svc.delete_file("a.png").await,
            Err(ProviderError::NotImplemented)
        ));
    }
}
