use providers::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    /// Transport or decoding failure while talking to an external service.
    #[error("fetch failed: {0}")]
    Fetch(String),
    /// Missing credential, organization or project.
    #[error("configuration incomplete: {0}")]
    Configuration(String),
    /// The service answered with an error status.
    #[error("rejected by service: {0}")]
    RemoteRejection(String),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("no assets selected for upload")]
    EmptySelection,
    #[error("invalid asset path: {0}")]
    InvalidPath(String),
}

impl AssetError {
    pub(crate) fn persistence(err: anyhow::Error) -> Self {
        AssetError::Persistence(format!("{:#}", err))
    }
}

impl From<ProviderError> for AssetError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::RequestFailed(msg) => AssetError::Fetch(msg),
            ProviderError::Rejected(msg) => AssetError::RemoteRejection(msg),
            ProviderError::NotImplemented => {
                AssetError::Configuration("no asset service configured".to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AssetError>;
