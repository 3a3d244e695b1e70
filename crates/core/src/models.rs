use crate::error::{AssetError, Result};
use chrono::{DateTime, TimeZone, Utc};
use providers::{FileError, RemoteFile, UploadResponse, UploadStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Video,
    Audio,
    Text,
    #[serde(rename = "3D")]
    Model3d,
    Other,
}

impl FileType {
    /// Maps a lowercase extension (without the dot) to a tracked file type.
    /// Extensions the generation process does not produce yield `None`.
    pub fn from_extension(ext: &str) -> Option<FileType> {
        let kind = match ext.to_lowercase().as_str() {
            "png" | "jpg" | "jpeg" | "webp" | "svg" | "gif" | "bmp" => FileType::Image,
            "mp4" | "mov" | "avi" | "mkv" => FileType::Video,
            "mp3" | "wav" | "flac" => FileType::Audio,
            "txt" | "json" => FileType::Text,
            "obj" | "fbx" | "gltf" | "glb" => FileType::Model3d,
            _ => return None,
        };
        Some(kind)
    }

    /// Parses the label used on the wire. Unknown labels become `Other`.
    pub fn from_label(label: &str) -> FileType {
        match label.to_lowercase().as_str() {
            "image" => FileType::Image,
            "video" => FileType::Video,
            "audio" => FileType::Audio,
            "text" => FileType::Text,
            "3d" | "model3d" => FileType::Model3d,
            _ => FileType::Other,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FileType::Image => "image",
            FileType::Video => "video",
            FileType::Audio => "audio",
            FileType::Text => "text",
            FileType::Model3d => "3D",
            FileType::Other => "other",
        };
        f.write_str(label)
    }
}

/// A generated file, identified solely by its `path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub path: String,
    pub name: String,
    pub file_type: FileType,
    pub size_bytes: Option<u64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
}

impl AssetRecord {
    /// Minimal record for a bare path, as used by tests and path-only callers.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        let file_type = name
            .rsplit_once('.')
            .and_then(|(_, ext)| FileType::from_extension(ext))
            .unwrap_or(FileType::Other);
        Self {
            path,
            name,
            file_type,
            size_bytes: None,
            modified_at: None,
            url: None,
        }
    }
}

pub(crate) fn timestamp_from_secs(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9) as u32;
    Utc.timestamp_opt(whole as i64, nanos).single()
}

impl From<RemoteFile> for AssetRecord {
    fn from(file: RemoteFile) -> Self {
        Self {
            file_type: FileType::from_label(&file.file_type),
            modified_at: file.modified.and_then(timestamp_from_secs),
            path: file.path,
            name: file.name,
            size_bytes: file.size,
            url: file.url,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    #[default]
    Manual,
    Automatic,
}

impl FromStr for UploadMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(UploadMode::Manual),
            "automatic" | "auto" => Ok(UploadMode::Automatic),
            other => Err(format!("unknown upload mode: {}", other)),
        }
    }
}

impl fmt::Display for UploadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadMode::Manual => f.write_str("manual"),
            UploadMode::Automatic => f.write_str("automatic"),
        }
    }
}

/// Everything an upload needs from the user's settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadConfiguration {
    pub api_key: String,
    pub organization_id: String,
    pub project_id: String,
    pub upload_mode: UploadMode,
}

impl UploadConfiguration {
    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }

    /// Automatic mode only triggers uploads when the configuration is complete.
    pub fn automatic_enabled(&self) -> bool {
        self.upload_mode == UploadMode::Automatic && self.is_complete()
    }

    pub fn validate(&self) -> Result<()> {
        let missing = if self.api_key.trim().is_empty() {
            "api key is required"
        } else if self.organization_id.trim().is_empty() {
            "organization is required"
        } else if self.project_id.trim().is_empty() {
            "project is required"
        } else {
            return Ok(());
        };
        Err(AssetError::Configuration(missing.to_string()))
    }
}

/// Counters and per-file errors reported alongside an upload verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    pub message: Option<String>,
    pub total: Option<u64>,
    pub successful: Option<u64>,
    pub failed: Option<u64>,
    pub errors: Vec<FileError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadOutcome {
    Success(UploadReport),
    PartialSuccess(UploadReport),
    Failure { reason: String },
}

impl UploadOutcome {
    /// Success and partial success both commit every requested path.
    pub fn is_committed(&self) -> bool {
        !matches!(self, UploadOutcome::Failure { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            UploadOutcome::Success(r) | UploadOutcome::PartialSuccess(r) => r.message.as_deref(),
            UploadOutcome::Failure { reason } => Some(reason),
        }
    }

    pub fn into_result(self) -> Result<UploadReport> {
        match self {
            UploadOutcome::Success(r) | UploadOutcome::PartialSuccess(r) => Ok(r),
            UploadOutcome::Failure { reason } => Err(AssetError::RemoteRejection(reason)),
        }
    }
}

impl From<UploadResponse> for UploadOutcome {
    fn from(resp: UploadResponse) -> Self {
        let report = UploadReport {
            message: resp.message,
            total: resp.total,
            successful: resp.successful,
            failed: resp.failed,
            errors: resp.errors,
        };
        match resp.status {
            UploadStatus::Success => UploadOutcome::Success(report),
            UploadStatus::Partial => UploadOutcome::PartialSuccess(report),
            UploadStatus::Error => UploadOutcome::Failure {
                reason: report.message.unwrap_or_else(|| "Upload failed".to_string()),
            },
        }
    }
}
