//! Turns a set of paths into one upload request and commits the verdict.

use crate::error::{AssetError, Result};
use crate::ledger::Ledger;
use crate::models::{AssetRecord, UploadConfiguration, UploadOutcome};
use providers::{AssetService, UploadRequest};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Paths for one request plus the metadata blob sent with them.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadBatch {
    pub paths: Vec<String>,
    pub metadata: Value,
}

impl UploadBatch {
    pub fn single(record: &AssetRecord, workflow: Option<Value>) -> Self {
        Self {
            paths: vec![record.path.clone()],
            metadata: json!({
                "filename": record.name,
                "size": record.size_bytes,
                "modified": record.modified_at.map(|t| t.timestamp_millis() as f64 / 1000.0),
                "workflow": workflow,
            }),
        }
    }

    pub fn bulk(paths: Vec<String>, workflow: Option<Value>) -> Self {
        let count = paths.len();
        Self {
            paths,
            metadata: json!({
                "bulk_upload": true,
                "count": count,
                "workflow": workflow,
            }),
        }
    }

    pub fn automatic(records: &[AssetRecord], workflow: Option<Value>) -> Self {
        Self {
            paths: records.iter().map(|r| r.path.clone()).collect(),
            metadata: json!({
                "automatic_upload": true,
                "count": records.len(),
                "workflow": workflow,
            }),
        }
    }
}

pub struct UploadCoordinator {
    service: Arc<dyn AssetService>,
    ledger: Arc<Ledger>,
}

impl UploadCoordinator {
    pub fn new(service: Arc<dyn AssetService>, ledger: Arc<Ledger>) -> Self {
        Self { service, ledger }
    }

    /// Sends `batch` as a single request.
    ///
    /// Configuration is checked before any network call. On success or
    /// partial success every path in the batch is committed as uploaded;
    /// on failure nothing changes and the caller may retry.
    pub async fn upload(
        &self,
        batch: UploadBatch,
        config: &UploadConfiguration,
    ) -> Result<UploadOutcome> {
        config.validate()?;
        let paths = dedupe(batch.paths);
        if paths.is_empty() {
            return Err(AssetError::EmptySelection);
        }

        let request = UploadRequest {
            assets: paths.clone(),
            project_id: config.project_id.clone(),
            folder_id: config.project_id.clone(),
            organization_id: config.organization_id.clone(),
            api_key: config.api_key.clone(),
            metadata: batch.metadata,
        };

        let _in_flight = self.ledger.begin_upload(&paths);
        let response = self.service.upload_assets(&request).await?;
        let outcome = UploadOutcome::from(response);

        if outcome.is_committed() {
            let count = paths.len();
            self.ledger
                .commit(|s| s.classification.mark_uploaded(paths))
                .await;
            info!(count, partial = matches!(outcome, UploadOutcome::PartialSuccess(_)), "upload committed");
        } else {
            warn!(
                count = request.assets.len(),
                reason = outcome.message().unwrap_or_default(),
                "upload rejected"
            );
        }
        Ok(outcome)
    }
}

fn dedupe(paths: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|p| !p.is_empty() && seen.insert(p.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn single_metadata_carries_file_details() {
        let mut record = AssetRecord::from_path("a.png");
        record.size_bytes = Some(42);
        record.modified_at = chrono::Utc.timestamp_opt(1_700_000_000, 500_000_000).single();
        let batch = UploadBatch::single(&record, Some(json!({"1": {}})));
        assert_eq!(batch.paths, vec!["a.png"]);
        assert_eq!(batch.metadata["filename"], "a.png");
        assert_eq!(batch.metadata["size"], 42);
        assert_eq!(batch.metadata["modified"], 1_700_000_000.5);
        assert!(batch.metadata["workflow"].is_object());
    }

    #[test]
    fn bulk_and_automatic_metadata_flags() {
        let bulk = UploadBatch::bulk(vec!["a.png".into(), "b.png".into()], None);
        assert_eq!(bulk.metadata["bulk_upload"], true);
        assert_eq!(bulk.metadata["count"], 2);
        assert!(bulk.metadata["workflow"].is_null());

        let records = vec![AssetRecord::from_path("c.png")];
        let auto = UploadBatch::automatic(&records, None);
        assert_eq!(auto.metadata["automatic_upload"], true);
        assert_eq!(auto.paths, vec!["c.png"]);
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let out = dedupe(vec!["b".into(), "a".into(), "b".into(), String::new()]);
        assert_eq!(out, vec!["b", "a"]);
    }
}
