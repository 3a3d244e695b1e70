//! Optional generation-workflow context attached to uploads.

use anyhow::Context;
use serde_json::Value;
use std::path::PathBuf;
use tracing::warn;

#[async_trait::async_trait]
pub trait WorkflowSource: Send + Sync {
    async fn capture(&self) -> anyhow::Result<Value>;
}

/// Reads a workflow snapshot exported to a JSON file.
pub struct JsonFileWorkflow {
    path: PathBuf,
}

impl JsonFileWorkflow {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl WorkflowSource for JsonFileWorkflow {
    async fn capture(&self) -> anyhow::Result<Value> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("read workflow {:?}", self.path))?;
        let value: Value = serde_json::from_str(&raw).context("parse workflow json")?;
        // Exported graphs wrap the prompt under "output".
        Ok(match value {
            Value::Object(mut map) if map.contains_key("output") => {
                map.remove("output").unwrap_or(Value::Null)
            }
            other => other,
        })
    }
}

/// Captures the workflow if a source is present. Failures are logged and
/// yield `None`; they never abort an upload.
pub async fn capture_best_effort(source: Option<&dyn WorkflowSource>) -> Option<Value> {
    let source = source?;
    match source.capture().await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("failed to capture workflow context: {:#}", e);
            None
        }
    }
}
