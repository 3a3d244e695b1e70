//! The asset manager context: owns the catalog, the durable state and the
//! upload coordinator, and exposes every user command as a method.

use crate::catalog::FileCatalog;
use crate::classifier::{self, Summary};
use crate::coordinator::{UploadBatch, UploadCoordinator};
use crate::error::{AssetError, Result};
use crate::ledger::Ledger;
use crate::models::{AssetRecord, UploadConfiguration, UploadMode, UploadOutcome};
use crate::selection::Selection;
use crate::state::{AssetState, ClassificationState, Settings};
use crate::store::StateStore;
use crate::workflow::{self, WorkflowSource};
use providers::{AssetService, Organization, Project};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, error, info};

/// Change notifications for a rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetEvent {
    Uploaded { paths: Vec<String>, automatic: bool },
    Hidden { path: String },
    Deleted { path: String },
    /// Uploaded and hidden sets were cleared.
    Reset,
    SettingsChanged,
    AutoUploadFailed { message: String },
}

/// What an automatic check did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoCheck {
    /// Upload mode is manual.
    Disabled,
    /// Automatic mode without a complete configuration.
    Unconfigured,
    NothingNew,
    Uploaded(UploadOutcome),
}

pub struct AssetManager {
    catalog: Arc<dyn FileCatalog>,
    service: Arc<dyn AssetService>,
    ledger: Arc<Ledger>,
    coordinator: UploadCoordinator,
    settings: RwLock<Settings>,
    selection: Mutex<Selection>,
    listing: RwLock<Vec<AssetRecord>>,
    workflow: Option<Arc<dyn WorkflowSource>>,
    events: broadcast::Sender<AssetEvent>,
}

impl AssetManager {
    /// Loads settings and state from `store`. Unreadable records are logged
    /// and replaced by defaults.
    pub async fn open(
        catalog: Arc<dyn FileCatalog>,
        service: Arc<dyn AssetService>,
        store: StateStore,
    ) -> Self {
        let settings = match store.load_settings().await {
            Ok(s) => s,
            Err(e) => {
                error!("failed to load settings, using defaults: {}", e);
                Settings::default()
            }
        };
        let ledger = Arc::new(Ledger::open(store).await);
        let (events, _) = broadcast::channel(64);
        Self {
            coordinator: UploadCoordinator::new(service.clone(), ledger.clone()),
            catalog,
            service,
            ledger,
            settings: RwLock::new(settings),
            selection: Mutex::new(Selection::new()),
            listing: RwLock::new(Vec::new()),
            workflow: None,
            events,
        }
    }

    pub fn with_workflow(mut self, source: Arc<dyn WorkflowSource>) -> Self {
        self.workflow = Some(source);
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AssetEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: AssetEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }

    pub async fn state(&self) -> AssetState {
        self.ledger.snapshot().await
    }

    pub async fn classification(&self) -> ClassificationState {
        self.ledger.read(|s| s.classification.clone()).await
    }

    pub async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Fetches the catalog and remembers it as the current listing.
    pub async fn refresh(&self) -> Result<Vec<AssetRecord>> {
        let records = self.catalog.list_files().await?;
        *self.listing.write().await = records.clone();
        Ok(records)
    }

    /// Fresh listing filtered to what the user should see.
    pub async fn visible(&self) -> Result<Vec<AssetRecord>> {
        let records = self.refresh().await?;
        let visible: Vec<AssetRecord> = self
            .ledger
            .read(|s| {
                classifier::visible(&records, &s.classification)
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .await;
        self.selection.lock().await.retain_visible(&visible);
        Ok(visible)
    }

    pub async fn summary(&self) -> Result<Summary> {
        let records = self.refresh().await?;
        Ok(self
            .ledger
            .read(|s| classifier::summarize(&records, &s.classification))
            .await)
    }

    /// Credential, effective organization, selected project and mode. The
    /// selected organization wins over the one saved with the settings.
    pub async fn configuration(&self) -> UploadConfiguration {
        let settings = self.settings.read().await.clone();
        self.ledger
            .read(|s| UploadConfiguration {
                api_key: settings.api_key.clone(),
                organization_id: if s.selected_organization.is_empty() {
                    settings.organization.clone()
                } else {
                    s.selected_organization.clone()
                },
                project_id: s.selected_project.clone(),
                upload_mode: s.upload_mode,
            })
            .await
    }

    pub async fn save_settings(&self, api_key: &str, organization: &str) -> Result<()> {
        let settings = Settings {
            api_key: api_key.trim().to_string(),
            organization: organization.trim().to_string(),
        };
        self.ledger.store().save_settings(&settings).await?;
        *self.settings.write().await = settings;
        info!("settings saved");
        self.emit(AssetEvent::SettingsChanged);
        Ok(())
    }

    pub async fn set_upload_mode(&self, mode: UploadMode) {
        self.ledger.commit(|s| s.upload_mode = mode).await;
        info!(%mode, "upload mode changed");
        self.emit(AssetEvent::SettingsChanged);
    }

    pub async fn select_organization(&self, organization_id: &str) {
        let id = organization_id.trim().to_string();
        self.ledger.commit(|s| s.selected_organization = id).await;
        self.emit(AssetEvent::SettingsChanged);
    }

    pub async fn select_project(&self, project_id: &str) {
        let id = project_id.trim().to_string();
        self.ledger.commit(|s| s.selected_project = id).await;
        self.emit(AssetEvent::SettingsChanged);
    }

    pub async fn organizations(&self) -> Result<Vec<Organization>> {
        let api_key = self.require_api_key().await?;
        Ok(self.service.list_organizations(&api_key).await?)
    }

    /// Projects of the effective organization.
    pub async fn projects(&self) -> Result<Vec<Project>> {
        let api_key = self.require_api_key().await?;
        let config = self.configuration().await;
        let org = Some(config.organization_id.as_str()).filter(|o| !o.is_empty());
        Ok(self.service.list_projects(&api_key, org).await?)
    }

    async fn require_api_key(&self) -> Result<String> {
        let key = self.settings.read().await.api_key.clone();
        if key.is_empty() {
            return Err(AssetError::Configuration("api key is required".to_string()));
        }
        Ok(key)
    }

    /// Uploads `paths` on the user's behalf in one request. Errors are
    /// returned for display; on any failure the classification is untouched.
    pub async fn upload(&self, paths: Vec<String>) -> Result<UploadOutcome> {
        let config = self.configuration().await;
        config.validate()?;
        if paths.is_empty() {
            return Err(AssetError::EmptySelection);
        }

        let workflow = workflow::capture_best_effort(self.workflow.as_deref()).await;
        let batch = match paths.as_slice() {
            [only] => {
                let record = self
                    .listing
                    .read()
                    .await
                    .iter()
                    .find(|r| &r.path == only)
                    .cloned()
                    .unwrap_or_else(|| AssetRecord::from_path(only.clone()));
                UploadBatch::single(&record, workflow)
            }
            _ => UploadBatch::bulk(paths, workflow),
        };
        let sent = batch.paths.clone();

        let outcome = self.coordinator.upload(batch, &config).await?;
        if outcome.is_committed() {
            let mut selection = self.selection.lock().await;
            for path in &sent {
                selection.deselect(path);
            }
            drop(selection);
            self.emit(AssetEvent::Uploaded {
                paths: sent,
                automatic: false,
            });
        }
        Ok(outcome)
    }

    /// Bulk upload of the current selection, limited to what is visible now.
    pub async fn upload_selected(&self) -> Result<UploadOutcome> {
        let visible = self.visible().await?;
        let paths = self.selection.lock().await.selected_in(&visible);
        if paths.is_empty() {
            return Err(AssetError::EmptySelection);
        }
        self.upload(paths).await
    }

    /// Hides `path` without touching the file. Returns false for uploaded
    /// paths, which cannot be hidden.
    pub async fn hide(&self, path: &str) -> bool {
        let hidden = self.ledger.commit(|s| s.classification.hide(path)).await;
        if hidden {
            self.selection.lock().await.deselect(path);
            self.emit(AssetEvent::Hidden {
                path: path.to_string(),
            });
        }
        hidden
    }

    /// Deletes the underlying file, then forgets the path entirely. A failed
    /// delete leaves the classification unchanged.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.catalog.delete_file(path).await?;
        self.ledger.commit(|s| s.classification.forget(path)).await;
        self.listing.write().await.retain(|r| r.path != path);
        self.selection.lock().await.deselect(path);
        info!(path, "asset deleted");
        self.emit(AssetEvent::Deleted {
            path: path.to_string(),
        });
        Ok(())
    }

    /// Makes uploaded and hidden files visible again. New-file detection is
    /// unaffected since `known` is kept.
    pub async fn show_all(&self) {
        self.ledger.commit(|s| s.classification.show_all()).await;
        self.emit(AssetEvent::Reset);
    }

    pub async fn select(&self, path: &str) -> bool {
        self.selection.lock().await.select(path)
    }

    pub async fn deselect(&self, path: &str) -> bool {
        self.selection.lock().await.deselect(path)
    }

    pub async fn toggle(&self, path: &str) -> bool {
        self.selection.lock().await.toggle(path)
    }

    /// Selects every visible path of the last listing.
    pub async fn select_all(&self) -> usize {
        let listing = self.listing.read().await.clone();
        let visible: Vec<AssetRecord> = self
            .ledger
            .read(|s| {
                classifier::visible(&listing, &s.classification)
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .await;
        let mut selection = self.selection.lock().await;
        selection.select_all(&visible);
        selection.len()
    }

    pub async fn deselect_all(&self) {
        self.selection.lock().await.deselect_all();
    }

    pub async fn selection(&self) -> Selection {
        self.selection.lock().await.clone()
    }

    /// Marks every file currently listed as known, so only files produced
    /// from now on count as new. Returns how many paths were added.
    pub async fn prime_known(&self) -> Result<usize> {
        let records = self.refresh().await?;
        let added = self
            .ledger
            .commit(|s| {
                s.classification
                    .mark_known(records.iter().map(|r| r.path.clone()))
            })
            .await;
        debug!(added, "known files primed");
        Ok(added)
    }

    /// One automatic pass: detect new files and upload them.
    ///
    /// Returns early, without any network call, when the mode is manual or
    /// the configuration is incomplete.
    pub async fn auto_check(&self) -> Result<AutoCheck> {
        let config = self.configuration().await;
        if config.upload_mode != UploadMode::Automatic {
            return Ok(AutoCheck::Disabled);
        }
        if !config.is_complete() {
            debug!("automatic mode without complete configuration; skipping");
            return Ok(AutoCheck::Unconfigured);
        }

        let records = self.refresh().await?;
        let fresh = self
            .ledger
            .commit(|s| classifier::new_since(&records, &mut s.classification))
            .await;
        let fresh: Vec<AssetRecord> = fresh
            .into_iter()
            .filter(|r| !self.ledger.is_in_flight(&r.path))
            .collect();
        if fresh.is_empty() {
            return Ok(AutoCheck::NothingNew);
        }

        info!(count = fresh.len(), "auto-uploading new files");
        let workflow = workflow::capture_best_effort(self.workflow.as_deref()).await;
        let batch = UploadBatch::automatic(&fresh, workflow);
        let paths = batch.paths.clone();
        let outcome = self.coordinator.upload(batch, &config).await?;
        if outcome.is_committed() {
            self.emit(AssetEvent::Uploaded {
                paths,
                automatic: true,
            });
        }
        Ok(AutoCheck::Uploaded(outcome))
    }
}
