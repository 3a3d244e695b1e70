//! Wires configuration into a ready [`AssetManager`].

use anyhow::{bail, Context, Result};
use asset_manager_core::catalog::{DirectoryCatalog, FileCatalog, ServiceCatalog};
use asset_manager_core::config::{AppConfig, CatalogSource};
use asset_manager_core::store::StateStore;
use asset_manager_core::workflow::JsonFileWorkflow;
use asset_manager_core::AssetManager;
use providers::http::{HttpAssetService, HttpServiceConfig};
use providers::noop::NoopService;
use providers::AssetService;
use std::sync::Arc;
use storage::SqliteStore;
use tracing::{debug, warn};

pub fn build_service(cfg: &AppConfig) -> Result<Arc<dyn AssetService>> {
    match &cfg.service.base_url {
        Some(url) if !url.trim().is_empty() => {
            let http = HttpServiceConfig {
                base_url: url.trim().to_string(),
                timeout: cfg.service.timeout(),
            };
            debug!(base_url = %http.base_url, "using http asset service");
            Ok(Arc::new(HttpAssetService::new(http)?))
        }
        _ => {
            warn!("service.base_url not set; remote calls are disabled");
            Ok(Arc::new(NoopService))
        }
    }
}

pub fn build_catalog(
    cfg: &AppConfig,
    service: Arc<dyn AssetService>,
) -> Result<Arc<dyn FileCatalog>> {
    match cfg.catalog.source {
        CatalogSource::Service => Ok(Arc::new(ServiceCatalog::new(service))),
        CatalogSource::Directory => {
            let Some(dir) = cfg.catalog.output_dir.as_deref() else {
                bail!("catalog.source = \"directory\" requires catalog.output_dir");
            };
            let catalog = DirectoryCatalog::new(dir, &cfg.catalog.exclude)
                .with_context(|| format!("open output directory {}", dir))?;
            Ok(Arc::new(catalog))
        }
    }
}

/// Opens the state database and builds the manager. `workflow` names an
/// exported workflow JSON attached to every upload.
pub async fn open_manager(cfg: &AppConfig, workflow: Option<&str>) -> Result<AssetManager> {
    let service = build_service(cfg)?;
    let catalog = build_catalog(cfg, service.clone())?;
    let kv = SqliteStore::open(&cfg.database.path)
        .await
        .with_context(|| format!("open database {}", cfg.database.path))?;
    let manager = AssetManager::open(catalog, service, StateStore::new(Arc::new(kv))).await;
    Ok(match workflow {
        Some(path) => manager.with_workflow(Arc::new(JsonFileWorkflow::new(path))),
        None => manager,
    })
}
