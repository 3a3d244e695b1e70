use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub service: ServiceConfig,
    pub catalog: CatalogConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/asset-manager.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    #[default]
    Service,
    Directory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub source: CatalogSource,
    pub output_dir: Option<String>,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub quiet_period_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: 2000,
        }
    }
}

impl SchedulerConfig {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

/// Loads the TOML file at `path` (or `config/default` when absent and
/// present on disk), overlaid with `ASSET_MANAGER__SECTION__KEY` variables.
pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("ASSET_MANAGER")
            .prefix_separator("__")
            .separator("__"),
    );
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("asset.toml");
        std::fs::write(
            &path,
            r#"
            [service]
            base_url = "http://127.0.0.1:8188/asset-manager"

            [catalog]
            source = "directory"
            output_dir = "/srv/output"
            exclude = ["**/temp"]

            [scheduler]
            quiet_period_ms = 500
            "#,
        )
        .unwrap();
        let cfg = load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(cfg.catalog.source, CatalogSource::Directory);
        assert_eq!(cfg.catalog.exclude, vec!["**/temp"]);
        assert_eq!(cfg.scheduler.quiet_period(), Duration::from_millis(500));
        assert_eq!(cfg.service.timeout_secs, 30);
        assert_eq!(cfg.database.path, "data/asset-manager.db");
    }

    #[test]
    fn defaults_match_two_second_debounce() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.scheduler.quiet_period(), Duration::from_secs(2));
        assert_eq!(cfg.catalog.source, CatalogSource::Service);
        assert!(cfg.service.base_url.is_none());
    }
}
