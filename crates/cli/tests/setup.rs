use asset_manager_core::config::{AppConfig, CatalogSource};
use asset_manager_core::AssetError;
use cli::setup::{build_catalog, build_service, open_manager};
use providers::AssetService;

fn config_in(dir: &std::path::Path) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.database.path = dir.join("state.db").to_string_lossy().into_owned();
    cfg
}

#[tokio::test]
async fn without_base_url_remote_calls_are_refused() {
    let temp = tempfile::tempdir().unwrap();
    let cfg = config_in(temp.path());
    let service = build_service(&cfg).unwrap();
    assert!(service.list_files().await.is_err());

    let manager = open_manager(&cfg, None).await.unwrap();
    let err = manager.visible().await.unwrap_err();
    assert!(matches!(err, AssetError::Configuration(_)));
}

#[test]
fn directory_catalog_needs_output_dir() {
    let temp = tempfile::tempdir().unwrap();
    let mut cfg = config_in(temp.path());
    cfg.catalog.source = CatalogSource::Directory;
    let service = build_service(&cfg).unwrap();
    assert!(build_catalog(&cfg, service.clone()).is_err());

    cfg.catalog.output_dir = Some(temp.path().to_string_lossy().into_owned());
    assert!(build_catalog(&cfg, service).is_ok());
}

#[tokio::test]
async fn directory_manager_lists_local_outputs() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("output");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("a.png"), b"png").unwrap();
    std::fs::write(out.join("notes.bin"), b"x").unwrap();

    let mut cfg = config_in(temp.path());
    cfg.catalog.source = CatalogSource::Directory;
    cfg.catalog.output_dir = Some(out.to_string_lossy().into_owned());

    let manager = open_manager(&cfg, None).await.unwrap();
    let visible = manager.visible().await.unwrap();
    let paths: Vec<_> = visible.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["a.png"]);

    assert!(manager.hide("a.png").await);
    drop(manager);
    let manager = open_manager(&cfg, None).await.unwrap();
    assert!(manager.visible().await.unwrap().is_empty());
}
