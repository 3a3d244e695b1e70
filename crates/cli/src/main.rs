use anyhow::Result;
use asset_manager_core::config::{self, AppConfig};
use asset_manager_core::{AssetManager, AssetRecord, UploadMode, UploadOutcome};
use clap::{Parser, Subcommand};
use cli::{setup, watch};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;
    let manager = setup::open_manager(&cfg, cli.workflow.as_deref()).await?;
    let json = cli.json;

    match cli.command {
        Commands::List { all } => run_list(&manager, all, json).await,
        Commands::Upload { paths } => {
            // Single uploads read name and size from the listing.
            if let Err(e) = manager.refresh().await {
                warn!("listing unavailable, sending bare paths: {}", e);
            }
            let outcome = manager.upload(paths).await?;
            print_outcome(&outcome, json)
        }
        Commands::UploadVisible => {
            manager.visible().await?;
            manager.select_all().await;
            let outcome = manager.upload_selected().await?;
            print_outcome(&outcome, json)
        }
        Commands::Hide { paths } => {
            for path in paths {
                if manager.hide(&path).await {
                    println!("hidden: {}", path);
                } else {
                    println!("already uploaded, not hidden: {}", path);
                }
            }
            Ok(())
        }
        Commands::Delete { paths } => {
            for path in paths {
                manager.delete(&path).await?;
                println!("deleted: {}", path);
            }
            Ok(())
        }
        Commands::ShowAll => {
            manager.show_all().await;
            println!("uploaded and hidden assets are visible again");
            Ok(())
        }
        Commands::Settings {
            api_key,
            organization,
        } => run_settings(&manager, api_key, organization, json).await,
        Commands::Organizations => {
            let orgs = manager.organizations().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&orgs)?);
            } else {
                for o in orgs {
                    println!("{}\t{}", o.id, o.name);
                }
            }
            Ok(())
        }
        Commands::Projects => {
            let projects = manager.projects().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&projects)?);
            } else {
                for p in projects {
                    println!("{}\t{}", p.id, p.name);
                }
            }
            Ok(())
        }
        Commands::UseOrganization { id } => {
            manager.select_organization(&id).await;
            println!("organization: {}", id);
            Ok(())
        }
        Commands::UseProject { id } => {
            manager.select_project(&id).await;
            println!("project: {}", id);
            Ok(())
        }
        Commands::Mode { mode } => {
            manager.set_upload_mode(mode).await;
            println!("upload mode: {}", mode);
            Ok(())
        }
        Commands::Status => run_status(&manager, json).await,
        Commands::Watch { dir } => run_watch(cfg, manager, dir).await,
    }
}

#[derive(Parser)]
#[command(name = "asset-manager")]
#[command(about = "Track, hide and upload generated assets", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    /// Output JSON
    #[arg(long, global = true)]
    json: bool,

    /// Exported workflow JSON attached to uploads
    #[arg(long, global = true)]
    workflow: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List assets not yet uploaded or hidden
    List {
        /// Include uploaded and hidden assets with their status
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// Upload the given paths in one request
    Upload {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Upload every visible asset
    UploadVisible,
    /// Hide assets from the list without deleting them
    Hide {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Delete asset files and forget them
    Delete {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Clear the uploaded and hidden sets
    ShowAll,
    /// Show or update the API key and organization
    Settings {
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        organization: Option<String>,
    },
    /// List organizations reachable with the API key
    Organizations,
    /// List projects of the effective organization
    Projects,
    /// Select the organization uploads go to
    UseOrganization { id: String },
    /// Select the project uploads go to
    UseProject { id: String },
    /// Switch between manual and automatic uploads
    Mode { mode: UploadMode },
    /// Show configuration and asset counts
    Status,
    /// Watch an output directory and upload new files automatically
    Watch {
        /// Directory to watch; defaults to catalog.output_dir
        dir: Option<String>,
    },
}

async fn run_list(manager: &AssetManager, all: bool, json: bool) -> Result<()> {
    if !all {
        let visible = manager.visible().await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&visible)?);
        } else {
            for r in &visible {
                println!("{}", format_record(r));
            }
            println!("{} asset(s)", visible.len());
        }
        return Ok(());
    }

    let records = manager.refresh().await?;
    let state = manager.classification().await;
    let status_of = |path: &str| {
        if state.is_uploaded(path) {
            "uploaded"
        } else if state.is_hidden(path) {
            "hidden"
        } else {
            "visible"
        }
    };
    if json {
        let rows: Vec<serde_json::Value> = records
            .iter()
            .map(|r| {
                let mut v = serde_json::to_value(r).unwrap_or_default();
                if let Some(obj) = v.as_object_mut() {
                    obj.insert("status".into(), status_of(&r.path).into());
                }
                v
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for r in &records {
            println!("{:<8} {}", status_of(&r.path), format_record(r));
        }
    }
    Ok(())
}

fn format_record(r: &AssetRecord) -> String {
    let size = r
        .size_bytes
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    let modified = r
        .modified_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!("{}\t{}\t{}\t{}", r.path, r.file_type, size, modified)
}

fn print_outcome(outcome: &UploadOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }
    match outcome {
        UploadOutcome::Success(report) => {
            println!(
                "uploaded {} asset(s)",
                report.successful.or(report.total).unwrap_or_default()
            );
        }
        UploadOutcome::PartialSuccess(report) => {
            println!(
                "partially uploaded: {} ok, {} failed",
                report.successful.unwrap_or_default(),
                report.failed.unwrap_or_default()
            );
            for e in &report.errors {
                println!("  {}: {}", e.file, e.error);
            }
        }
        UploadOutcome::Failure { reason } => {
            println!("upload failed: {}", reason);
        }
    }
    Ok(())
}

async fn run_settings(
    manager: &AssetManager,
    api_key: Option<String>,
    organization: Option<String>,
    json: bool,
) -> Result<()> {
    let current = manager.settings().await;
    if api_key.is_some() || organization.is_some() {
        manager
            .save_settings(
                api_key.as_deref().unwrap_or(&current.api_key),
                organization.as_deref().unwrap_or(&current.organization),
            )
            .await?;
    }
    let settings = manager.settings().await;
    let key = if settings.api_key.is_empty() {
        "(not set)"
    } else {
        "(set)"
    };
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "api_key_set": !settings.api_key.is_empty(),
                "organization": settings.organization,
            }))?
        );
    } else {
        println!("api key: {}", key);
        println!("organization: {}", settings.organization);
    }
    Ok(())
}

async fn run_status(manager: &AssetManager, json: bool) -> Result<()> {
    let config = manager.configuration().await;
    let summary = match manager.summary().await {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("listing unavailable: {}", e);
            None
        }
    };
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "upload_mode": config.upload_mode.to_string(),
                "organization": config.organization_id,
                "project": config.project_id,
                "api_key_set": !config.api_key.is_empty(),
                "configured": config.is_complete(),
                "summary": summary,
            }))?
        );
        return Ok(());
    }
    println!("upload mode: {}", config.upload_mode);
    println!("organization: {}", config.organization_id);
    println!("project: {}", config.project_id);
    if let Err(e) = config.validate() {
        println!("not ready to upload: {}", e);
    }
    if let Some(s) = summary {
        println!(
            "assets: {} total, {} visible, {} uploaded, {} hidden",
            s.total, s.visible, s.uploaded, s.hidden
        );
    }
    Ok(())
}

async fn run_watch(cfg: AppConfig, manager: AssetManager, dir: Option<String>) -> Result<()> {
    let Some(dir) = dir.or(cfg.catalog.output_dir.clone()) else {
        anyhow::bail!("no directory given and catalog.output_dir is not set");
    };
    if manager.configuration().await.upload_mode != UploadMode::Automatic {
        println!("upload mode is manual; run `mode automatic` to upload new files");
    }
    watch::watch_output(
        Arc::new(manager),
        PathBuf::from(dir),
        cfg.scheduler.quiet_period(),
    )
    .await
}
