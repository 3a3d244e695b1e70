use anyhow::{Context, Result};
use asset_manager_core::{AssetEvent, AssetManager, AutomaticUploadScheduler};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// True when `event` looks like a finished output file: created or written,
/// and not a dotfile.
pub fn is_output_event(event: &Event) -> bool {
    let relevant = matches!(
        event.kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Modify(ModifyKind::Any)
    );
    relevant && event.paths.iter().any(|p| !is_hidden(p))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

/// Watches `dir` and feeds the automatic upload scheduler until Ctrl-C.
///
/// Files already present are primed as known first, so only output produced
/// while watching is uploaded.
pub async fn watch_output(
    manager: Arc<AssetManager>,
    dir: PathBuf,
    quiet_period: Duration,
) -> Result<()> {
    match manager.prime_known().await {
        Ok(n) => info!(known = n, "existing outputs primed"),
        Err(e) => warn!("could not prime existing outputs: {}", e),
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        },
        notify::Config::default().with_poll_interval(Duration::from_secs(2)),
    )?;
    watcher
        .watch(&dir, RecursiveMode::Recursive)
        .with_context(|| format!("watch {:?}", dir))?;

    let scheduler = AutomaticUploadScheduler::new(manager.clone(), quiet_period);
    let mut events = manager.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            print_event(&event);
        }
    });

    println!("Watching {:?} (quiet period {:?})...", dir, quiet_period);
    loop {
        tokio::select! {
            res = rx.recv() => match res {
                Some(Ok(event)) if is_output_event(&event) => scheduler.signal(),
                Some(Ok(_)) => {}
                Some(Err(e)) => eprintln!("watch error: {:?}", e),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                scheduler.cancel();
                break;
            }
        }
    }
    printer.abort();
    Ok(())
}

fn print_event(event: &AssetEvent) {
    match event {
        AssetEvent::Uploaded { paths, automatic } => {
            let how = if *automatic { "auto-uploaded" } else { "uploaded" };
            println!("{} {} file(s): {}", how, paths.len(), paths.join(", "));
        }
        AssetEvent::AutoUploadFailed { message } => {
            eprintln!("automatic upload failed: {}", message)
        }
        _ => {}
    }
}
