//! Partitions a catalog snapshot against the classification sets.

use crate::models::AssetRecord;
use crate::state::ClassificationState;
use serde::Serialize;

/// Records neither uploaded nor hidden, in catalog order.
pub fn visible<'a>(catalog: &'a [AssetRecord], state: &ClassificationState) -> Vec<&'a AssetRecord> {
    catalog
        .iter()
        .filter(|r| state.is_visible(&r.path))
        .collect()
}

/// Records never reported before and neither uploaded nor hidden.
///
/// Every returned path is added to `known` here, before any upload is
/// attempted, so a crash mid-upload cannot report the same file twice.
pub fn new_since(catalog: &[AssetRecord], state: &mut ClassificationState) -> Vec<AssetRecord> {
    let fresh: Vec<AssetRecord> = catalog
        .iter()
        .filter(|r| !state.is_known(&r.path) && state.is_visible(&r.path))
        .cloned()
        .collect();
    state.mark_known(fresh.iter().map(|r| r.path.clone()));
    fresh
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub visible: usize,
    pub uploaded: usize,
    pub hidden: usize,
}

/// Counts how a catalog snapshot splits across the sets.
pub fn summarize(catalog: &[AssetRecord], state: &ClassificationState) -> Summary {
    let mut summary = Summary {
        total: catalog.len(),
        ..Summary::default()
    };
    for record in catalog {
        if state.is_uploaded(&record.path) {
            summary.uploaded += 1;
        } else if state.is_hidden(&record.path) {
            summary.hidden += 1;
        } else {
            summary.visible += 1;
        }
    }
    summary
}
