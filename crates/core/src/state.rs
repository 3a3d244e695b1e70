//! Classification sets and the records they persist as.

use crate::models::UploadMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const SETTINGS_KEY: &str = "asset-manager-settings";
pub const STATE_KEY: &str = "asset-manager-state";

/// Credential and default organization, persisted under [`SETTINGS_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub api_key: String,
    pub organization: String,
}

/// Which paths are uploaded, hidden, or merely seen.
///
/// `uploaded` and `hidden` never overlap; `known` covers both plus every
/// path the automatic check has already reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationState {
    uploaded: BTreeSet<String>,
    hidden: BTreeSet<String>,
    known: BTreeSet<String>,
}

impl ClassificationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a state from raw sets. A path found in both `uploaded` and
    /// `hidden` is treated as uploaded.
    pub fn from_sets<U, H, K>(uploaded: U, hidden: H, known: K) -> Self
    where
        U: IntoIterator<Item = String>,
        H: IntoIterator<Item = String>,
        K: IntoIterator<Item = String>,
    {
        let uploaded: BTreeSet<String> = uploaded.into_iter().collect();
        let hidden: BTreeSet<String> = hidden
            .into_iter()
            .filter(|p| !uploaded.contains(p))
            .collect();
        let mut known: BTreeSet<String> = known.into_iter().collect();
        known.extend(uploaded.iter().cloned());
        known.extend(hidden.iter().cloned());
        Self {
            uploaded,
            hidden,
            known,
        }
    }

    pub fn is_uploaded(&self, path: &str) -> bool {
        self.uploaded.contains(path)
    }

    pub fn is_hidden(&self, path: &str) -> bool {
        self.hidden.contains(path)
    }

    pub fn is_known(&self, path: &str) -> bool {
        self.known.contains(path)
    }

    /// Neither uploaded nor hidden.
    pub fn is_visible(&self, path: &str) -> bool {
        !self.is_uploaded(path) && !self.is_hidden(path)
    }

    pub fn uploaded(&self) -> &BTreeSet<String> {
        &self.uploaded
    }

    pub fn hidden(&self) -> &BTreeSet<String> {
        &self.hidden
    }

    pub fn known(&self) -> &BTreeSet<String> {
        &self.known
    }

    pub fn mark_uploaded<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for path in paths {
            let path = path.into();
            self.hidden.remove(&path);
            self.known.insert(path.clone());
            self.uploaded.insert(path);
        }
    }

    /// Hides `path`. Uploaded paths stay uploaded; returns whether the path
    /// is now hidden.
    pub fn hide(&mut self, path: &str) -> bool {
        if self.uploaded.contains(path) {
            return false;
        }
        self.known.insert(path.to_string());
        self.hidden.insert(path.to_string());
        true
    }

    pub fn mark_known<I, S>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for path in paths {
            if self.known.insert(path.into()) {
                added += 1;
            }
        }
        added
    }

    /// Drops every trace of `path`, so a file reappearing under the same
    /// path is treated as brand new.
    pub fn forget(&mut self, path: &str) {
        self.uploaded.remove(path);
        self.hidden.remove(path);
        self.known.remove(path);
    }

    /// Clears `uploaded` and `hidden`; `known` is kept.
    pub fn show_all(&mut self) {
        self.uploaded.clear();
        self.hidden.clear();
    }
}

/// In-memory view of everything stored under [`STATE_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetState {
    pub classification: ClassificationState,
    pub selected_project: String,
    pub selected_organization: String,
    pub upload_mode: UploadMode,
}

/// Wire layout of the state record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StateRecord {
    pub uploaded_assets: Vec<String>,
    pub hidden_assets: Vec<String>,
    pub known_assets: Vec<String>,
    pub selected_project: String,
    pub selected_organization: String,
    pub upload_mode: UploadMode,
}

impl From<StateRecord> for AssetState {
    fn from(record: StateRecord) -> Self {
        Self {
            classification: ClassificationState::from_sets(
                record.uploaded_assets,
                record.hidden_assets,
                record.known_assets,
            ),
            selected_project: record.selected_project,
            selected_organization: record.selected_organization,
            upload_mode: record.upload_mode,
        }
    }
}

impl From<&AssetState> for StateRecord {
    fn from(state: &AssetState) -> Self {
        let c = &state.classification;
        Self {
            uploaded_assets: c.uploaded.iter().cloned().collect(),
            hidden_assets: c.hidden.iter().cloned().collect(),
            known_assets: c.known.iter().cloned().collect(),
            selected_project: state.selected_project.clone(),
            selected_organization: state.selected_organization.clone(),
            upload_mode: state.upload_mode,
        }
    }
}
