use crate::models::AssetRecord;
use std::collections::BTreeSet;

/// Paths the user has ticked for a bulk upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    paths: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, path: &str) -> bool {
        self.paths.insert(path.to_string())
    }

    pub fn deselect(&mut self, path: &str) -> bool {
        self.paths.remove(path)
    }

    /// Flips membership; returns whether `path` is selected afterwards.
    pub fn toggle(&mut self, path: &str) -> bool {
        if self.paths.remove(path) {
            false
        } else {
            self.paths.insert(path.to_string());
            true
        }
    }

    pub fn select_all<'a>(&mut self, records: impl IntoIterator<Item = &'a AssetRecord>) {
        self.paths.extend(records.into_iter().map(|r| r.path.clone()));
    }

    pub fn deselect_all(&mut self) {
        self.paths.clear();
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Selected paths among `visible`, in display order.
    pub fn selected_in(&self, visible: &[AssetRecord]) -> Vec<String> {
        visible
            .iter()
            .filter(|r| self.paths.contains(&r.path))
            .map(|r| r.path.clone())
            .collect()
    }

    /// Drops selections that are no longer displayed.
    pub fn retain_visible(&mut self, visible: &[AssetRecord]) {
        let shown: BTreeSet<&str> = visible.iter().map(|r| r.path.as_str()).collect();
        self.paths.retain(|p| shown.contains(p.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_all_then_toggle_one_off() {
        let visible: Vec<AssetRecord> = ["c.png", "a.png", "b.png"]
            .iter()
            .map(|p| AssetRecord::from_path(*p))
            .collect();
        let mut sel = Selection::new();
        sel.select_all(&visible);
        assert_eq!(sel.len(), 3);
        assert!(!sel.toggle("a.png"));
        assert_eq!(sel.selected_in(&visible), vec!["c.png", "b.png"]);
        sel.deselect_all();
        assert!(sel.is_empty());
    }

    #[test]
    fn retain_visible_prunes_vanished_paths() {
        let mut sel = Selection::new();
        sel.select("gone.png");
        sel.select("a.png");
        sel.retain_visible(&[AssetRecord::from_path("a.png")]);
        assert!(sel.contains("a.png"));
        assert!(!sel.contains("gone.png"));
    }
}
