//! The single shared, durable copy of [`AssetState`].

use crate::state::AssetState;
use crate::store::StateStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;
use tracing::{error, warn};

pub struct Ledger {
    state: Mutex<AssetState>,
    store: StateStore,
    in_flight: Arc<StdMutex<HashMap<String, usize>>>,
}

impl Ledger {
    /// Loads the persisted state. An unreadable record is logged and the
    /// session starts from an empty state.
    pub async fn open(store: StateStore) -> Self {
        let state = match store.load_state().await {
            Ok(state) => state,
            Err(e) => {
                error!("failed to load asset state, starting empty: {}", e);
                AssetState::default()
            }
        };
        Self::with_state(store, state)
    }

    pub fn with_state(store: StateStore, state: AssetState) -> Self {
        Self {
            state: Mutex::new(state),
            store,
            in_flight: Arc::new(StdMutex::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub async fn snapshot(&self) -> AssetState {
        self.state.lock().await.clone()
    }

    pub async fn read<R>(&self, f: impl FnOnce(&AssetState) -> R) -> R {
        f(&*self.state.lock().await)
    }

    /// Applies `f` and writes the whole state back before releasing the lock,
    /// so writes land in mutation order. A failed write is logged; memory
    /// stays authoritative for the session.
    pub async fn commit<R>(&self, f: impl FnOnce(&mut AssetState) -> R) -> R {
        let mut guard = self.state.lock().await;
        let result = f(&mut guard);
        if let Err(e) = self.store.save_state(&guard).await {
            error!("asset state not persisted: {}", e);
        }
        result
    }

    /// Marks `paths` as being uploaded until the returned guard drops.
    pub fn begin_upload(&self, paths: &[String]) -> InFlight {
        let mut set = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        for path in paths {
            let count = set.entry(path.clone()).or_insert(0);
            if *count > 0 {
                warn!(path = %path, "path already has an upload in flight");
            }
            *count += 1;
        }
        InFlight {
            paths: paths.to_vec(),
            set: self.in_flight.clone(),
        }
    }

    pub fn is_in_flight(&self, path: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains_key(path)
    }
}

pub struct InFlight {
    paths: Vec<String>,
    set: Arc<StdMutex<HashMap<String, usize>>>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut set = self.set.lock().unwrap_or_else(|p| p.into_inner());
        for path in &self.paths {
            if let Some(count) = set.get_mut(path) {
                *count -= 1;
                if *count == 0 {
                    set.remove(path);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::{KeyValueStore, MemoryStore};

    struct BrokenStore;

    #[async_trait::async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            anyhow::bail!("disk unavailable")
        }
        async fn put(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
        async fn remove(&self, _key: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn commit_persists_whole_state() {
        let store = StateStore::new(Arc::new(MemoryStore::new()));
        let ledger = Ledger::open(store.clone()).await;
        ledger
            .commit(|s| s.classification.mark_uploaded(["a.png"]))
            .await;
        let reloaded = store.load_state().await.unwrap();
        assert!(reloaded.classification.is_uploaded("a.png"));
    }

    #[tokio::test]
    async fn failed_write_keeps_memory_authoritative() {
        let ledger = Ledger::open(StateStore::new(Arc::new(BrokenStore))).await;
        let hidden = ledger.commit(|s| s.classification.hide("b.png")).await;
        assert!(hidden);
        assert!(ledger.read(|s| s.classification.is_hidden("b.png")).await);
    }

    #[tokio::test]
    async fn in_flight_guard_releases_on_drop() {
        let ledger = Ledger::open(StateStore::new(Arc::new(MemoryStore::new()))).await;
        let paths = vec!["a.png".to_string()];
        {
            let _guard = ledger.begin_upload(&paths);
            assert!(ledger.is_in_flight("a.png"));
        }
        assert!(!ledger.is_in_flight("a.png"));
    }
}
