//! Typed access to the two persisted records.

use crate::error::{AssetError, Result};
use crate::state::{AssetState, Settings, StateRecord, SETTINGS_KEY, STATE_KEY};
use std::sync::Arc;
use storage::{get_json, put_json, KeyValueStore};

#[derive(Clone)]
pub struct StateStore {
    kv: Arc<dyn KeyValueStore>,
}

impl StateStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Missing record yields default settings.
    pub async fn load_settings(&self) -> Result<Settings> {
        let settings = get_json::<Settings>(self.kv.as_ref(), SETTINGS_KEY)
            .await
            .map_err(AssetError::persistence)?;
        Ok(settings.unwrap_or_default())
    }

    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        put_json(self.kv.as_ref(), SETTINGS_KEY, settings)
            .await
            .map_err(AssetError::persistence)
    }

    /// Missing record yields an empty state.
    pub async fn load_state(&self) -> Result<AssetState> {
        let record = get_json::<StateRecord>(self.kv.as_ref(), STATE_KEY)
            .await
            .map_err(AssetError::persistence)?;
        Ok(record.map(AssetState::from).unwrap_or_default())
    }

    /// Writes the whole state record in one put.
    pub async fn save_state(&self, state: &AssetState) -> Result<()> {
        put_json(self.kv.as_ref(), STATE_KEY, &StateRecord::from(state))
            .await
            .map_err(AssetError::persistence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UploadMode;
    use crate::state::ClassificationState;
    use storage::MemoryStore;

    #[tokio::test]
    async fn empty_store_loads_defaults() {
        let store = StateStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(store.load_settings().await.unwrap(), Settings::default());
        assert_eq!(store.load_state().await.unwrap(), AssetState::default());
    }

    #[tokio::test]
    async fn records_are_independent() {
        let kv = Arc::new(MemoryStore::new());
        let store = StateStore::new(kv.clone());
        let state = AssetState {
            classification: ClassificationState::from_sets(
                vec!["a.png".to_string()],
                vec!["b.png".to_string()],
                vec!["c.png".to_string()],
            ),
            selected_project: "p".into(),
            selected_organization: "o".into(),
            upload_mode: UploadMode::Automatic,
        };
        store.save_state(&state).await.unwrap();
        assert_eq!(store.load_settings().await.unwrap(), Settings::default());

        store
            .save_settings(&Settings {
                api_key: "k".into(),
                organization: "o".into(),
            })
            .await
            .unwrap();

        let reopened = StateStore::new(kv);
        assert_eq!(reopened.load_state().await.unwrap(), state);
        assert_eq!(reopened.load_settings().await.unwrap().api_key, "k");
    }

    #[tokio::test]
    async fn unreadable_record_is_a_persistence_error() {
        let kv = Arc::new(MemoryStore::new());
        kv.put(STATE_KEY, "{ not json").await.unwrap();
        let store = StateStore::new(kv);
        assert!(matches!(
            store.load_state().await,
            Err(AssetError::Persistence(_))
        ));
    }
}
