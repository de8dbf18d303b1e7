pub mod ops;
pub mod run;

use std::sync::Arc;

use anyhow::Context;
use kvbatch_core::StoreClient;
use kvbatch_store::{MemoryStore, RedisStore};

use crate::settings::Settings;

/// Backing client selected by `store.url`
async fn open_store(settings: &Settings) -> anyhow::Result<Arc<dyn StoreClient>> {
    match &settings.store.url {
        Some(url) => {
            let store = RedisStore::connect(url)
                .await
                .context("connecting to the configured Redis store")?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(MemoryStore::new())),
    }
}
