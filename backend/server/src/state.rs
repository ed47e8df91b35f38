use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use super::{
    auth::AccessGate,
    config::Config,
    database::{RedisStore, init_redis},
    lifecycle::ComplaintService,
    store::{ComplaintStore, MemoryStore},
};

pub const MEMORY_STORE_URL: &str = "memory://";

pub struct State {
    pub config: Config,
    pub complaints: ComplaintService,
    pub gate: AccessGate,
}

impl State {
    pub async fn new() -> Result<Arc<Self>> {
        let config = Config::load()?;

        let store: Arc<dyn ComplaintStore> = if config.redis_url == MEMORY_STORE_URL {
            info!("Using in-memory store, records are lost on exit");
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(RedisStore::new(init_redis(&config.redis_url).await?))
        };

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn ComplaintStore>) -> Arc<Self> {
        let gate = AccessGate::new(&config.moderator_username, &config.moderator_password);

        Arc::new(Self {
            complaints: ComplaintService::new(store),
            gate,
            config,
        })
    }
}
