use redis::{AsyncCommands, Client};

use crate::error::FeedResult;
use crate::store::{KeyValueStore, StoreKey};

/// Redis-backed key-value store
///
/// Persisted engine state is small (one id array, one counter snapshot), so
/// plain SET without expiry is enough.
pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    pub fn connect(redis_url: &str) -> anyhow::Result<Self> {
        let client = Client::open(redis_url)?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &StoreKey) -> FeedResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(key.to_string()).await?;
        Ok(value)
    }

    async fn set(&self, key: &StoreKey, value: String) -> FeedResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set(key.to_string(), value).await?;
        Ok(())
    }
}
