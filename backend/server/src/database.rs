//! # Redis
//!
//! Record store for complaints.
//!
//! ## Layout
//!
//! - `complaint:<refId>`: the record as JSON
//! - `complaints:by_created`: sorted set of ref ids scored by `createdAt` millis, drives the
//!   newest-first listing
//! - `complaints:resolved`: set of resolved ref ids, `SCARD` gives the roads fixed count
//! - `complaints:issued`: every ref id ever handed out, never shrinks, so `SADD` doubles as
//!   the uniqueness check
//!
//! ## Atomicity
//!
//! Inserts and removals are `MULTI` pipelines. Status changes run as one Lua script that
//! compares the stored status, writes the record and fixes `complaints:resolved` together,
//! so a removal can never leave a stale resolved entry behind. Listing skips index entries
//! whose record is already gone.
use std::{sync::LazyLock, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use records::{ComplaintRecord, Status};
use redis::{
    AsyncCommands, Client, Script,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use tracing::debug;

use crate::{
    error::StoreError,
    store::{ComplaintStore, Replaced, StatusCounts},
};

const BY_CREATED_KEY: &str = "complaints:by_created";
const RESOLVED_KEY: &str = "complaints:resolved";
const ISSUED_KEY: &str = "complaints:issued";

/// KEYS: record, resolved set. ARGV: new json, expected status, new status, ref id.
/// Answers `OK`, `MISSING`, or the status that was found instead.
static REPLACE_IF_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
local current = redis.call('GET', KEYS[1])
if not current then
    return 'MISSING'
end

local status = cjson.decode(current)['status']
if status ~= ARGV[2] then
    return status
end

redis.call('SET', KEYS[1], ARGV[1])
if ARGV[3] == 'Resolved' then
    redis.call('SADD', KEYS[2], ARGV[4])
else
    redis.call('SREM', KEYS[2], ARGV[4])
end

return 'OK'
",
    )
});

fn record_key(ref_id: &str) -> String {
    format!("complaint:{ref_id}")
}

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(500));

    let client = Client::open(redis_url).with_context(|| format!("Invalid Redis URL {redis_url}"))?;
    let connection_manager = client
        .get_connection_manager_with_config(config)
        .await
        .context("Failed to connect to Redis")?;

    Ok(connection_manager)
}

pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl ComplaintStore for RedisStore {
    async fn insert(&self, record: &ComplaintRecord) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let json = serde_json::to_string(record)?;

        let claimed: i64 = connection.sadd(ISSUED_KEY, &record.ref_id).await?;
        if claimed == 0 {
            return Err(StoreError::Duplicate(record.ref_id.clone()));
        }

        let mut pipe = redis::pipe();
        pipe.atomic()
            .set(record_key(&record.ref_id), json)
            .ignore()
            .zadd(
                BY_CREATED_KEY,
                &record.ref_id,
                record.created_at.timestamp_millis(),
            )
            .ignore();

        if record.status == Status::Resolved {
            pipe.sadd(RESOLVED_KEY, &record.ref_id).ignore();
        }

        pipe.query_async::<()>(&mut connection).await?;

        debug!("Stored complaint {}", record.ref_id);
        Ok(())
    }

    async fn get(&self, ref_id: &str) -> Result<Option<ComplaintRecord>, StoreError> {
        let mut connection = self.connection.clone();
        let json: Option<String> = connection.get(record_key(ref_id)).await?;

        Ok(json.map(|json| serde_json::from_str(&json)).transpose()?)
    }

    async fn list(&self) -> Result<Vec<ComplaintRecord>, StoreError> {
        let mut connection = self.connection.clone();
        let ref_ids: Vec<String> = connection.zrevrange(BY_CREATED_KEY, 0, -1).await?;

        if ref_ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ref_ids.iter().map(|ref_id| record_key(ref_id)).collect();
        let documents: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut connection)
            .await?;

        documents
            .into_iter()
            .flatten()
            .map(|json| serde_json::from_str(&json).map_err(StoreError::from))
            .collect()
    }

    async fn replace_if(
        &self,
        record: &ComplaintRecord,
        expected: Status,
    ) -> Result<Replaced, StoreError> {
        let mut connection = self.connection.clone();
        let json = serde_json::to_string(record)?;

        let outcome: String = REPLACE_IF_SCRIPT
            .key(record_key(&record.ref_id))
            .key(RESOLVED_KEY)
            .arg(json)
            .arg(expected.as_str())
            .arg(record.status.as_str())
            .arg(&record.ref_id)
            .invoke_async(&mut connection)
            .await?;

        match outcome.as_str() {
            "OK" => Ok(Replaced::Written),
            "MISSING" => Ok(Replaced::Missing),
            current => current
                .parse()
                .map(Replaced::Conflict)
                .map_err(|_| StoreError::Corrupt(record.ref_id.clone())),
        }
    }

    async fn remove(&self, ref_id: &str) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();

        let (deleted, _, _): (i64, i64, i64) = redis::pipe()
            .atomic()
            .del(record_key(ref_id))
            .zrem(BY_CREATED_KEY, ref_id)
            .srem(RESOLVED_KEY, ref_id)
            .query_async(&mut connection)
            .await?;

        Ok(deleted > 0)
    }

    async fn counts(&self) -> Result<StatusCounts, StoreError> {
        let mut connection = self.connection.clone();

        let (total, resolved): (u64, u64) = redis::pipe()
            .zcard(BY_CREATED_KEY)
            .scard(RESOLVED_KEY)
            .query_async(&mut connection)
            .await?;

        Ok(StatusCounts { total, resolved })
    }
}
