//! # Record Store
//!
//! Complaint persistence behind [`ComplaintStore`]. Production runs on
//! Redis ([`crate::database::RedisStore`]), tests and `memory://` on
//! [`MemoryStore`].
//!
//! Every reference id ever inserted stays in an issued set, so a deleted
//! id is never handed out again.
//!
//! Status writes are compare-and-set on the status that was read, so two
//! moderators racing on one record cannot walk it backwards.
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use records::{ComplaintRecord, Status};
use tokio::sync::RwLock;

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: u64,
    pub resolved: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replaced {
    Written,
    Missing,
    /// Someone else moved the record first, this is its status now.
    Conflict(Status),
}

#[async_trait]
pub trait ComplaintStore: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] if the id was ever issued.
    async fn insert(&self, record: &ComplaintRecord) -> Result<(), StoreError>;

    async fn get(&self, ref_id: &str) -> Result<Option<ComplaintRecord>, StoreError>;

    /// Newest `created_at` first.
    async fn list(&self) -> Result<Vec<ComplaintRecord>, StoreError>;

    /// Overwrites the stored record only while its status is still
    /// `expected`. Record and resolved index change together or not at all.
    async fn replace_if(
        &self,
        record: &ComplaintRecord,
        expected: Status,
    ) -> Result<Replaced, StoreError>;

    /// `false` if there was nothing to remove.
    async fn remove(&self, ref_id: &str) -> Result<bool, StoreError>;

    async fn counts(&self) -> Result<StatusCounts, StoreError>;
}

#[derive(Default)]
struct MemoryState {
    records: HashMap<String, ComplaintRecord>,
    issued: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ComplaintStore for MemoryStore {
    async fn insert(&self, record: &ComplaintRecord) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        if !state.issued.insert(record.ref_id.clone()) {
            return Err(StoreError::Duplicate(record.ref_id.clone()));
        }

        state.records.insert(record.ref_id.clone(), record.clone());

        Ok(())
    }

    async fn get(&self, ref_id: &str) -> Result<Option<ComplaintRecord>, StoreError> {
        Ok(self.state.read().await.records.get(ref_id).cloned())
    }

    async fn list(&self) -> Result<Vec<ComplaintRecord>, StoreError> {
        let mut records: Vec<ComplaintRecord> =
            self.state.read().await.records.values().cloned().collect();

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(records)
    }

    async fn replace_if(
        &self,
        record: &ComplaintRecord,
        expected: Status,
    ) -> Result<Replaced, StoreError> {
        let mut state = self.state.write().await;

        match state.records.get_mut(&record.ref_id) {
            None => Ok(Replaced::Missing),
            Some(existing) if existing.status != expected => {
                Ok(Replaced::Conflict(existing.status))
            }
            Some(existing) => {
                *existing = record.clone();
                Ok(Replaced::Written)
            }
        }
    }

    async fn remove(&self, ref_id: &str) -> Result<bool, StoreError> {
        Ok(self.state.write().await.records.remove(ref_id).is_some())
    }

    async fn counts(&self) -> Result<StatusCounts, StoreError> {
        let state = self.state.read().await;

        Ok(StatusCounts {
            total: state.records.len() as u64,
            resolved: state
                .records
                .values()
                .filter(|record| record.status == Status::Resolved)
                .count() as u64,
        })
    }
}

/// Behavior every [`ComplaintStore`] must share. Ids are random so the
/// scenarios can run against a Redis that already holds data.
#[cfg(test)]
pub(crate) mod scenarios {
    use chrono::{Duration, TimeZone, Utc};
    use rand::Rng;
    use records::{ComplaintRecord, Severity, Status, format_ref_id};

    use super::{ComplaintStore, Replaced};
    use crate::error::StoreError;

    pub fn fresh_id() -> String {
        let mut rng = rand::thread_rng();

        format_ref_id(rng.gen_range(1000..=9999), rng.gen_range(10000..=99999))
    }

    pub fn record(ref_id: &str, minutes: i64) -> ComplaintRecord {
        ComplaintRecord::submitted(
            ref_id.to_string(),
            "9876543210".to_string(),
            "Indiranagar".to_string(),
            "100 Feet Road".to_string(),
            Severity::Severe,
            String::new(),
            Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes),
        )
    }

    fn moved(record: &ComplaintRecord, status: Status) -> ComplaintRecord {
        let mut moved = record.clone();
        moved.status = status;
        moved
    }

    pub async fn insert_and_get(store: &dyn ComplaintStore) {
        let ref_id = fresh_id();
        store.insert(&record(&ref_id, 0)).await.unwrap();

        let found = store.get(&ref_id).await.unwrap().unwrap();
        assert_eq!(found, record(&ref_id, 0));
        assert!(store.get(&fresh_id()).await.unwrap().is_none());
    }

    pub async fn duplicate_rejected(store: &dyn ComplaintStore) {
        let ref_id = fresh_id();
        store.insert(&record(&ref_id, 0)).await.unwrap();

        let result = store.insert(&record(&ref_id, 5)).await;
        assert!(matches!(result, Err(StoreError::Duplicate(id)) if id == ref_id));
    }

    pub async fn removed_id_stays_issued(store: &dyn ComplaintStore) {
        let ref_id = fresh_id();
        store.insert(&record(&ref_id, 0)).await.unwrap();

        assert!(store.remove(&ref_id).await.unwrap());
        assert!(!store.remove(&ref_id).await.unwrap());
        assert!(store.get(&ref_id).await.unwrap().is_none());
        assert!(matches!(
            store.insert(&record(&ref_id, 1)).await,
            Err(StoreError::Duplicate(_))
        ));
    }

    pub async fn list_newest_first(store: &dyn ComplaintStore) {
        let ids = [fresh_id(), fresh_id(), fresh_id()];
        store.insert(&record(&ids[0], 0)).await.unwrap();
        store.insert(&record(&ids[2], 20)).await.unwrap();
        store.insert(&record(&ids[1], 10)).await.unwrap();

        let listed: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.ref_id)
            .filter(|ref_id| ids.contains(ref_id))
            .collect();

        assert_eq!(listed, [ids[2].clone(), ids[1].clone(), ids[0].clone()]);
    }

    pub async fn replace_if_checks_status(store: &dyn ComplaintStore) {
        let ref_id = fresh_id();
        let submitted = record(&ref_id, 0);
        store.insert(&submitted).await.unwrap();

        let resolved = moved(&submitted, Status::Resolved);
        assert_eq!(
            store.replace_if(&resolved, Status::Submitted).await.unwrap(),
            Replaced::Written
        );

        let assigned = moved(&submitted, Status::Assigned);
        assert_eq!(
            store.replace_if(&assigned, Status::Submitted).await.unwrap(),
            Replaced::Conflict(Status::Resolved)
        );
        assert_eq!(
            store.get(&ref_id).await.unwrap().unwrap().status,
            Status::Resolved
        );

        let missing = record(&fresh_id(), 0);
        assert_eq!(
            store.replace_if(&missing, Status::Submitted).await.unwrap(),
            Replaced::Missing
        );
        assert!(store.get(&missing.ref_id).await.unwrap().is_none());
    }

    pub async fn counts_follow_writes(store: &dyn ComplaintStore) {
        let before = store.counts().await.unwrap();

        let resolved_id = fresh_id();
        let resolved = record(&resolved_id, 0);
        store.insert(&resolved).await.unwrap();
        store.insert(&record(&fresh_id(), 1)).await.unwrap();
        store
            .replace_if(&moved(&resolved, Status::Resolved), Status::Submitted)
            .await
            .unwrap();

        let after = store.counts().await.unwrap();
        assert_eq!(after.total, before.total + 2);
        assert_eq!(after.resolved, before.resolved + 1);

        store.remove(&resolved_id).await.unwrap();

        let removed = store.counts().await.unwrap();
        assert_eq!(removed.total, before.total + 1);
        assert_eq!(removed.resolved, before.resolved);
    }

    pub async fn write_after_remove_leaves_counts(store: &dyn ComplaintStore) {
        let before = store.counts().await.unwrap();

        let ref_id = fresh_id();
        let submitted = record(&ref_id, 0);
        store.insert(&submitted).await.unwrap();
        store.remove(&ref_id).await.unwrap();

        let late = store
            .replace_if(&moved(&submitted, Status::Resolved), Status::Submitted)
            .await
            .unwrap();

        assert_eq!(late, Replaced::Missing);
        assert_eq!(store.counts().await.unwrap(), before);
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryStore, StatusCounts, scenarios};
    use crate::store::ComplaintStore;

    #[tokio::test]
    async fn test_insert_and_get() {
        scenarios::insert_and_get(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_duplicate_rejected() {
        scenarios::duplicate_rejected(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_removed_id_stays_issued() {
        scenarios::removed_id_stays_issued(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        scenarios::list_newest_first(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_replace_if_checks_status() {
        scenarios::replace_if_checks_status(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_counts_follow_writes() {
        scenarios::counts_follow_writes(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_write_after_remove_leaves_counts() {
        scenarios::write_after_remove_leaves_counts(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_empty_counts() {
        assert_eq!(
            MemoryStore::new().counts().await.unwrap(),
            StatusCounts::default()
        );
    }
}
