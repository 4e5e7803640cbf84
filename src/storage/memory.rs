use crate::models::LinkRecord;
use crate::storage::trait_def::unix_now;
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

struct Slot {
    /// Insertion sequence, used to order list() results
    seq: u64,
    link: LinkRecord,
}

/// Non-durable storage backed by a sharded concurrent map.
///
/// Every mutation runs while holding the shard lock for its key, so
/// create/resolve/delete on the same code never interleave.
pub struct MemoryStorage {
    links: DashMap<String, Slot>,
    next_seq: AtomicU64,
    closed: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            links: DashMap::new(),
            next_seq: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::Backend(anyhow!("memory storage is closed")));
        }
        Ok(())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn create(&self, code: &str, target_url: &str) -> StorageResult<LinkRecord> {
        self.ensure_open()?;

        match self.links.entry(code.to_string()) {
            Entry::Occupied(_) => Err(StorageError::Conflict),
            Entry::Vacant(entry) => {
                let link = LinkRecord::new(code, target_url, unix_now());
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                entry.insert(Slot {
                    seq,
                    link: link.clone(),
                });
                Ok(link)
            }
        }
    }

    async fn get(&self, code: &str) -> StorageResult<Option<LinkRecord>> {
        self.ensure_open()?;
        Ok(self.links.get(code).map(|slot| slot.link.clone()))
    }

    async fn list(&self) -> StorageResult<Vec<LinkRecord>> {
        self.ensure_open()?;

        let mut slots: Vec<(u64, LinkRecord)> = self
            .links
            .iter()
            .map(|entry| (entry.seq, entry.link.clone()))
            .collect();
        slots.sort_unstable_by(|a, b| b.0.cmp(&a.0));

        Ok(slots.into_iter().map(|(_, link)| link).collect())
    }

    async fn delete(&self, code: &str) -> StorageResult<()> {
        self.ensure_open()?;

        match self.links.remove(code) {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound),
        }
    }

    async fn resolve_and_record_click(&self, code: &str) -> StorageResult<Option<String>> {
        self.ensure_open()?;

        let Some(mut slot) = self.links.get_mut(code) else {
            return Ok(None);
        };
        slot.link.click_count += 1;
        slot.link.last_clicked_at = Some(unix_now());

        Ok(Some(slot.link.target_url.clone()))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
