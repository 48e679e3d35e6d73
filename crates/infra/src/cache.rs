//! Opt-in cache of resolved summaries.
//!
//! Entries are keyed by `(UserId, grant store version)`: any grant mutation
//! bumps the version, so a lookup after a change never returns the old
//! summary. Within one version an entry is served until its TTL runs out.
//! A lookup that finds an expired or superseded entry evicts it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

use newsroom_auth::UserPermissionSummary;
use newsroom_core::UserId;

const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone)]
struct CacheEntry {
    version: u64,
    cached_at: DateTime<Utc>,
    summary: Arc<UserPermissionSummary>,
}

#[derive(Debug)]
pub struct SummaryCache {
    ttl: Duration,
    entries: RwLock<HashMap<UserId, CacheEntry>>,
}

impl SummaryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// TTLs longer than a year are clamped to a year.
    pub fn from_secs(ttl_secs: u64) -> Self {
        Self::new(Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64))
    }

    pub fn get(
        &self,
        user_id: UserId,
        version: u64,
        now: DateTime<Utc>,
    ) -> Option<Arc<UserPermissionSummary>> {
        {
            let entries = self.entries.read().ok()?;
            let entry = entries.get(&user_id)?;
            if entry.version == version && !self.expired(entry, now) {
                return Some(Arc::clone(&entry.summary));
            }
        }

        let mut entries = self.entries.write().ok()?;
        // Recheck: another caller may have refreshed the entry meanwhile.
        // An entry from a newer version than ours is left for its own readers.
        let stale = entries
            .get(&user_id)
            .is_some_and(|entry| entry.version < version || self.expired(entry, now));
        if stale {
            entries.remove(&user_id);
            tracing::debug!(user_id = %user_id, version, "evicted stale permission summary");
        }
        None
    }

    fn expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.cached_at >= self.ttl
    }

    pub fn insert(
        &self,
        version: u64,
        summary: Arc<UserPermissionSummary>,
        now: DateTime<Utc>,
    ) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                summary.user_id,
                CacheEntry {
                    version,
                    cached_at: now,
                    summary,
                },
            );
        }
    }

    /// Drop one user's entry (e.g. after changing that user's grants).
    pub fn invalidate_user(&self, user_id: UserId) {
        if let Ok(mut entries) = self.entries.write() {
            if entries.remove(&user_id).is_some() {
                tracing::info!(user_id = %user_id, "invalidated cached permission summary");
            }
        }
    }

    /// Drop every entry (e.g. after a group grant change).
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            let dropped = entries.len();
            entries.clear();
            tracing::info!(dropped, "cleared permission summary cache");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
