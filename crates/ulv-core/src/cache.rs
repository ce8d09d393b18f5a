//! Time-to-live cache of validation outcomes, keyed by exact URL string.
//!
//! Entries expire after `ttl`: lazily when read, and in bulk via `cleanup`,
//! which an external scheduler is expected to run periodically so memory
//! stays bounded between validation runs. Cancelled validations are never
//! written here (the validator only stores resolved outcomes).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::outcome::ValidationOutcome;

/// One cached outcome, without the URL (that's the key).
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub is_valid: bool,
    pub status_code: Option<u16>,
    pub status_text: Option<String>,
    pub error: Option<String>,
    pub timestamp: Instant,
}

impl CacheEntry {
    /// Rebuild the outcome this entry was stored from.
    pub fn to_outcome(&self, url: &str) -> ValidationOutcome {
        ValidationOutcome {
            url: url.to_string(),
            is_valid: self.is_valid,
            status_code: self.status_code,
            status_text: self.status_text.clone(),
            error: self.error.clone(),
        }
    }
}

/// Shared TTL cache. `Clone` shares the underlying map, so a handle can be
/// passed into each validator worker thread.
#[derive(Debug, Clone)]
pub struct ResultCache {
    ttl: Duration,
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// A zero TTL means "always expired", so nothing is ever fresh.
    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        !self.ttl.is_zero() && entry.timestamp.elapsed() <= self.ttl
    }

    /// Returns the entry if present and fresh; evicts a stale entry on the
    /// way out. A plain miss has no side effect.
    pub fn get(&self, url: &str) -> Option<CacheEntry> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(url) {
            Some(entry) if self.is_fresh(entry) => return Some(entry.clone()),
            Some(_) => {}
            None => return None,
        }
        entries.remove(url);
        None
    }

    /// Insert or overwrite, stamped with the current time.
    pub fn set(&self, url: &str, outcome: &ValidationOutcome) {
        let entry = CacheEntry {
            is_valid: outcome.is_valid,
            status_code: outcome.status_code,
            status_text: outcome.status_text.clone(),
            error: outcome.error.clone(),
            timestamp: Instant::now(),
        };
        self.entries.lock().unwrap().insert(url.to_string(), entry);
    }

    /// Evict every stale entry, independent of access. Returns how many
    /// entries were removed.
    pub fn cleanup(&self) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| !self.ttl.is_zero() && entry.timestamp.elapsed() <= self.ttl);
        let evicted = before - entries.len();
        if evicted > 0 {
            tracing::debug!("cache cleanup evicted {} of {} entries", evicted, before);
        }
        evicted
    }

    /// Evict everything unconditionally.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
