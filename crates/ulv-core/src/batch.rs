//! Batch coordination: dedup, windowed concurrency, batch supersession.
//!
//! URLs are validated in sequential windows of `max_concurrent` worker
//! threads; results come back over an mpsc channel tagged with their window
//! index and are reassembled in order. Starting a new batch cancels the
//! previous one without awaiting its teardown.

use std::collections::HashSet;
use std::sync::mpsc;
use std::time::Duration;

use crate::cache::ResultCache;
use crate::config::UlvConfig;
use crate::control::{BatchControl, CancelToken};
use crate::outcome::ValidationOutcome;
use crate::validator;

/// Validates batches of URLs against a shared result cache.
///
/// One instance owns the cache and the cancellation control for all the
/// batches it runs; the host constructs it once and passes it wherever
/// validation is triggered.
pub struct BatchValidator {
    cache: ResultCache,
    timeout: Duration,
    max_concurrent: usize,
    control: BatchControl,
}

impl BatchValidator {
    pub fn new(cfg: &UlvConfig) -> Self {
        Self {
            cache: ResultCache::new(cfg.ttl()),
            timeout: cfg.timeout(),
            max_concurrent: cfg.max_concurrent.max(1),
            control: BatchControl::new(),
        }
    }

    /// The shared cache, exposed for the host's periodic `cleanup` trigger.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Cancel the in-flight batch, if any, without starting a new one.
    pub fn cancel(&self) {
        self.control.cancel_current();
    }

    /// Validates `urls`: deduplicates, then runs sequential windows of up
    /// to `max_concurrent` parallel validations. Returns one outcome per
    /// unique URL in input order. Cancellation stops the batch at a window
    /// boundary and returns the outcomes gathered so far.
    pub fn validate_batch(&self, urls: &[String]) -> Vec<ValidationOutcome> {
        if urls.is_empty() {
            return Vec::new();
        }
        let token = self.control.begin();
        let unique = dedup(urls);
        tracing::info!(
            "validating batch of {} URLs ({} unique)",
            urls.len(),
            unique.len()
        );

        let mut results = Vec::with_capacity(unique.len());
        for window in unique.chunks(self.max_concurrent) {
            if token.is_cancelled() {
                tracing::info!(
                    "batch cancelled after {} of {} outcomes",
                    results.len(),
                    unique.len()
                );
                break;
            }
            results.extend(self.run_window(window, &token));
        }
        results
    }

    /// One window: a worker thread per URL, results reassembled in window
    /// order.
    fn run_window(&self, window: &[String], token: &CancelToken) -> Vec<ValidationOutcome> {
        let (tx, rx) = mpsc::channel();
        let mut handles = Vec::with_capacity(window.len());
        for (index, url) in window.iter().enumerate() {
            let tx = tx.clone();
            let url = url.clone();
            let cache = self.cache.clone();
            let token = token.clone();
            let timeout = self.timeout;
            handles.push(std::thread::spawn(move || {
                let outcome = validator::validate_url(&url, &cache, timeout, &token);
                let _ = tx.send((index, outcome));
            }));
        }
        drop(tx);

        let mut outcomes: Vec<(usize, ValidationOutcome)> = rx.iter().collect();
        for handle in handles {
            handle
                .join()
                .unwrap_or_else(|e| panic!("validator worker panicked: {:?}", e));
        }
        outcomes.sort_by_key(|(index, _)| *index);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }
}

/// First occurrence wins; exact string equality, no normalization.
fn dedup(urls: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.iter()
        .filter(|url| seen.insert(url.as_str()))
        .cloned()
        .collect()
}
