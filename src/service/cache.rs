//! Loaded sections and their refresh timestamps.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;

use crate::domain::Section;

/// Default age in seconds after which a section is reloaded.
pub const DEFAULT_REFRESH_SECONDS: u64 = 60;

/// Source of wall-clock time, in whole seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Clock that only moves when told to. Useful in tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// A loaded section together with the time it was loaded.
///
/// Kept in one struct so the value and its timestamp always change together.
#[derive(Debug, Clone)]
struct CacheEntry {
    config: Arc<Section>,
    refreshed_at: u64,
}

/// Cache of loaded sections with time-based staleness.
pub struct ConfigCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    refresh_seconds: u64,
    clock: Arc<dyn Clock>,
}

impl ConfigCache {
    pub fn new(refresh_seconds: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            refresh_seconds,
            clock,
        }
    }

    pub fn refresh_seconds(&self) -> u64 {
        self.refresh_seconds
    }

    /// A section is stale if it was never loaded or is older than the refresh interval.
    pub fn is_stale(&self, section_name: &str) -> bool {
        match self.last_refresh(section_name) {
            None => true,
            Some(refreshed_at) => {
                self.clock.now().saturating_sub(refreshed_at) > self.refresh_seconds
            }
        }
    }

    pub fn get(&self, section_name: &str) -> Option<Arc<Section>> {
        self.entries
            .read()
            .get(section_name)
            .map(|entry| Arc::clone(&entry.config))
    }

    pub fn last_refresh(&self, section_name: &str) -> Option<u64> {
        self.entries
            .read()
            .get(section_name)
            .map(|entry| entry.refreshed_at)
    }

    /// Store one freshly loaded section.
    pub fn store(&self, section_name: &str, section: Section) -> Arc<Section> {
        let config = Arc::new(section);
        let entry = CacheEntry {
            config: Arc::clone(&config),
            refreshed_at: self.clock.now(),
        };
        self.entries.write().insert(section_name.to_string(), entry);
        config
    }

    /// Store a batch of loaded sections under a single lock.
    ///
    /// With `replace`, sections not in the batch are dropped.
    pub fn commit(&self, loaded: Vec<(String, Section)>, replace: bool) {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        if replace {
            entries.clear();
        }
        for (name, section) in loaded {
            entries.insert(
                name,
                CacheEntry {
                    config: Arc::new(section),
                    refreshed_at: now,
                },
            );
        }
    }

    /// Force the next access to reload `section_name`.
    pub fn invalidate(&self, section_name: &str) {
        self.entries.write().remove(section_name);
    }

    /// Names of the sections currently loaded, sorted.
    pub fn section_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }
}
