//! Registry of working files and directories.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

/// Opaque handle for a tracked resource. Process-local, like the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    File,
    Directory,
}

/// One registered working file or directory.
#[derive(Debug, Clone)]
pub struct TrackedResource {
    pub path: PathBuf,
    pub context: String,
    pub kind: ResourceKind,
    pub created_at: Instant,
    pub ttl: Duration,
    pub access_count: u64,
    pub last_access_at: Instant,
}

impl TrackedResource {
    /// Age at `now`, saturating for clock edge cases.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    pub fn expired(&self, now: Instant) -> bool {
        self.age(now) >= self.ttl
    }
}

/// Registry counts for monitoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerStats {
    pub file_count: usize,
    pub dir_count: usize,
    /// Distinct context tags, sorted.
    pub contexts: Vec<String>,
    pub expired_count: usize,
}

/// Process-wide registry of working files and directories.
///
/// Every component that creates an on-disk artifact registers it here with
/// a caller-chosen context string and a TTL in minutes. Entries are removed
/// by explicit [`unregister`](Self::unregister), by
/// [`evict_context`](Self::evict_context), or by the expiry sweep. The
/// in-memory index is guarded by a single lock held only while the map is
/// touched; physical deletion happens outside it so slow filesystems never
/// block registration.
///
/// # Example
///
/// ```
/// use cleave::ResourceTracker;
///
/// let tracker = ResourceTracker::new();
/// let id = tracker.register_file("/tmp/cleave-session-42/report.pdf", "session-42", 60);
/// assert!(tracker.touch(id).is_some());
/// tracker.evict_context("session-42");
/// ```
#[derive(Debug, Default)]
pub struct ResourceTracker {
    entries: Mutex<HashMap<ResourceId, TrackedResource>>,
    next_id: AtomicU64,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a working file under `context` with a TTL in minutes.
    pub fn register_file<P: AsRef<Path>>(
        &self,
        path: P,
        context: &str,
        ttl_minutes: u64,
    ) -> ResourceId {
        self.register(path.as_ref(), ResourceKind::File, context, ttl_minutes)
    }

    /// Register a working directory under `context` with a TTL in minutes.
    pub fn register_directory<P: AsRef<Path>>(
        &self,
        path: P,
        context: &str,
        ttl_minutes: u64,
    ) -> ResourceId {
        self.register(path.as_ref(), ResourceKind::Directory, context, ttl_minutes)
    }

    fn register(
        &self,
        path: &Path,
        kind: ResourceKind,
        context: &str,
        ttl_minutes: u64,
    ) -> ResourceId {
        let id = ResourceId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let now = Instant::now();
        let resource = TrackedResource {
            path: path.to_path_buf(),
            context: context.to_string(),
            kind,
            created_at: now,
            ttl: Duration::from_secs(ttl_minutes * 60),
            access_count: 0,
            last_access_at: now,
        };
        debug!(%id, path = %path.display(), context, ttl_minutes, ?kind, "registered resource");
        self.entries.lock().insert(id, resource);
        id
    }

    /// Record an access and return the path, or `None` if untracked.
    ///
    /// Callers must touch before streaming a file for delivery to confirm
    /// it is still tracked.
    pub fn touch(&self, id: ResourceId) -> Option<PathBuf> {
        let mut entries = self.entries.lock();
        let entry = entries.get_mut(&id)?;
        entry.access_count += 1;
        entry.last_access_at = Instant::now();
        Some(entry.path.clone())
    }

    /// Drop an entry from the registry without touching the filesystem.
    pub fn unregister(&self, id: ResourceId) -> bool {
        let removed = self.entries.lock().remove(&id).is_some();
        if removed {
            debug!(%id, "unregistered resource");
        }
        removed
    }

    /// Snapshot every entry whose age at `now` has reached its TTL.
    pub fn list_expired(&self, now: Instant) -> Vec<(ResourceId, TrackedResource)> {
        self.entries
            .lock()
            .iter()
            .filter(|(_, entry)| entry.expired(now))
            .map(|(id, entry)| (*id, entry.clone()))
            .collect()
    }

    /// Remove every resource registered under `context`.
    ///
    /// Returns the number of entries physically removed and unregistered.
    /// An already-missing path counts as removed; a deletion that fails
    /// stays tracked for a later retry.
    pub fn evict_context(&self, context: &str) -> usize {
        let targets: Vec<(ResourceId, PathBuf, ResourceKind)> = {
            let entries = self.entries.lock();
            entries
                .iter()
                .filter(|(_, entry)| entry.context == context)
                .map(|(id, entry)| (*id, entry.path.clone(), entry.kind))
                .collect()
        };
        let count = self.remove_batch(targets);
        debug!(context, count, "context evicted");
        count
    }

    /// Remove every expired resource. Same eviction rules as
    /// [`evict_context`](Self::evict_context).
    pub fn sweep_expired(&self) -> usize {
        let targets: Vec<(ResourceId, PathBuf, ResourceKind)> = self
            .list_expired(Instant::now())
            .into_iter()
            .map(|(id, entry)| (id, entry.path, entry.kind))
            .collect();
        self.remove_batch(targets)
    }

    /// Delete the targets outside the lock, then unregister the successes.
    fn remove_batch(&self, targets: Vec<(ResourceId, PathBuf, ResourceKind)>) -> usize {
        let mut removed = Vec::with_capacity(targets.len());
        for (id, path, kind) in targets {
            if remove_resource(&path, kind) {
                removed.push(id);
            }
        }
        let count = removed.len();
        let mut entries = self.entries.lock();
        for id in removed {
            entries.remove(&id);
        }
        count
    }

    pub fn stats(&self) -> TrackerStats {
        let now = Instant::now();
        let entries = self.entries.lock();
        let mut contexts = BTreeSet::new();
        let mut file_count = 0;
        let mut dir_count = 0;
        let mut expired_count = 0;
        for entry in entries.values() {
            match entry.kind {
                ResourceKind::File => file_count += 1,
                ResourceKind::Directory => dir_count += 1,
            }
            if entry.expired(now) {
                expired_count += 1;
            }
            contexts.insert(entry.context.clone());
        }
        TrackerStats {
            file_count,
            dir_count,
            contexts: contexts.into_iter().collect(),
            expired_count,
        }
    }
}

/// Delete a file or directory, treating an already-missing path as success.
fn remove_resource(path: &Path, kind: ResourceKind) -> bool {
    let result = match kind {
        ResourceKind::File => fs::remove_file(path),
        ResourceKind::Directory => fs::remove_dir_all(path),
    };
    match result {
        Ok(()) => {
            debug!(path = %path.display(), "removed resource");
            true
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "resource already absent");
            true
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not remove resource, keeping tracked");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let tracker = ResourceTracker::new();
        let a = tracker.register_file("/tmp/a", "ctx", 60);
        let b = tracker.register_file("/tmp/b", "ctx", 60);
        assert_ne!(a, b);
    }

    #[test]
    fn test_touch_updates_counters() {
        let tracker = ResourceTracker::new();
        let id = tracker.register_file("/tmp/a", "ctx", 60);
        assert_eq!(tracker.touch(id), Some(PathBuf::from("/tmp/a")));
        assert_eq!(tracker.touch(id), Some(PathBuf::from("/tmp/a")));
        let (_, entry) = tracker
            .list_expired(Instant::now() + Duration::from_secs(3601))
            .pop()
            .unwrap();
        assert_eq!(entry.access_count, 2);
        assert!(entry.last_access_at >= entry.created_at);
    }

    #[test]
    fn test_touch_unknown_id() {
        let tracker = ResourceTracker::new();
        assert_eq!(tracker.touch(ResourceId(999)), None);
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let tracker = ResourceTracker::new();
        let id = tracker.register_file("/tmp/a", "ctx", 0);
        let expired = tracker.list_expired(Instant::now());
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].0, id);
    }

    #[test]
    fn test_unexpired_not_listed() {
        let tracker = ResourceTracker::new();
        tracker.register_file("/tmp/a", "ctx", 60);
        assert!(tracker.list_expired(Instant::now()).is_empty());
    }

    #[test]
    fn test_stats_counts_and_contexts() {
        let tracker = ResourceTracker::new();
        tracker.register_file("/tmp/a", "beta", 60);
        tracker.register_file("/tmp/b", "alpha", 0);
        tracker.register_directory("/tmp/d", "alpha", 60);
        let stats = tracker.stats();
        assert_eq!(stats.file_count, 2);
        assert_eq!(stats.dir_count, 1);
        assert_eq!(stats.contexts, vec!["alpha".to_string(), "beta".to_string()]);
        assert_eq!(stats.expired_count, 1);
    }
}
