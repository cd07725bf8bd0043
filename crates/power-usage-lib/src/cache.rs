use crate::change::ChangeDetector;
use crate::data_structures::Snapshot;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_TTL_SECONDS: i64 = 5 * 60;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    snapshot: Arc<Snapshot>,
    last_update: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(snapshot: Arc<Snapshot>, last_update: DateTime<Utc>) -> Self {
        Self {
            snapshot,
            last_update,
        }
    }

    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }
}

/// Why the cache replaced its entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    FirstObservation,
    ContentChanged,
    Expired,
}

pub struct CachePolicy {
    ttl: Duration,
    detector: ChangeDetector,
}

impl CachePolicy {
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_TTL_SECONDS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            detector: ChangeDetector::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.last_update > self.ttl
    }

    pub fn should_refresh(
        &self,
        entry: Option<&CacheEntry>,
        next: &Snapshot,
        now: DateTime<Utc>,
    ) -> bool {
        self.refresh_reason(entry, next, now).is_some()
    }

    pub fn refresh_reason(
        &self,
        entry: Option<&CacheEntry>,
        next: &Snapshot,
        now: DateTime<Utc>,
    ) -> Option<RefreshReason> {
        let entry = match entry {
            None => return Some(RefreshReason::FirstObservation),
            Some(entry) => entry,
        };

        if self.detector.has_changed(Some(&entry.snapshot), next) {
            Some(RefreshReason::ContentChanged)
        } else if self.is_expired(entry, now) {
            Some(RefreshReason::Expired)
        } else {
            None
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of feeding one observation through the cache.
///
/// Both variants carry the snapshot callers must read from; on `Reused` it is
/// the previously stored `Arc`, not the freshly observed data.
#[derive(Debug, Clone)]
pub enum CacheOutcome {
    Refreshed {
        snapshot: Arc<Snapshot>,
        reason: RefreshReason,
    },
    Reused(Arc<Snapshot>),
}

impl CacheOutcome {
    pub fn snapshot(&self) -> &Arc<Snapshot> {
        match self {
            CacheOutcome::Refreshed { snapshot, .. } => snapshot,
            CacheOutcome::Reused(snapshot) => snapshot,
        }
    }

    pub fn is_refreshed(&self) -> bool {
        matches!(self, CacheOutcome::Refreshed { .. })
    }
}

/// Holds the current [`CacheEntry`]. A refresh swaps the whole entry; stored
/// snapshots are never mutated.
pub struct SnapshotCache {
    policy: CachePolicy,
    entry: Option<CacheEntry>,
}

impl SnapshotCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entry: None,
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    pub fn entry(&self) -> Option<&CacheEntry> {
        self.entry.as_ref()
    }

    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        self.entry.as_ref().map(|entry| &entry.snapshot)
    }

    pub fn observe(&mut self, next: Snapshot, now: DateTime<Utc>) -> CacheOutcome {
        let reason = match self.policy.refresh_reason(self.entry.as_ref(), &next, now) {
            Some(reason) => reason,
            None => {
                if let Some(entry) = &self.entry {
                    debug!("attribute data unchanged, reusing cached snapshot");
                    return CacheOutcome::Reused(Arc::clone(&entry.snapshot));
                }
                RefreshReason::FirstObservation
            }
        };

        info!(
            ?reason,
            records = next.record_count(),
            "replacing cached snapshot"
        );
        let snapshot = Arc::new(next);
        self.entry = Some(CacheEntry::new(Arc::clone(&snapshot), now));
        CacheOutcome::Refreshed { snapshot, reason }
    }

    /// Drops the entry so the next observation refreshes unconditionally.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::{Granularity, TouComponents, UsageRecord};
    use chrono::TimeZone;

    fn snapshot(total: f64) -> Snapshot {
        Snapshot::new(
            vec![],
            vec![],
            vec![UsageRecord::new(
                Granularity::Year,
                "2025",
                TouComponents::default(),
                Some(total),
                0.0,
            )],
        )
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_refresh_when_no_entry() {
        let policy = CachePolicy::new();
        assert!(policy.should_refresh(None, &snapshot(1.0), t0()));
    }

    #[test]
    fn test_ttl_boundaries() {
        let policy = CachePolicy::new();
        let entry = CacheEntry::new(Arc::new(snapshot(1.0)), t0());
        let next = snapshot(1.0);

        assert!(!policy.should_refresh(Some(&entry), &next, t0() + Duration::minutes(4)));
        assert!(!policy.should_refresh(Some(&entry), &next, t0() + Duration::minutes(5)));
        assert!(policy.should_refresh(Some(&entry), &next, t0() + Duration::minutes(6)));
    }

    #[test]
    fn test_content_change_refreshes_inside_ttl() {
        let policy = CachePolicy::new();
        let entry = CacheEntry::new(Arc::new(snapshot(1.0)), t0());

        assert_eq!(
            policy.refresh_reason(Some(&entry), &snapshot(2.0), t0() + Duration::seconds(1)),
            Some(RefreshReason::ContentChanged)
        );
    }

    #[test]
    fn test_custom_ttl() {
        let policy = CachePolicy::with_ttl(Duration::seconds(30));
        let entry = CacheEntry::new(Arc::new(snapshot(1.0)), t0());

        assert_eq!(
            policy.refresh_reason(Some(&entry), &snapshot(1.0), t0() + Duration::seconds(31)),
            Some(RefreshReason::Expired)
        );
    }

    #[test]
    fn test_observe_reuses_same_arc() {
        let mut cache = SnapshotCache::default();

        let first = cache.observe(snapshot(1.0), t0());
        assert!(first.is_refreshed());

        let second = cache.observe(snapshot(1.0), t0() + Duration::minutes(1));
        assert!(!second.is_refreshed());
        assert!(Arc::ptr_eq(first.snapshot(), second.snapshot()));
        assert_eq!(cache.entry().unwrap().last_update(), t0());
    }

    #[test]
    fn test_observe_replaces_on_change_and_resets_clock() {
        let mut cache = SnapshotCache::default();
        let first = cache.observe(snapshot(1.0), t0());

        let later = t0() + Duration::minutes(2);
        let second = cache.observe(snapshot(2.0), later);

        assert!(second.is_refreshed());
        assert!(!Arc::ptr_eq(first.snapshot(), second.snapshot()));
        assert_eq!(cache.entry().unwrap().last_update(), later);
        assert_eq!(cache.snapshot().unwrap().yearlist()[0].total(), Some(2.0));
    }

    #[test]
    fn test_observe_refreshes_after_expiry() {
        let mut cache = SnapshotCache::default();
        cache.observe(snapshot(1.0), t0());

        match cache.observe(snapshot(1.0), t0() + Duration::minutes(6)) {
            CacheOutcome::Refreshed { reason, .. } => assert_eq!(reason, RefreshReason::Expired),
            CacheOutcome::Reused(_) => panic!("expected expiry refresh"),
        }
    }

    #[test]
    fn test_invalidate_forces_refresh() {
        let mut cache = SnapshotCache::default();
        cache.observe(snapshot(1.0), t0());
        cache.invalidate();

        assert!(cache.snapshot().is_none());
        assert!(cache.observe(snapshot(1.0), t0()).is_refreshed());
    }
}
