//! Per-repository rebuild leases.
//!
//! A rebuild purges before it populates, so two rebuilds of one repository
//! would race. Leases are keyed by (storage, repository): rebuilds of distinct
//! repositories never contend.

use std::sync::Arc;

use dashmap::DashSet;
use tracing::debug;

use artifact_types::RepositoryIdentity;

type LeaseKey = (String, String);

/// Set of repositories with a rebuild in flight.
#[derive(Debug, Clone, Default)]
pub struct RepositoryLeases {
    active: Arc<DashSet<LeaseKey>>,
}

impl RepositoryLeases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the exclusive lease for `repository`.
    ///
    /// Returns `None` while another lease for the same repository is alive.
    pub fn try_acquire(&self, repository: &RepositoryIdentity) -> Option<RepositoryLease> {
        let key = repository.key();
        if self.active.insert(key.clone()) {
            debug!(repository = %repository, "Acquired rebuild lease");
            Some(RepositoryLease {
                active: self.active.clone(),
                key,
            })
        } else {
            None
        }
    }

    /// Is a lease for `repository` currently held.
    pub fn is_held(&self, repository: &RepositoryIdentity) -> bool {
        self.active.contains(&repository.key())
    }

    /// Number of leases currently held.
    pub fn held(&self) -> usize {
        self.active.len()
    }
}

/// RAII lease; dropping it releases the repository, also on panic.
#[derive(Debug)]
pub struct RepositoryLease {
    active: Arc<DashSet<LeaseKey>>,
    key: LeaseKey,
}

impl Drop for RepositoryLease {
    fn drop(&mut self) {
        self.active.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::thread;
    use std::time::Duration;

    fn identity(repository_id: &str) -> RepositoryIdentity {
        RepositoryIdentity::new("storage0", repository_id, "/tmp/idx")
    }

    #[test]
    fn test_second_acquire_fails_while_held() {
        let leases = RepositoryLeases::new();

        let first = leases.try_acquire(&identity("releases"));
        assert!(first.is_some());
        assert!(leases.is_held(&identity("releases")));
        assert!(leases.try_acquire(&identity("releases")).is_none());

        drop(first);
        assert!(!leases.is_held(&identity("releases")));
        assert!(leases.try_acquire(&identity("releases")).is_some());
    }

    #[test]
    fn test_distinct_repositories_do_not_contend() {
        let leases = RepositoryLeases::new();
        let a = leases.try_acquire(&identity("releases"));
        let b = leases.try_acquire(&identity("snapshots"));
        assert!(a.is_some() && b.is_some());
        assert_eq!(leases.held(), 2);
    }

    #[test]
    fn test_index_location_does_not_split_lease() {
        let leases = RepositoryLeases::new();
        let _held = leases.try_acquire(&RepositoryIdentity::new("s", "r", "/a")).unwrap();
        assert!(leases
            .try_acquire(&RepositoryIdentity::new("s", "r", "/b"))
            .is_none());
    }

    #[test]
    fn test_exclusive_across_threads() {
        let leases = RepositoryLeases::new();
        let concurrent = Arc::new(AtomicU32::new(0));
        let max_seen = Arc::new(AtomicU32::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let leases = leases.clone();
                let concurrent = concurrent.clone();
                let max_seen = max_seen.clone();
                thread::spawn(move || {
                    if let Some(_lease) = leases.try_acquire(&identity("releases")) {
                        let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(10));
                        concurrent.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(max_seen.load(Ordering::SeqCst) <= 1);
        assert_eq!(leases.held(), 0);
    }
}
