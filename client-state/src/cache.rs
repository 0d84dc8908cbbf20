use jiff::{SignedDuration, Timestamp};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;

use crate::time::TimeSource;

/// Collapses bursts of identical reads, e.g. several components asking for
/// the user list during one render.
pub const DEFAULT_TTL: SignedDuration = SignedDuration::from_millis(100);

/// Short-lived cache of successful responses, keyed by request path.
pub struct RequestCache<V> {
    ttl: SignedDuration,
    clock: TimeSource,
    entries: RefCell<HashMap<String, (Timestamp, V)>>,
    /// Bumped by every invalidation; a fetch that started before the bump
    /// must not store its result.
    epoch: Cell<u64>,
}

impl<V: Clone> RequestCache<V> {
    pub fn new(clock: TimeSource) -> Self {
        Self::with_ttl(clock, DEFAULT_TTL)
    }

    pub fn with_ttl(clock: TimeSource, ttl: SignedDuration) -> Self {
        Self {
            ttl,
            clock,
            entries: RefCell::new(HashMap::new()),
            epoch: Cell::new(0),
        }
    }

    /// A fresh entry, if any. Expired entries are evicted.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.borrow_mut();
        match entries.get(key) {
            Some((stored_at, value)) if now.duration_since(*stored_at) < self.ttl => {
                Some(value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.entries
            .borrow_mut()
            .insert(key.into(), (self.clock.now(), value));
    }

    pub fn invalidate(&self, key: &str) {
        self.bump_epoch();
        self.entries.borrow_mut().remove(key);
    }

    /// Drop every entry under a path, e.g. `users` after a write.
    pub fn invalidate_prefix(&self, prefix: &str) {
        self.bump_epoch();
        self.entries
            .borrow_mut()
            .retain(|key, _| !key.starts_with(prefix));
    }

    pub fn clear(&self) {
        self.bump_epoch();
        self.entries.borrow_mut().clear();
    }

    fn bump_epoch(&self) {
        self.epoch.set(self.epoch.get() + 1);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Serve from cache or fetch and remember the result. Failures are not
    /// cached, and neither is a result whose request was overtaken by an
    /// invalidation.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            tracing::trace!(key, "cache hit");
            return Ok(value);
        }
        let epoch = self.epoch.get();
        let value = fetch().await?;
        if self.epoch.get() == epoch {
            self.insert(key, value.clone());
        } else {
            tracing::debug!(key, "invalidated while fetching, not cached");
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;
    use futures::executor::{LocalPool, block_on};
    use futures::task::LocalSpawnExt;
    use std::rc::Rc;

    fn clock() -> TimeSource {
        TimeSource::mock("2025-01-01T00:00:00Z".parse().unwrap())
    }

    #[test]
    fn entries_expire_after_ttl() {
        let clock = clock();
        let cache = RequestCache::new(clock.clone());
        cache.insert("users", 3);

        clock.advance(SignedDuration::from_millis(99));
        assert_eq!(cache.get("users"), Some(3));

        clock.advance(SignedDuration::from_millis(1));
        assert_eq!(cache.get("users"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn prefix_invalidation() {
        let cache = RequestCache::new(clock());
        cache.insert("users", 1);
        cache.insert("users/4", 2);
        cache.insert("performance/metrics", 3);

        cache.invalidate_prefix("users");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("performance/metrics"), Some(3));

        cache.invalidate("performance/metrics");
        assert!(cache.is_empty());
    }

    #[test]
    fn get_or_fetch_only_caches_success() {
        let cache = RequestCache::new(clock());
        let calls = Cell::new(0);
        let fetch = |result: Result<u32, &'static str>| {
            calls.set(calls.get() + 1);
            async move { result }
        };

        let failed = block_on(cache.get_or_fetch("users", || fetch(Err("offline"))));
        assert_eq!(failed, Err("offline"));
        assert!(cache.is_empty());

        let first = block_on(cache.get_or_fetch("users", || fetch(Ok(5))));
        let second = block_on(cache.get_or_fetch("users", || fetch(Ok(6))));
        assert_eq!((first, second), (Ok(5), Ok(5)));
        assert_eq!(calls.get(), 2);

        cache.clear();
        let third = block_on(cache.get_or_fetch("users", || fetch(Ok(6))));
        assert_eq!(third, Ok(6));
    }

    #[test]
    fn write_during_fetch_keeps_stale_result_out() {
        let cache = Rc::new(RequestCache::new(clock()));
        let mut pool = LocalPool::new();
        let (reply, response) = oneshot::channel::<Result<Vec<u32>, ()>>();

        // a polling read is in flight
        let read = {
            let cache = cache.clone();
            async move {
                let listed = cache
                    .get_or_fetch("users", || async move {
                        response.await.unwrap_or(Err(()))
                    })
                    .await;
                assert_eq!(listed, Ok(vec![1, 2]));
            }
        };
        pool.spawner().spawn_local(read).unwrap();
        pool.run_until_stalled();

        // a delete lands before the read returns
        cache.invalidate_prefix("users");
        reply.send(Ok(vec![1, 2])).unwrap();
        pool.run();

        assert!(cache.is_empty());
        let refreshed = block_on(cache.get_or_fetch("users", || async {
            Ok::<_, ()>(vec![1])
        }));
        assert_eq!(refreshed, Ok(vec![1]));
    }
}
