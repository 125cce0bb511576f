use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

use reqwest::Method;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::ClientError;

/// Identity of a cacheable request: method, path and serialized body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub method: Method,
    pub path: &'static str,
    pub body: String,
}

impl CacheKey {
    pub fn new(method: Method, path: &'static str, body: Option<&serde_json::Value>) -> Self {
        Self {
            method,
            path,
            body: body.map(|b| b.to_string()).unwrap_or_default(),
        }
    }
}

enum Slot<V> {
    Pending {
        generation: u64,
        handle: JoinHandle<Result<V, ClientError>>,
    },
    Resolved(Result<V, ClientError>),
}

struct Slots<K, V> {
    next_generation: u64,
    entries: HashMap<K, Slot<V>>,
}

/// Take-once store for speculative requests.
///
/// An absent key is the empty state. `prefetch` spawns the producer and parks
/// its handle as pending; when the producer finishes before anyone asks, the
/// slot flips to resolved. `take_or_fetch` removes whatever is there, so each
/// prefetched answer reaches at most one consumer.
pub struct RequestCache<K, V> {
    slots: Arc<Mutex<Slots<K, V>>>,
}

impl<K, V> Clone for RequestCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<K, V> Default for RequestCache<K, V> {
    fn default() -> Self {
        Self {
            slots: Arc::new(Mutex::new(Slots {
                next_generation: 0,
                entries: HashMap::new(),
            })),
        }
    }
}

fn lock<K, V>(slots: &Mutex<Slots<K, V>>) -> MutexGuard<'_, Slots<K, V>> {
    slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<K, V> RequestCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug + Send + 'static,
    V: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `producer` in the background unless `key` is already cached.
    /// Returns whether a request was issued.
    pub fn prefetch<F, Fut>(&self, key: K, producer: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ClientError>> + Send + 'static,
    {
        let mut slots = lock(&self.slots);
        if slots.entries.contains_key(&key) {
            debug!(?key, "prefetch already in flight");
            return false;
        }

        let generation = slots.next_generation;
        slots.next_generation += 1;

        let shared = Arc::clone(&self.slots);
        let settle_key = key.clone();
        let request = producer();
        let handle = tokio::spawn(async move {
            let result = request.await;
            let mut slots = lock(&shared);
            if let Some(slot) = slots.entries.get_mut(&settle_key) {
                if matches!(slot, Slot::Pending { generation: g, .. } if *g == generation) {
                    *slot = Slot::Resolved(result.clone());
                }
            }
            result
        });

        debug!(?key, "prefetch issued");
        slots.entries.insert(key, Slot::Pending { generation, handle });
        true
    }

    /// Hands over the cached answer for `key`, or runs `producer` directly
    /// when nothing was prefetched. A direct fetch is never stored.
    pub async fn take_or_fetch<F, Fut>(&self, key: &K, producer: F) -> Result<V, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ClientError>>,
    {
        // removal happens before the first await
        let taken = lock(&self.slots).entries.remove(key);
        match taken {
            Some(Slot::Resolved(result)) => {
                debug!(?key, "prefetch hit (resolved)");
                result
            }
            Some(Slot::Pending { handle, .. }) => {
                debug!(?key, "prefetch hit (pending)");
                handle
                    .await
                    .unwrap_or_else(|e| Err(ClientError::PrefetchAborted(e.to_string())))
            }
            None => producer().await,
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.slots).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting(
        calls: &Arc<AtomicUsize>,
        value: u32,
    ) -> impl FnOnce() -> futures::future::BoxFuture<'static, Result<u32, ClientError>> {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(value)
            })
        }
    }

    #[tokio::test]
    async fn test_take_after_prefetch_uses_prefetched_value() {
        let cache: RequestCache<&'static str, u32> = RequestCache::new();
        let prefetch_calls = Arc::new(AtomicUsize::new(0));
        let fallback_calls = Arc::new(AtomicUsize::new(0));

        assert!(cache.prefetch("speak", counting(&prefetch_calls, 7)));
        let value = cache
            .take_or_fetch(&"speak", counting(&fallback_calls, 99))
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(prefetch_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_take_without_prefetch_calls_producer_once() {
        let cache: RequestCache<&'static str, u32> = RequestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let value = cache.take_or_fetch(&"vote", counting(&calls, 3)).await.unwrap();

        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_double_prefetch_issues_one_request() {
        let cache: RequestCache<&'static str, u32> = RequestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        assert!(cache.prefetch("divine", counting(&calls, 1)));
        assert!(!cache.prefetch("divine", counting(&calls, 2)));
        assert_eq!(cache.len(), 1);

        let value = cache
            .take_or_fetch(&"divine", counting(&calls, 3))
            .await
            .unwrap();
        assert_eq!(value, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_entries_are_taken_once() {
        let cache: RequestCache<&'static str, u32> = RequestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.prefetch("time", counting(&calls, 1));
        let first = cache.take_or_fetch(&"time", counting(&calls, 2)).await.unwrap();
        let second = cache.take_or_fetch(&"time", counting(&calls, 3)).await.unwrap();

        assert_eq!((first, second), (1, 3));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_settled_prefetch_becomes_resolved() {
        let cache: RequestCache<&'static str, u32> = RequestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.prefetch("kill", counting(&calls, 5));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cache.len(), 1);

        let value = cache.take_or_fetch(&"kill", counting(&calls, 0)).await.unwrap();
        assert_eq!(value, 5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_prefetch_error_reaches_consumer() {
        let cache: RequestCache<&'static str, u32> = RequestCache::new();
        cache.prefetch("speak", || async {
            Err(ClientError::Timeout { endpoint: "/speak" })
        });

        let result = cache.take_or_fetch(&"speak", || async { Ok(1) }).await;
        assert_eq!(result, Err(ClientError::Timeout { endpoint: "/speak" }));
    }

    #[tokio::test]
    async fn test_stale_settle_does_not_clobber_newer_prefetch() {
        let cache: RequestCache<&'static str, u32> = RequestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.prefetch("speak", counting(&calls, 1));
        // take the pending handle, then warm the same key again before the first settles
        let taken = lock(&cache.slots).entries.remove(&"speak");
        cache.prefetch("speak", counting(&calls, 2));

        if let Some(Slot::Pending { handle, .. }) = taken {
            assert_eq!(handle.await.unwrap().unwrap(), 1);
        } else {
            panic!("expected a pending slot");
        }

        let value = cache.take_or_fetch(&"speak", counting(&calls, 3)).await.unwrap();
        assert_eq!(value, 2);
    }

    #[test]
    fn test_cache_key_includes_body() {
        let body = serde_json::json!({"player_idx": 3, "content": ""});
        let a = CacheKey::new(Method::POST, "/speak", Some(&body));
        let b = CacheKey::new(Method::POST, "/speak", Some(&serde_json::json!({"player_idx": 4, "content": ""})));
        assert_ne!(a, b);
        assert_eq!(a, CacheKey::new(Method::POST, "/speak", Some(&body)));
        assert_eq!(CacheKey::new(Method::GET, "/current_time", None).body, "");
    }
}
