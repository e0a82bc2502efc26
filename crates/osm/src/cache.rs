//! LRU cache of raw response bodies.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Which service a cached body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    Nominatim,
    Overpass,
}

/// Key for cached responses: the service and the full request text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub service: Service,
    pub request: String,
}

impl RequestKey {
    pub fn new(service: Service, request: impl Into<String>) -> Self {
        Self {
            service,
            request: request.into(),
        }
    }
}

/// LRU cache storing response bodies, so repeated runs over the same place
/// do not hit the public endpoints again.
pub struct ResponseCache {
    inner: LruCache<RequestKey, String>,
}

impl ResponseCache {
    /// Create a new cache with the given capacity (number of responses).
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: LruCache::new(cap),
        }
    }

    /// Get a cached body, if present.
    pub fn get(&mut self, key: &RequestKey) -> Option<&String> {
        self.inner.get(key)
    }

    /// Insert a body into the cache.
    pub fn insert(&mut self, key: RequestKey, body: String) {
        self.inner.put(key, body);
    }

    /// Number of responses currently cached.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// A [`ResponseCache`] shared between clients and threads.
///
/// A poisoned lock is treated as a cache miss.
#[derive(Clone)]
pub struct SharedCache(Arc<Mutex<ResponseCache>>);

impl SharedCache {
    pub fn new(capacity: usize) -> Self {
        Self(Arc::new(Mutex::new(ResponseCache::new(capacity))))
    }

    /// Copy of a cached body, if present.
    pub fn get(&self, key: &RequestKey) -> Option<String> {
        self.0.lock().ok()?.get(key).cloned()
    }

    pub fn insert(&self, key: RequestKey, body: String) {
        if let Ok(mut cache) = self.0.lock() {
            cache.insert(key, body);
        }
    }

    pub fn len(&self) -> usize {
        self.0.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_insert_get() {
        let mut cache = ResponseCache::new(2);
        let key = RequestKey::new(Service::Overpass, "[out:json];way[\"highway\"];out geom;");
        cache.insert(key.clone(), "{\"elements\": []}".into());
        assert_eq!(cache.get(&key).map(String::as_str), Some("{\"elements\": []}"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_same_text_different_service() {
        let mut cache = ResponseCache::new(4);
        cache.insert(RequestKey::new(Service::Nominatim, "q"), "a".into());
        assert!(cache.get(&RequestKey::new(Service::Overpass, "q")).is_none());
    }

    #[test]
    fn test_cache_eviction() {
        let mut cache = ResponseCache::new(2);
        let k1 = RequestKey::new(Service::Overpass, "1");
        let k2 = RequestKey::new(Service::Overpass, "2");
        let k3 = RequestKey::new(Service::Overpass, "3");

        cache.insert(k1.clone(), "1".into());
        cache.insert(k2.clone(), "2".into());
        cache.insert(k3.clone(), "3".into()); // evicts k1

        assert!(cache.get(&k1).is_none());
        assert!(cache.get(&k2).is_some());
        assert!(cache.get(&k3).is_some());
    }

    #[test]
    fn test_shared_cache_clones_share_entries() {
        let cache = SharedCache::new(8);
        let other = cache.clone();
        cache.insert(RequestKey::new(Service::Nominatim, "Paris"), "[]".into());
        assert_eq!(other.get(&RequestKey::new(Service::Nominatim, "Paris")).as_deref(), Some("[]"));
        assert_eq!(other.len(), 1);
    }
}
