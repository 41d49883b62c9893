use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// How long a rendered index page keeps being served as-is.
pub const INDEX_CACHE_TTL: Duration = Duration::from_secs(20);

struct CachedPage {
    body: String,
    stored_at: Instant,
}

/// Full-page cache keyed by request path+query. Writes elsewhere in the app
/// do not touch it; entries only go away through expiry or `clear`.
#[derive(Clone)]
pub struct PageCache {
    entries: Arc<RwLock<HashMap<String, CachedPage>>>,
    ttl: Duration,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap();
        let cached = entries.get(key)?;
        if cached.stored_at.elapsed() >= self.ttl {
            return None;
        }
        Some(cached.body.clone())
    }

    pub fn put(&self, key: String, body: String) {
        let mut entries = self.entries.write().unwrap();
        entries.insert(
            key,
            CachedPage {
                body,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_cached_body_within_the_window() {
        let cache = PageCache::new(Duration::from_secs(20));
        cache.put("/".to_string(), "<p>one post</p>".to_string());
        // the underlying data may have changed; the cache must not care
        assert_eq!(cache.get("/"), Some("<p>one post</p>".to_string()));
    }

    #[test]
    fn entry_expires_after_the_ttl() {
        let cache = PageCache::new(Duration::from_millis(30));
        cache.put("/".to_string(), "stale".to_string());
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get("/"), None);
    }

    #[test]
    fn clear_forces_a_fresh_render() {
        let cache = PageCache::new(Duration::from_secs(20));
        cache.put("/".to_string(), "before".to_string());
        cache.clear();
        assert_eq!(cache.get("/"), None);
    }

    #[test]
    fn keys_are_independent() {
        let cache = PageCache::new(Duration::from_secs(20));
        cache.put("/".to_string(), "page one".to_string());
        cache.put("/?page=2".to_string(), "page two".to_string());
        assert_eq!(cache.get("/"), Some("page one".to_string()));
        assert_eq!(cache.get("/?page=2"), Some("page two".to_string()));
        assert_eq!(cache.get("/?page=3"), None);
    }
}
