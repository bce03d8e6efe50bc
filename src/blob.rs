//! In-memory resource handles for downloadable data.
//!
//! A [`BlobRegistry`] maps opaque `blob:<uuid>` URLs to byte buffers, the way
//! a browser's object-URL table does. Handing out a URL instead of the bytes
//! lets the state machine keep a single owner of the data and release it at
//! a well-defined point.
//!
//! [`ObjectUrl`] is the owning guard for one entry. Release is explicit
//! ([`ObjectUrl::release`]) and idempotent; dropping an unreleased guard
//! releases it, so teardown never leaks and reset + teardown never
//! double-release.

use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

const SCHEME: &str = "blob:";

#[derive(Default)]
struct Inner {
    entries: Mutex<HashMap<String, Bytes>>,
    revoked: AtomicUsize,
}

/// Shared table of live object URLs.
///
/// Cloning is cheap and every clone sees the same table.
#[derive(Clone, Default)]
pub struct BlobRegistry {
    inner: Arc<Inner>,
}

impl fmt::Debug for BlobRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobRegistry")
            .field("live", &self.live_count())
            .field("revoked", &self.revoked_count())
            .finish()
    }
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `data` and return the owning handle.
    pub fn create_object_url(&self, data: Bytes) -> ObjectUrl {
        let url = format!("{SCHEME}{}", Uuid::new_v4());
        debug!("Allocated {} ({} bytes)", url, data.len());
        self.lock().insert(url.clone(), data);
        ObjectUrl {
            url,
            registry: self.clone(),
            released: false,
        }
    }

    /// Bytes behind `url`, or `None` once it has been revoked.
    pub fn resolve(&self, url: &str) -> Option<Bytes> {
        self.lock().get(url).cloned()
    }

    /// Remove `url` from the table.
    ///
    /// Returns `false` if it was unknown or already revoked.
    pub fn revoke_object_url(&self, url: &str) -> bool {
        let removed = self.lock().remove(url).is_some();
        if removed {
            self.inner.revoked.fetch_add(1, Ordering::SeqCst);
            debug!("Revoked {}", url);
        }
        removed
    }

    /// Number of handles currently allocated.
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    /// Number of successful revocations since the registry was created.
    pub fn revoked_count(&self) -> usize {
        self.inner.revoked.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Bytes>> {
        // A poisoned table still holds consistent entries; keep using it.
        self.inner
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Owning guard for one registry entry.
pub struct ObjectUrl {
    url: String,
    registry: BlobRegistry,
    released: bool,
}

impl ObjectUrl {
    /// The `blob:<uuid>` string.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Bytes behind the handle, or `None` after release.
    pub fn bytes(&self) -> Option<Bytes> {
        if self.released {
            return None;
        }
        self.registry.resolve(&self.url)
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Release the entry. Calling this more than once is a no-op.
    pub fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.registry.revoke_object_url(&self.url);
        }
    }
}

impl fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectUrl")
            .field("url", &self.url)
            .field("released", &self.released)
            .finish()
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_resolve() {
        let reg = BlobRegistry::new();
        let url = reg.create_object_url(Bytes::from_static(b"%PDF-1.7"));
        assert!(url.as_str().starts_with("blob:"));
        assert_eq!(reg.resolve(url.as_str()).unwrap(), &b"%PDF-1.7"[..]);
        assert_eq!(url.bytes().unwrap(), &b"%PDF-1.7"[..]);
        assert_eq!(reg.live_count(), 1);
    }

    #[test]
    fn urls_are_unique() {
        let reg = BlobRegistry::new();
        let a = reg.create_object_url(Bytes::new());
        let b = reg.create_object_url(Bytes::new());
        assert_ne!(a.as_str(), b.as_str());
        assert_eq!(reg.live_count(), 2);
    }

    #[test]
    fn release_is_idempotent() {
        let reg = BlobRegistry::new();
        let mut url = reg.create_object_url(Bytes::from_static(b"x"));
        url.release();
        url.release();
        assert!(url.is_released());
        assert!(url.bytes().is_none());
        assert_eq!(reg.live_count(), 0);
        assert_eq!(reg.revoked_count(), 1);
        drop(url);
        assert_eq!(reg.revoked_count(), 1);
    }

    #[test]
    fn drop_releases() {
        let reg = BlobRegistry::new();
        {
            let _url = reg.create_object_url(Bytes::from_static(b"x"));
            assert_eq!(reg.live_count(), 1);
        }
        assert_eq!(reg.live_count(), 0);
        assert_eq!(reg.revoked_count(), 1);
    }

    #[test]
    fn revoke_unknown_returns_false() {
        let reg = BlobRegistry::new();
        assert!(!reg.revoke_object_url("blob:nope"));
        assert_eq!(reg.revoked_count(), 0);
    }
}
