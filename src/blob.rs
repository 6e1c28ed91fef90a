//! Transient binary object references.
//!
//! Encoded bytes that are handed to a consumer by reference (the source file
//! while it is decoded, an artifact while it is saved, a freshly built
//! archive) are registered in a [`BlobStore`] and addressed through an
//! [`ObjectUrl`]. The URL releases its entry when dropped, so every exit path,
//! including `?` early returns, revokes what it created.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BlobError {
    #[error("{0} was revoked before it was read")]
    Revoked(BlobId),
}

/// Opaque handle to a registered blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlobId(u64);

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:toolbench/{}", self.0)
    }
}

/// Registry of in-memory blobs.
pub trait BlobStore {
    fn create(&self, data: Arc<[u8]>) -> BlobId;
    fn read(&self, id: BlobId) -> Option<Arc<[u8]>>;
    fn revoke(&self, id: BlobId);
}

/// Scoped reference to a blob; revoked on drop.
pub struct ObjectUrl<'s, S: BlobStore + ?Sized> {
    store: &'s S,
    id: BlobId,
}

impl<'s, S: BlobStore + ?Sized> ObjectUrl<'s, S> {
    pub fn create(store: &'s S, data: impl Into<Arc<[u8]>>) -> Self {
        let id = store.create(data.into());
        tracing::trace!(%id, "created object URL");
        Self { store, id }
    }

    pub fn id(&self) -> BlobId {
        self.id
    }

    /// Bytes behind the URL.
    pub fn bytes(&self) -> Result<Arc<[u8]>, BlobError> {
        self.store.read(self.id).ok_or(BlobError::Revoked(self.id))
    }
}

impl<S: BlobStore + ?Sized> Drop for ObjectUrl<'_, S> {
    fn drop(&mut self) {
        self.store.revoke(self.id);
        tracing::trace!(id = %self.id, "revoked object URL");
    }
}

/// Process-local blob store.
#[derive(Default)]
pub struct MemoryBlobStore {
    next_id: AtomicU64,
    blobs: Mutex<HashMap<BlobId, Arc<[u8]>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs not yet revoked.
    pub fn live_count(&self) -> usize {
        self.entries().len()
    }

    /// Recovers a poisoned lock; every operation leaves the map consistent.
    fn entries(&self) -> MutexGuard<'_, HashMap<BlobId, Arc<[u8]>>> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BlobStore for MemoryBlobStore {
    fn create(&self, data: Arc<[u8]>) -> BlobId {
        let id = BlobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries().insert(id, data);
        id
    }

    fn read(&self, id: BlobId) -> Option<Arc<[u8]>> {
        self.entries().get(&id).cloned()
    }

    fn revoke(&self, id: BlobId) {
        self.entries().remove(&id);
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Blob store double that counts create/revoke calls.
    #[derive(Default)]
    pub struct CountingBlobStore {
        inner: MemoryBlobStore,
        pub created: Mutex<Vec<BlobId>>,
        pub revoked: Mutex<Vec<BlobId>>,
        /// Reads find nothing, as if the entry had been revoked early.
        pub lose_reads: bool,
    }

    impl CountingBlobStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn losing_reads() -> Self {
            Self {
                lose_reads: true,
                ..Self::default()
            }
        }

        pub fn created_count(&self) -> usize {
            self.created.lock().unwrap().len()
        }

        pub fn revoked_count(&self) -> usize {
            self.revoked.lock().unwrap().len()
        }

        /// Every created id was revoked exactly once.
        pub fn assert_balanced(&self) {
            let mut created = self.created.lock().unwrap().clone();
            let mut revoked = self.revoked.lock().unwrap().clone();
            created.sort_by_key(|id| id.0);
            revoked.sort_by_key(|id| id.0);
            assert_eq!(created, revoked, "object URLs leaked or double-revoked");
            assert_eq!(self.inner.live_count(), 0);
        }
    }

    impl BlobStore for CountingBlobStore {
        fn create(&self, data: Arc<[u8]>) -> BlobId {
            let id = self.inner.create(data);
            self.created.lock().unwrap().push(id);
            id
        }

        fn read(&self, id: BlobId) -> Option<Arc<[u8]>> {
            if self.lose_reads {
                return None;
            }
            self.inner.read(id)
        }

        fn revoke(&self, id: BlobId) {
            self.revoked.lock().unwrap().push(id);
            self.inner.revoke(id);
        }
    }

    #[test]
    fn url_reads_back_bytes() {
        let store = MemoryBlobStore::new();
        let url = ObjectUrl::create(&store, vec![1u8, 2, 3]);
        assert_eq!(&*url.bytes().unwrap(), &[1, 2, 3]);
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    fn drop_revokes() {
        let store = MemoryBlobStore::new();
        {
            let _a = ObjectUrl::create(&store, vec![0u8]);
            let _b = ObjectUrl::create(&store, vec![1u8]);
            assert_eq!(store.live_count(), 2);
        }
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn revoked_on_early_return() {
        fn fails(store: &CountingBlobStore) -> Result<(), String> {
            let _url = ObjectUrl::create(store, vec![9u8; 4]);
            let _scale: f64 = "two".parse().map_err(|_| "boom".to_string())?;
            Ok(())
        }

        let store = CountingBlobStore::new();
        assert!(fails(&store).is_err());
        assert_eq!(store.created_count(), 1);
        assert_eq!(store.revoked_count(), 1);
        store.assert_balanced();
    }

    #[test]
    fn ids_are_unique_and_display_as_urls() {
        let store = MemoryBlobStore::new();
        let a = ObjectUrl::create(&store, vec![0u8]);
        let b = ObjectUrl::create(&store, vec![0u8]);
        assert_ne!(a.id(), b.id());
        assert!(a.id().to_string().starts_with("blob:toolbench/"));
    }

    #[test]
    fn revoked_entry_is_an_error() {
        let store = MemoryBlobStore::new();
        let url = ObjectUrl::create(&store, vec![5u8]);
        store.revoke(url.id());
        assert_eq!(url.bytes(), Err(BlobError::Revoked(url.id())));
    }

    #[test]
    fn poisoned_store_keeps_serving() {
        let store = MemoryBlobStore::new();
        let url = ObjectUrl::create(&store, vec![7u8, 8]);
        let joined: std::thread::Result<()> = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = store.blobs.lock().unwrap();
                panic!("holder panicked");
            })
            .join()
        });
        assert!(joined.is_err());
        assert!(store.blobs.is_poisoned());

        assert_eq!(&*url.bytes().unwrap(), &[7, 8]);
        drop(url);
        assert_eq!(store.live_count(), 0);
    }
}
