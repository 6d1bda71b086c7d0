use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use sdmx_fetch::{Fetcher, HttpClient};
use tokio::fs::File;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::artifact::{ArtifactKind, DatasetId};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::store::CacheStore;

/// Cached access to the artifacts of a statistics web service.
///
/// Artifacts are served from the local cache when present. Otherwise, or
/// when a refresh is forced, they are retrieved, installed in the cache and
/// then served from it. A failed retrieval leaves the cache untouched.
///
/// Concurrent requests for the same (dataset, kind) are serialised; a
/// non-forced request that had to wait is answered from the entry installed
/// by the request it waited for.
pub struct DatasetClient<C: HttpClient> {
    config: ClientConfig,
    store: CacheStore,
    fetcher: Fetcher<C>,
    locks: KeyLocks,
}

impl<C: HttpClient> DatasetClient<C> {
    /// The directories named by `config` must exist; see
    /// [`initialize`](crate::initialize).
    pub fn new(config: ClientConfig, client: C) -> Result<Self> {
        config.validate()?;
        let fetcher =
            Fetcher::new(client, config.staging_dir.clone()).with_policy(config.poll_policy());
        Ok(Self {
            store: CacheStore::new(config.cache_dir.clone()),
            config,
            fetcher,
            locks: KeyLocks::default(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn http(&self) -> &C {
        self.fetcher.client()
    }

    /// The structure definition of dataset `id`.
    pub async fn get_metadata(&self, id: &str, force_refresh: bool) -> Result<File> {
        let id = DatasetId::new(id)?;
        self.fetch(&id, ArtifactKind::StructureDefinition, force_refresh)
            .await
    }

    /// The data document of dataset `id`.
    pub async fn get_data(&self, id: &str, force_refresh: bool) -> Result<File> {
        let id = DatasetId::new(id)?;
        self.fetch(&id, ArtifactKind::Data, force_refresh).await
    }

    /// Dataflow listings are not supported; this always fails without
    /// touching the network or the cache.
    pub async fn get_dataflow(&self, _id: &str) -> Result<File> {
        Err(Error::Unsupported {
            operation: "dataflow listing",
        })
    }

    /// Shared routine behind [`get_metadata`](Self::get_metadata) and
    /// [`get_data`](Self::get_data).
    pub async fn fetch(
        &self,
        id: &DatasetId,
        kind: ArtifactKind,
        force_refresh: bool,
    ) -> Result<File> {
        if !force_refresh && self.store.has(id, kind).await {
            tracing::debug!(%id, %kind, "cache hit");
            return self.store.open(id, kind).await;
        }

        let _guard = self.locks.acquire(id, kind).await;
        if !force_refresh && self.store.has(id, kind).await {
            tracing::debug!(%id, %kind, "installed by a concurrent request");
            return self.store.open(id, kind).await;
        }

        let url = self.config.url_for(kind, id);
        tracing::info!(%id, %kind, url, force_refresh, "retrieving");
        let staging = self
            .fetcher
            .fetch(&url, id.as_str(), kind.cache_suffix())
            .await?;
        self.store.replace(id, kind, staging).await?;
        self.store.open(id, kind).await
    }
}

#[cfg(feature = "reqwest")]
impl DatasetClient<sdmx_fetch::ReqwestClient> {
    /// A client talking to the real service.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let http = sdmx_fetch::ReqwestClient::new()
            .map_err(|e| Error::Config(format!("cannot build HTTP client: {e}")))?;
        Self::new(config, http)
    }
}

type Key = (DatasetId, ArtifactKind);

#[derive(Default)]
struct Slot {
    lock: Arc<Mutex<()>>,
    /// Guards holding or waiting on `lock`.
    users: usize,
}

/// Lazily created lock per cache key. A slot is removed when its last user
/// goes away, including a waiter whose request was dropped.
#[derive(Default)]
struct KeyLocks {
    map: StdMutex<HashMap<Key, Slot>>,
}

impl KeyLocks {
    async fn acquire(&self, id: &DatasetId, kind: ArtifactKind) -> KeyGuard<'_> {
        let key = (id.clone(), kind);
        let lock = {
            let mut map = self.map();
            let slot = map.entry(key.clone()).or_default();
            slot.users += 1;
            Arc::clone(&slot.lock)
        };
        // Registered before waiting so a cancelled wait still releases the slot.
        let mut entry = KeyGuard {
            locks: self,
            key,
            guard: None,
        };
        entry.guard = Some(lock.lock_owned().await);
        entry
    }

    fn map(&self) -> MutexGuard<'_, HashMap<Key, Slot>> {
        self.map.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.map().len()
    }
}

struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: Key,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut map = self.locks.map();
        if let Some(slot) = map.get_mut(&self.key) {
            slot.users = slot.users.saturating_sub(1);
            if slot.users == 0 {
                map.remove(&self.key);
            }
        }
    }
}
