//! Content fetch collaborator and its in-memory cache.
//!
//! The engine never performs I/O itself: callers hand a [`ContentFetcher`]
//! to the evaluation pipeline. [`CachedFetcher`] bounds repeated lookups of
//! the same file at the same revision (base and head fetches, redelivered
//! webhooks for one commit) with an LRU keyed by owner/repo/path/revision.

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use review_gate_core::CollaboratorError;
use tracing::debug;

/// Identifies one file at one revision of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey {
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub revision: String,
}

impl ContentKey {
    pub fn new(owner: &str, repo: &str, path: &str, revision: &str) -> Self {
        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            path: path.to_string(),
            revision: revision.to_string(),
        }
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}@{}", self.owner, self.repo, self.path, self.revision)
    }
}

/// Downloads a file at a revision.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, key: &ContentKey) -> Result<Bytes, CollaboratorError>;
}

// ── LRU cache ───────────────────────────────────────────────────────

/// LRU-caching decorator around another fetcher. Only successful fetches
/// are cached.
pub struct CachedFetcher<F> {
    inner: F,
    cache: Mutex<LruCache<ContentKey, Bytes>>,
}

impl<F: ContentFetcher> CachedFetcher<F> {
    pub fn new(inner: F, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Build with a plain capacity, clamped to at least one entry.
    pub fn with_capacity(inner: F, capacity: usize) -> Self {
        Self::new(inner, NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN))
    }

    pub fn len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    fn cached(&self, key: &ContentKey) -> Option<Bytes> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.get(key).cloned()
    }
}

#[async_trait]
impl<F: ContentFetcher> ContentFetcher for CachedFetcher<F> {
    async fn fetch(&self, key: &ContentKey) -> Result<Bytes, CollaboratorError> {
        if let Some(content) = self.cached(key) {
            debug!(key = %key, "content cache hit");
            return Ok(content);
        }
        debug!(key = %key, "content cache miss");

        // The lock is not held across the fetch; concurrent misses for one
        // key may both fetch, and the later insert wins.
        let content = self.inner.fetch(key).await?;
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((evicted, _)) = cache.push(key.clone(), content.clone()) {
            if evicted != *key {
                debug!(key = %evicted, "evicted cached content");
            }
        }
        Ok(content)
    }
}

// ── Local directories ───────────────────────────────────────────────

/// Serves revisions from local directory trees, one root per revision name.
///
/// Owner and repo are ignored. Used by the CLI to compare two checkouts.
#[derive(Debug, Clone, Default)]
pub struct DirectoryFetcher {
    roots: HashMap<String, PathBuf>,
}

impl DirectoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `revision` from the tree rooted at `root`.
    pub fn with_revision(mut self, revision: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.roots.insert(revision.into(), root.into());
        self
    }

    fn resolve(&self, key: &ContentKey) -> Result<PathBuf, CollaboratorError> {
        let root = self
            .roots
            .get(&key.revision)
            .ok_or_else(|| CollaboratorError::not_found(key.to_string()))?;
        let relative = Path::new(key.path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(CollaboratorError::not_found(key.to_string()));
        }
        Ok(root.join(relative))
    }
}

#[async_trait]
impl ContentFetcher for DirectoryFetcher {
    async fn fetch(&self, key: &ContentKey) -> Result<Bytes, CollaboratorError> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(content) => Ok(Bytes::from(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CollaboratorError::not_found(key.to_string()))
            }
            Err(e) => Err(CollaboratorError::transport(format!("{}: {}", path.display(), e))),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
