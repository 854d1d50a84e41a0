use futures::FutureExt as _;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::future::{self, BoxFuture};
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;

use super::tweet::{NewTweet, SortKey, Tweet, TweetId};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Document {0} not found")]
    NotFound(TweetId),

    #[error("Request rejected: {0}")]
    Rejected(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A read over the tweets collection, always ordered newest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TweetQuery {
    pub author: Option<String>,
    pub start_after: Option<SortKey>,
    pub limit: Option<usize>,
}

impl TweetQuery {
    pub fn newest_first() -> Self {
        Self::default()
    }

    pub fn by_author(mut self, user_id: impl Into<String>) -> Self {
        self.author = Some(user_id.into());
        self
    }

    pub fn start_after(mut self, key: SortKey) -> Self {
        self.start_after = Some(key);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Applies the query to an unordered set of documents
    pub fn apply<'a>(&self, docs: impl IntoIterator<Item = &'a Tweet>) -> Vec<Tweet> {
        let mut matched: Vec<Tweet> = docs
            .into_iter()
            .filter(|t| self.author.as_ref().is_none_or(|author| &t.user_id == author))
            .filter(|t| self.start_after.as_ref().is_none_or(|key| t.sort_key() > *key))
            .cloned()
            .collect();
        matched.sort_by_key(Tweet::sort_key);
        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        matched
    }
}

/// The document database as seen by the client.
///
/// Calls return owned futures so the UI can keep them in flight across frames.
pub trait TweetStore: Send + Sync {
    fn add(&self, tweet: NewTweet) -> BoxFuture<'static, StoreResult<Tweet>>;

    fn delete(&self, id: TweetId) -> BoxFuture<'static, StoreResult<()>>;

    fn query(&self, query: TweetQuery) -> BoxFuture<'static, StoreResult<Vec<Tweet>>>;

    /// Live view of the newest `limit` tweets. The current state is sent
    /// immediately, then again after every change.
    fn subscribe_latest(&self, limit: usize) -> UnboundedReceiver<Vec<Tweet>>;
}

struct Watcher {
    limit: usize,
    tx: UnboundedSender<Vec<Tweet>>,
}

#[derive(Default)]
struct StoreInner {
    docs: Vec<Tweet>,
    watchers: Vec<Watcher>,
    offline: bool,
}

impl StoreInner {
    fn latest(&self, limit: usize) -> Vec<Tweet> {
        TweetQuery::newest_first().limit(limit).apply(&self.docs)
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline {
            return Err(StoreError::Unavailable("store is offline".into()));
        }
        Ok(())
    }

    fn notify(&mut self) {
        let snapshots: Vec<Vec<Tweet>> = self.watchers.iter().map(|w| self.latest(w.limit)).collect();
        let mut snapshots = snapshots.into_iter();
        self.watchers.retain(|watcher| {
            let snapshot = snapshots.next().unwrap_or_default();
            watcher.tx.unbounded_send(snapshot).is_ok()
        });
    }
}

/// In-process tweet store with the same ordering and cursor semantics as the hosted one
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates losing the backend; every request fails while set
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().offline = offline;
    }

    pub fn len(&self) -> usize {
        self.inner.lock().docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TweetStore for MemoryStore {
    fn add(&self, tweet: NewTweet) -> BoxFuture<'static, StoreResult<Tweet>> {
        let mut inner = self.inner.lock();
        let result = inner.check_online().map(|()| {
            let stored = Tweet::from_new(TweetId::generate(), tweet);
            log::debug!("Stored tweet {}", stored.id);
            inner.docs.push(stored.clone());
            inner.notify();
            stored
        });
        future::ready(result).boxed()
    }

    fn delete(&self, id: TweetId) -> BoxFuture<'static, StoreResult<()>> {
        let mut inner = self.inner.lock();
        let result = inner.check_online().and_then(|()| {
            let position = inner
                .docs
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            inner.docs.remove(position);
            inner.notify();
            Ok(())
        });
        future::ready(result).boxed()
    }

    fn query(&self, query: TweetQuery) -> BoxFuture<'static, StoreResult<Vec<Tweet>>> {
        let inner = self.inner.lock();
        let result = inner.check_online().map(|()| query.apply(&inner.docs));
        future::ready(result).boxed()
    }

    fn subscribe_latest(&self, limit: usize) -> UnboundedReceiver<Vec<Tweet>> {
        let (tx, rx) = mpsc::unbounded();
        let mut inner = self.inner.lock();
        if tx.unbounded_send(inner.latest(limit)).is_ok() {
            inner.watchers.push(Watcher { limit, tx });
        }
        rx
    }
}
