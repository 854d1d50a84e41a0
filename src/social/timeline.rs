use futures::future::BoxFuture;
use std::collections::HashSet;

use super::store::{StoreError, StoreResult, TweetQuery, TweetStore};
use super::tweet::{SortKey, Tweet, TweetId};
use crate::config::FeedConfig;
use crate::util::pending::{Generation, Ticket};

/// Where a page of the historical feed begins
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    Start,
    After(SortKey),
}

impl PageCursor {
    fn query(&self, page_size: usize) -> TweetQuery {
        let query = TweetQuery::newest_first().limit(page_size);
        match self {
            Self::Start => query,
            Self::After(key) => query.start_after(key.clone()),
        }
    }
}

/// Computes one cursor per page from the full ordered feed.
///
/// The newest `live_limit` tweets belong to the live feed, so page `i`
/// covers `ordered[live_limit + i * page_size..]`. Its cursor is the tweet
/// just before that range. Pages are only created when they would be non-empty.
pub fn build_cursors(ordered: &[Tweet], live_limit: usize, page_size: usize) -> Vec<PageCursor> {
    if page_size == 0 {
        return Vec::new();
    }
    (live_limit..ordered.len())
        .step_by(page_size)
        .map(|start| match start.checked_sub(1) {
            Some(previous) => PageCursor::After(ordered[previous].sort_key()),
            None => PageCursor::Start,
        })
        .collect()
}

/// The home feed: a live view of the newest tweets plus one page of history
#[derive(Debug)]
pub struct Timeline {
    page_size: usize,
    live_limit: usize,
    live: Vec<Tweet>,
    page: Vec<Tweet>,
    cursors: Vec<PageCursor>,
    current_page: usize,
    requested_page: usize,
    cursor_generation: Generation,
    page_generation: Generation,
    loading: bool,
    error: Option<String>,
}

impl Timeline {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            page_size: config.page_size,
            live_limit: config.live_limit,
            live: Vec::new(),
            page: Vec::new(),
            cursors: Vec::new(),
            current_page: 0,
            requested_page: 0,
            cursor_generation: Generation::new(),
            page_generation: Generation::new(),
            loading: false,
            error: None,
        }
    }

    pub fn live_limit(&self) -> usize {
        self.live_limit
    }

    pub fn page_count(&self) -> usize {
        self.cursors.len()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page(&self) -> &[Tweet] {
        &self.page
    }

    pub fn live(&self) -> &[Tweet] {
        &self.live
    }

    pub fn cursors(&self) -> &[PageCursor] {
        &self.cursors
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Starts the full ordered read that cursors are computed from
    pub fn cursor_request(
        &mut self,
        store: &dyn TweetStore,
    ) -> (Ticket, BoxFuture<'static, StoreResult<Vec<Tweet>>>) {
        self.loading = true;
        (self.cursor_generation.issue(), store.query(TweetQuery::newest_first()))
    }

    /// Returns false when the response was superseded or failed
    pub fn accept_cursors(&mut self, ticket: Ticket, result: StoreResult<Vec<Tweet>>) -> bool {
        if !self.cursor_generation.is_current(ticket) {
            log::debug!("Dropping stale cursor response");
            return false;
        }
        match result {
            Ok(ordered) => {
                self.cursors = build_cursors(&ordered, self.live_limit, self.page_size);
                self.current_page = self.current_page.min(self.cursors.len().saturating_sub(1));
                if self.cursors.is_empty() {
                    self.page.clear();
                    self.loading = false;
                }
                self.error = None;
                true
            }
            Err(err) => self.fail(err),
        }
    }

    /// Starts loading page `index`; `None` when no such page exists
    pub fn page_request(
        &mut self,
        store: &dyn TweetStore,
        index: usize,
    ) -> Option<(Ticket, BoxFuture<'static, StoreResult<Vec<Tweet>>>)> {
        let cursor = self.cursors.get(index)?;
        let query = cursor.query(self.page_size);
        self.requested_page = index;
        self.loading = true;
        Some((self.page_generation.issue(), store.query(query)))
    }

    pub fn accept_page(&mut self, ticket: Ticket, result: StoreResult<Vec<Tweet>>) -> bool {
        if !self.page_generation.is_current(ticket) {
            log::debug!("Dropping stale page response");
            return false;
        }
        match result {
            Ok(tweets) => {
                self.page = tweets;
                self.current_page = self.requested_page;
                self.loading = false;
                self.error = None;
                true
            }
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: StoreError) -> bool {
        log::error!("Timeline request failed: {err}");
        self.loading = false;
        self.error = Some(err.to_string());
        false
    }

    /// Replaces the live feed with a subscription snapshot
    pub fn apply_live(&mut self, snapshot: Vec<Tweet>) {
        self.live = snapshot;
    }

    /// Live tweets followed by the current page, each id shown once.
    /// When both views hold the same tweet the live copy is kept.
    pub fn feed(&self) -> Vec<&Tweet> {
        let mut seen = HashSet::new();
        self.live
            .iter()
            .chain(&self.page)
            .filter(|tweet| seen.insert(&tweet.id))
            .collect()
    }

    /// Drops a deleted tweet from both views without waiting for a refresh
    pub fn remove(&mut self, id: &TweetId) {
        self.live.retain(|tweet| &tweet.id != id);
        self.page.retain(|tweet| &tweet.id != id);
    }

    /// Recomputes cursors and reloads the current page
    pub async fn refresh(&mut self, store: &dyn TweetStore) -> StoreResult<()> {
        let (ticket, request) = self.cursor_request(store);
        let result = request.await;
        let error = result.as_ref().err().cloned();
        self.accept_cursors(ticket, result);
        if let Some(err) = error {
            return Err(err);
        }
        if self.cursors.is_empty() {
            return Ok(());
        }
        self.load_page(store, self.current_page).await
    }

    pub async fn load_page(&mut self, store: &dyn TweetStore, index: usize) -> StoreResult<()> {
        let Some((ticket, request)) = self.page_request(store, index) else {
            return Err(StoreError::Rejected(format!("page {index} does not exist")));
        };
        let result = request.await;
        let error = result.as_ref().err().cloned();
        self.accept_page(ticket, result);
        error.map_or(Ok(()), Err)
    }
}
