use futures::FutureExt as _;
use futures::future::BoxFuture;
use std::sync::Arc;

use super::auth::{AuthResult, AuthService, ProfileUpdate, User};
use super::compose::{ComposeError, compress_photo};
use super::store::{StoreResult, TweetQuery, TweetStore};
use super::tweet::{Tweet, TweetId};
use crate::util::pending::{Generation, Ticket};

/// The signed-in user's own tweets
#[derive(Debug, Default)]
pub struct Profile {
    tweets: Vec<Tweet>,
    generation: Generation,
    loading: bool,
    error: Option<String>,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tweets(&self) -> &[Tweet] {
        &self.tweets
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn request(
        &mut self,
        store: &dyn TweetStore,
        user: &User,
    ) -> (Ticket, BoxFuture<'static, StoreResult<Vec<Tweet>>>) {
        self.loading = true;
        let query = TweetQuery::newest_first().by_author(user.uid.clone());
        (self.generation.issue(), store.query(query))
    }

    pub fn accept(&mut self, ticket: Ticket, result: StoreResult<Vec<Tweet>>) -> bool {
        if !self.generation.is_current(ticket) {
            return false;
        }
        self.loading = false;
        match result {
            Ok(tweets) => {
                self.tweets = tweets;
                self.error = None;
                true
            }
            Err(err) => {
                log::error!("Loading profile tweets failed: {err}");
                self.error = Some(err.to_string());
                false
            }
        }
    }

    pub fn remove(&mut self, id: &TweetId) {
        self.tweets.retain(|tweet| &tweet.id != id);
    }

    /// Forgets everything, e.g. after signing out. In-flight requests become stale.
    pub fn reset(&mut self) {
        self.generation.issue();
        self.tweets.clear();
        self.loading = false;
        self.error = None;
    }
}

/// Compresses a new avatar and stores it as the profile photo
pub fn update_avatar(
    auth: &Arc<dyn AuthService>,
    bytes: &[u8],
) -> Result<BoxFuture<'static, AuthResult<User>>, ComposeError> {
    let data_url = compress_photo(bytes)?;
    let auth = Arc::clone(auth);
    Ok(async move { auth.update_profile(ProfileUpdate::photo(data_url)).await }.boxed())
}
