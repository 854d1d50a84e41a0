//! Micro-blog client: accounts, tweets, the home timeline and profiles.
//!
//! The backend sits behind [`TweetStore`] and [`AuthService`]. Both hand
//! back `'static` futures so requests can stay in flight across frames.

pub mod auth;
pub mod client;
pub mod compose;
pub mod profile;
pub mod store;
pub mod timeline;
pub mod tweet;

use futures::FutureExt as _;
use futures::future::{self, BoxFuture};
use thiserror::Error;

pub use auth::{AuthError, AuthService, MemoryAuth, OAuthProvider, User};
pub use client::SocialClient;
pub use compose::{ComposeError, Composer};
pub use profile::Profile;
pub use store::{MemoryStore, StoreError, TweetQuery, TweetStore};
pub use timeline::{PageCursor, Timeline};
pub use tweet::{NewTweet, SortKey, Tweet, TweetId};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SocialError {
    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Only the author can delete this tweet")]
    NotOwner,
}

/// Deletes `tweet` if `user` wrote it
pub fn delete_tweet(
    store: &dyn TweetStore,
    user: Option<&User>,
    tweet: &Tweet,
) -> BoxFuture<'static, Result<TweetId, SocialError>> {
    if !tweet.can_delete(user) {
        return future::ready(Err(SocialError::NotOwner)).boxed();
    }
    let id = tweet.id.clone();
    let request = store.delete(id.clone());
    async move {
        request.await?;
        Ok(id)
    }
    .boxed()
}
