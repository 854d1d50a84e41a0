use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

use super::auth::User;

/// Backend-assigned document id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TweetId(String);

impl TweetId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TweetId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl std::fmt::Display for TweetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fields written when a tweet is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTweet {
    pub tweet: String,
    /// Epoch milliseconds
    pub created_at: i64,
    pub username: String,
    pub user_id: String,
    /// `data:` URL of an attached photo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// A stored tweet document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub id: TweetId,
    pub tweet: String,
    pub created_at: i64,
    pub username: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl Tweet {
    pub fn from_new(id: TweetId, new: NewTweet) -> Self {
        Self {
            id,
            tweet: new.tweet,
            created_at: new.created_at,
            username: new.username,
            user_id: new.user_id,
            photo: new.photo,
        }
    }

    pub fn sort_key(&self) -> SortKey {
        SortKey {
            created_at: self.created_at,
            id: self.id.clone(),
        }
    }

    /// Only the author may delete a tweet
    pub fn can_delete(&self, user: Option<&User>) -> bool {
        user.is_some_and(|user| user.uid == self.user_id)
    }
}

/// Position of a document in the timeline order.
///
/// `Ord` follows the feed: newest `created_at` first, ties broken by id,
/// also descending. "Start after" a key means every key greater than it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortKey {
    pub created_at: i64,
    pub id: TweetId,
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .created_at
            .cmp(&self.created_at)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tweet(id: &str, created_at: i64, user_id: &str) -> Tweet {
        Tweet {
            id: TweetId::from(id),
            tweet: "hello".into(),
            created_at,
            username: "someone".into(),
            user_id: user_id.into(),
            photo: None,
        }
    }

    #[test]
    fn test_sort_key_orders_newest_first() {
        let mut tweets = vec![tweet("a", 1, "u"), tweet("b", 3, "u"), tweet("c", 2, "u")];
        tweets.sort_by_key(Tweet::sort_key);
        let ids: Vec<_> = tweets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn test_sort_key_ties_break_on_id() {
        assert!(tweet("b", 5, "u").sort_key() < tweet("a", 5, "u").sort_key());
    }

    #[test]
    fn test_wire_field_names() {
        let value = serde_json::to_value(tweet("x", 42, "uid-1")).unwrap();
        assert_eq!(value["createdAt"], 42);
        assert_eq!(value["userId"], "uid-1");
        assert!(value.get("photo").is_none());
    }

    #[test]
    fn test_only_author_can_delete() {
        let post = tweet("x", 1, "owner");
        let owner = User::new("owner");
        let other = User::new("other");
        assert!(post.can_delete(Some(&owner)));
        assert!(!post.can_delete(Some(&other)));
        assert!(!post.can_delete(None));
    }
}
