use futures::executor::block_on;
use sketch_pad::config::FeedConfig;
use sketch_pad::social::{
    MemoryStore, NewTweet, PageCursor, SocialError, Timeline, Tweet, TweetQuery, TweetStore, User,
    delete_tweet,
};

fn seed(store: &MemoryStore, count: i64) -> Vec<Tweet> {
    for i in 0..count {
        block_on(store.add(NewTweet {
            tweet: format!("tweet {i}"),
            created_at: 1_000 + i,
            username: "poster".into(),
            user_id: if i % 2 == 0 { "even".into() } else { "odd".into() },
            photo: None,
        }))
        .unwrap();
    }
    block_on(store.query(TweetQuery::newest_first())).unwrap()
}

fn feed_config() -> FeedConfig {
    FeedConfig {
        page_size: 3,
        live_limit: 3,
    }
}

#[test]
fn test_each_page_starts_after_its_cursor() {
    let store = MemoryStore::new();
    let ordered = seed(&store, 11);
    let mut timeline = Timeline::new(&feed_config());
    block_on(timeline.refresh(&store)).unwrap();

    // 11 tweets, 3 live, the remaining 8 paged as 3 + 3 + 2
    assert_eq!(timeline.page_count(), 3);
    let mut seen = Vec::new();
    for index in 0..timeline.page_count() {
        block_on(timeline.load_page(&store, index)).unwrap();
        let PageCursor::After(cursor) = &timeline.cursors()[index] else {
            panic!("page {index} should start after a tweet");
        };
        let cursor_position = ordered.iter().position(|t| &t.sort_key() == cursor).unwrap();
        assert_eq!(timeline.page()[0].id, ordered[cursor_position + 1].id);

        let last = index + 1 == timeline.page_count();
        if last {
            assert_eq!(timeline.page().len(), 2);
        } else {
            assert_eq!(timeline.page().len(), 3);
        }
        seen.extend(timeline.page().iter().map(|t| t.id.clone()));
    }

    let expected: Vec<_> = ordered[3..].iter().map(|t| t.id.clone()).collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_exact_multiple_has_no_empty_last_page() {
    let store = MemoryStore::new();
    seed(&store, 9);
    let mut timeline = Timeline::new(&feed_config());
    block_on(timeline.refresh(&store)).unwrap();
    assert_eq!(timeline.page_count(), 2);
    block_on(timeline.load_page(&store, 1)).unwrap();
    assert_eq!(timeline.page().len(), 3);
    assert!(block_on(timeline.load_page(&store, 2)).is_err());
}

#[test]
fn test_live_and_paged_views_merge_without_duplicates() {
    let store = MemoryStore::new();
    seed(&store, 5);
    let mut timeline = Timeline::new(&FeedConfig {
        page_size: 3,
        live_limit: 0,
    });
    block_on(timeline.refresh(&store)).unwrap();

    let mut live = store.subscribe_latest(3);
    timeline.apply_live(live.try_recv().unwrap());

    // the first page overlaps the live window completely
    let feed = timeline.feed();
    let ids: Vec<_> = feed.iter().map(|t| t.id.clone()).collect();
    let mut unique = ids.clone();
    unique.dedup();
    assert_eq!(ids, unique);
    assert_eq!(feed.len(), 3);
}

#[test]
fn test_superseded_page_response_is_dropped() {
    let store = MemoryStore::new();
    seed(&store, 12);
    let mut timeline = Timeline::new(&feed_config());
    block_on(timeline.refresh(&store)).unwrap();

    let (old_ticket, old_request) = timeline.page_request(&store, 2).unwrap();
    let (new_ticket, new_request) = timeline.page_request(&store, 1).unwrap();
    let new_page = block_on(new_request).unwrap();
    assert!(timeline.accept_page(new_ticket, Ok(new_page.clone())));
    assert!(!timeline.accept_page(old_ticket, block_on(old_request)));

    assert_eq!(timeline.current_page(), 1);
    assert_eq!(timeline.page(), new_page.as_slice());
}

#[test]
fn test_offline_store_reports_error() {
    let store = MemoryStore::new();
    seed(&store, 6);
    store.set_offline(true);
    let mut timeline = Timeline::new(&feed_config());
    assert!(block_on(timeline.refresh(&store)).is_err());
    assert!(timeline.error().is_some());
    assert!(!timeline.is_loading());
}

#[test]
fn test_only_the_author_deletes() {
    let store = MemoryStore::new();
    let ordered = seed(&store, 2);
    let tweet = &ordered[0];
    let author = User::new(tweet.user_id.clone());
    let stranger = User::new("stranger");

    assert_eq!(
        block_on(delete_tweet(&store, Some(&stranger), tweet)),
        Err(SocialError::NotOwner)
    );
    assert_eq!(block_on(delete_tweet(&store, None, tweet)), Err(SocialError::NotOwner));
    assert_eq!(store.len(), 2);

    assert_eq!(block_on(delete_tweet(&store, Some(&author), tweet)), Ok(tweet.id.clone()));
    assert_eq!(store.len(), 1);
}
