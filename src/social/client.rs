use futures::FutureExt as _;
use futures::channel::mpsc::{TryRecvError, UnboundedReceiver};
use std::sync::Arc;

use super::auth::{AuthError, AuthResult, AuthService, MemoryAuth, OAuthProvider, User, validate_credentials};
use super::compose::Composer;
use super::profile::{self, Profile};
use super::store::{MemoryStore, StoreResult, TweetStore};
use super::timeline::Timeline;
use super::tweet::{Tweet, TweetId};
use super::{SocialError, delete_tweet};
use crate::config::FeedConfig;
use crate::util::pending::{Pending, Ticket};
use crate::util::time::{current_time_secs, now_millis};

/// A resolved backend request, tagged with what it was for
#[derive(Debug)]
pub enum SocialEvent {
    Cursors(Ticket, StoreResult<Vec<Tweet>>),
    Page(Ticket, StoreResult<Vec<Tweet>>),
    ProfileTweets(Ticket, StoreResult<Vec<Tweet>>),
    Posted(Result<Tweet, SocialError>),
    Deleted(Result<TweetId, SocialError>),
    SignedIn(AuthResult<User>),
    ProfileUpdated(AuthResult<User>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Home,
    Profile,
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Create an account instead of signing in
    pub creating: bool,
}

/// Everything the social panel shows, plus the requests it has in flight
pub struct SocialClient {
    store: Arc<dyn TweetStore>,
    auth: Arc<dyn AuthService>,
    user: Option<User>,
    pub screen: Screen,
    pub login: LoginForm,
    pub composer: Composer,
    timeline: Timeline,
    profile: Profile,
    live: Option<UnboundedReceiver<Vec<Tweet>>>,
    pending: Pending<SocialEvent>,
    auth_error: Option<String>,
    notice: Option<String>,
}

impl SocialClient {
    pub fn new(store: Arc<dyn TweetStore>, auth: Arc<dyn AuthService>, feed: &FeedConfig) -> Self {
        let user = auth.current_user();
        Self {
            store,
            auth,
            user,
            screen: Screen::default(),
            login: LoginForm::default(),
            composer: Composer::new(),
            timeline: Timeline::new(feed),
            profile: Profile::new(),
            live: None,
            pending: Pending::new(),
            auth_error: None,
            notice: None,
        }
    }

    /// A client backed by the in-process store and account registry
    pub fn in_memory(feed: &FeedConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryAuth::new()), feed)
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn auth_error(&self) -> Option<&str> {
        self.auth_error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// True when no request is waiting for a response
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Subscribes to the live feed and loads the first page
    pub fn start(&mut self) {
        if self.live.is_none() {
            self.live = Some(self.store.subscribe_latest(self.timeline.live_limit()));
        }
        self.refresh();
    }

    pub fn refresh(&mut self) {
        let (ticket, request) = self.timeline.cursor_request(self.store.as_ref());
        self.pending
            .push(request.map(move |result| SocialEvent::Cursors(ticket, result)));
    }

    pub fn go_to_page(&mut self, index: usize) {
        if let Some((ticket, request)) = self.timeline.page_request(self.store.as_ref(), index) {
            self.pending
                .push(request.map(move |result| SocialEvent::Page(ticket, result)));
        }
    }

    pub fn show(&mut self, screen: Screen) {
        self.screen = screen;
        if screen == Screen::Profile {
            self.load_profile();
        }
    }

    fn load_profile(&mut self) {
        let Some(user) = &self.user else {
            return;
        };
        let (ticket, request) = self.profile.request(self.store.as_ref(), user);
        self.pending
            .push(request.map(move |result| SocialEvent::ProfileTweets(ticket, result)));
    }

    /// Signs in or creates an account from the login form
    pub fn submit_login(&mut self) {
        let form = &self.login;
        let checked = if form.creating {
            validate_credentials(&form.email, &form.password)
        } else if form.email.trim().is_empty() || form.password.is_empty() {
            Err(AuthError::MissingCredentials)
        } else {
            Ok(())
        };
        if let Err(err) = checked {
            self.auth_error = Some(err.to_string());
            return;
        }
        self.auth_error = None;
        let request = if form.creating {
            self.auth.create_account(&form.name, &form.email, &form.password)
        } else {
            self.auth.sign_in(&form.email, &form.password)
        };
        self.pending.push(request.map(SocialEvent::SignedIn));
    }

    pub fn sign_in_with(&mut self, provider: OAuthProvider) {
        self.auth_error = None;
        let request = self.auth.sign_in_with(provider);
        self.pending.push(request.map(SocialEvent::SignedIn));
    }

    pub fn sign_out(&mut self) {
        self.auth.sign_out();
        self.user = None;
        self.profile.reset();
        self.screen = Screen::Home;
    }

    pub fn attach_photo(&mut self, name: &str, bytes: &[u8]) {
        if let Err(err) = self.composer.attach_photo(name, bytes) {
            log::warn!("Rejected photo {name}: {err}");
        }
    }

    pub fn post(&mut self) {
        match self
            .composer
            .submit(self.user.as_ref(), &self.store, &self.auth, now_millis())
        {
            Ok(request) => self.pending.push(request.map(SocialEvent::Posted)),
            Err(err) => log::debug!("Tweet not posted: {err}"),
        }
    }

    pub fn delete(&mut self, tweet: &Tweet) {
        let request = delete_tweet(self.store.as_ref(), self.user.as_ref(), tweet);
        self.pending.push(request.map(SocialEvent::Deleted));
    }

    pub fn change_avatar(&mut self, bytes: &[u8]) {
        if self.user.is_none() {
            self.notice = Some(AuthError::NotSignedIn.to_string());
            return;
        }
        match profile::update_avatar(&self.auth, bytes) {
            Ok(request) => self.pending.push(request.map(SocialEvent::ProfileUpdated)),
            Err(err) => self.notice = Some(err.to_string()),
        }
    }

    /// Drains live updates and resolved requests; call once per frame
    pub fn poll(&mut self, ctx: &egui::Context) {
        self.drain_live();
        for event in self.pending.poll_ready(ctx) {
            self.handle(event);
        }
    }

    fn drain_live(&mut self) {
        let Some(live) = self.live.as_mut() else {
            return;
        };
        let mut latest = None;
        loop {
            match live.try_recv() {
                Ok(snapshot) => latest = Some(snapshot),
                Err(TryRecvError::Closed) => {
                    log::warn!("Live feed closed");
                    self.live = None;
                    break;
                }
                Err(TryRecvError::Empty) => break,
            }
        }
        if let Some(snapshot) = latest {
            self.timeline.apply_live(snapshot);
            // the live window moved, so every page boundary moved with it
            self.refresh();
        }
    }

    fn handle(&mut self, event: SocialEvent) {
        match event {
            SocialEvent::Cursors(ticket, result) => {
                if self.timeline.accept_cursors(ticket, result) {
                    self.go_to_page(self.timeline.current_page());
                }
            }
            SocialEvent::Page(ticket, result) => {
                self.timeline.accept_page(ticket, result);
            }
            SocialEvent::ProfileTweets(ticket, result) => {
                self.profile.accept(ticket, result);
            }
            SocialEvent::Posted(result) => {
                self.composer.finish(&result, current_time_secs());
                if result.is_ok() {
                    self.user = self.auth.current_user();
                    if self.screen == Screen::Profile {
                        self.load_profile();
                    }
                }
            }
            SocialEvent::Deleted(Ok(id)) => {
                log::info!("Deleted tweet {id}");
                self.timeline.remove(&id);
                self.profile.remove(&id);
                self.refresh();
            }
            SocialEvent::Deleted(Err(err)) => {
                log::error!("Delete failed: {err}");
                self.notice = Some(err.to_string());
            }
            SocialEvent::SignedIn(Ok(user)) => {
                self.user = Some(user);
                self.login.password.clear();
                self.auth_error = None;
                if self.screen == Screen::Profile {
                    self.load_profile();
                }
            }
            SocialEvent::SignedIn(Err(err)) => {
                log::error!("Sign-in failed: {err}");
                self.auth_error = Some(err.to_string());
            }
            SocialEvent::ProfileUpdated(Ok(user)) => {
                self.user = Some(user);
            }
            SocialEvent::ProfileUpdated(Err(err)) => {
                log::error!("Profile update failed: {err}");
                self.notice = Some(err.to_string());
            }
        }
    }
}

impl Default for SocialClient {
    fn default() -> Self {
        Self::in_memory(&FeedConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(client: &mut SocialClient, ctx: &egui::Context) {
        for _ in 0..10 {
            client.poll(ctx);
            if client.is_idle() {
                break;
            }
        }
    }

    #[test]
    fn test_empty_login_makes_no_request() {
        let mut client = SocialClient::in_memory(&FeedConfig::default());
        client.submit_login();
        assert_eq!(client.auth_error(), Some("Email and password are required"));
        assert!(client.is_idle());
    }

    #[test]
    fn test_sign_up_post_and_see_it_live() {
        let ctx = egui::Context::default();
        let mut client = SocialClient::in_memory(&FeedConfig::default());
        client.start();
        client.login = LoginForm {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "hunter22".into(),
            creating: true,
        };
        client.submit_login();
        settle(&mut client, &ctx);
        assert_eq!(client.user().and_then(|u| u.display_name.as_deref()), Some("Ada"));

        client.composer.text = "first post".into();
        client.post();
        settle(&mut client, &ctx);
        let feed = client.timeline().feed();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].username, "Ada");
        assert!(client.composer.text.is_empty());
    }

    #[test]
    fn test_delete_by_stranger_is_refused() {
        let ctx = egui::Context::default();
        let mut client = SocialClient::in_memory(&FeedConfig::default());
        client.start();
        client.sign_in_with(OAuthProvider::GitHub);
        settle(&mut client, &ctx);
        client.composer.text = "mine".into();
        client.post();
        settle(&mut client, &ctx);

        let mut tweet = client.timeline().feed()[0].clone();
        tweet.user_id = "someone-else".into();
        client.delete(&tweet);
        settle(&mut client, &ctx);
        assert_eq!(client.notice(), Some("Only the author can delete this tweet"));
        assert_eq!(client.timeline().feed().len(), 1);
    }
}
