use futures::FutureExt as _;
use futures::future::{self, BoxFuture};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("That email address is not valid")]
    InvalidEmail,

    #[error("Password should be at least 6 characters")]
    WeakPassword,

    #[error("That email address is already in use")]
    EmailInUse,

    #[error("Wrong email or password")]
    WrongCredentials,

    #[error("You need to log in first")]
    NotSignedIn,

    #[error("Authentication service unavailable: {0}")]
    Unavailable(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Identity of the signed-in account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl User {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            email: None,
            photo_url: None,
        }
    }

    /// Name shown on tweets; blank names count as missing
    pub fn name_or_anonymous(&self) -> &str {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(ANONYMOUS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OAuthProvider {
    GitHub,
}

impl OAuthProvider {
    pub fn label(&self) -> &'static str {
        match self {
            Self::GitHub => "Continue with GitHub",
        }
    }
}

/// Fields to change on the current profile; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl ProfileUpdate {
    pub fn photo(url: impl Into<String>) -> Self {
        Self {
            photo_url: Some(url.into()),
            ..Default::default()
        }
    }
}

/// Checks credentials before any request goes out
pub fn validate_credentials(email: &str, password: &str) -> AuthResult<()> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    let valid_email = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'));
    if !valid_email {
        return Err(AuthError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

/// Account management as the client sees it
pub trait AuthService: Send + Sync {
    fn current_user(&self) -> Option<User>;

    fn create_account(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> BoxFuture<'static, AuthResult<User>>;

    fn sign_in(&self, email: &str, password: &str) -> BoxFuture<'static, AuthResult<User>>;

    fn sign_in_with(&self, provider: OAuthProvider) -> BoxFuture<'static, AuthResult<User>>;

    fn sign_out(&self);

    fn update_profile(&self, update: ProfileUpdate) -> BoxFuture<'static, AuthResult<User>>;
}

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct AuthInner {
    accounts: HashMap<String, Account>,
    current: Option<String>,
    offline: bool,
}

impl AuthInner {
    fn check_online(&self) -> AuthResult<()> {
        if self.offline {
            return Err(AuthError::Unavailable("auth service is offline".into()));
        }
        Ok(())
    }

    fn sign_in_as(&mut self, email: &str) -> Option<User> {
        let user = self.accounts.get(email)?.user.clone();
        self.current = Some(email.to_owned());
        log::info!("Signed in as {}", user.uid);
        Some(user)
    }
}

/// In-process account registry
#[derive(Clone, Default)]
pub struct MemoryAuth {
    inner: Arc<Mutex<AuthInner>>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().offline = offline;
    }

    fn register(inner: &mut AuthInner, name: Option<&str>, email: &str, password: &str) -> User {
        let user = User {
            uid: Uuid::new_v4().simple().to_string(),
            display_name: name.map(str::to_owned),
            email: Some(email.to_owned()),
            photo_url: None,
        };
        inner.accounts.insert(
            email.to_owned(),
            Account {
                user: user.clone(),
                password: password.to_owned(),
            },
        );
        user
    }
}

impl AuthService for MemoryAuth {
    fn current_user(&self) -> Option<User> {
        let inner = self.inner.lock();
        let email = inner.current.as_ref()?;
        inner.accounts.get(email).map(|account| account.user.clone())
    }

    fn create_account(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> BoxFuture<'static, AuthResult<User>> {
        let email = email.trim();
        let result = validate_credentials(email, password).and_then(|()| {
            let mut inner = self.inner.lock();
            inner.check_online()?;
            if inner.accounts.contains_key(email) {
                return Err(AuthError::EmailInUse);
            }
            let name = Some(name.trim()).filter(|name| !name.is_empty());
            Self::register(&mut inner, name, email, password);
            inner.sign_in_as(email).ok_or(AuthError::WrongCredentials)
        });
        future::ready(result).boxed()
    }

    fn sign_in(&self, email: &str, password: &str) -> BoxFuture<'static, AuthResult<User>> {
        let email = email.trim();
        let result = if email.is_empty() || password.is_empty() {
            Err(AuthError::MissingCredentials)
        } else {
            let mut inner = self.inner.lock();
            inner.check_online().and_then(|()| {
                let matches = inner
                    .accounts
                    .get(email)
                    .is_some_and(|account| account.password == password);
                if !matches {
                    return Err(AuthError::WrongCredentials);
                }
                inner.sign_in_as(email).ok_or(AuthError::WrongCredentials)
            })
        };
        future::ready(result).boxed()
    }

    fn sign_in_with(&self, provider: OAuthProvider) -> BoxFuture<'static, AuthResult<User>> {
        let mut inner = self.inner.lock();
        let result = inner.check_online().and_then(|()| {
            let email = match provider {
                OAuthProvider::GitHub => "octocat@users.noreply.github.com",
            };
            if !inner.accounts.contains_key(email) {
                Self::register(&mut inner, Some("octocat"), email, "");
            }
            inner.sign_in_as(email).ok_or(AuthError::WrongCredentials)
        });
        future::ready(result).boxed()
    }

    fn sign_out(&self) {
        if self.inner.lock().current.take().is_some() {
            log::info!("Signed out");
        }
    }

    fn update_profile(&self, update: ProfileUpdate) -> BoxFuture<'static, AuthResult<User>> {
        let mut inner = self.inner.lock();
        let result = inner.check_online().and_then(|()| {
            let email = inner.current.clone().ok_or(AuthError::NotSignedIn)?;
            let account = inner
                .accounts
                .get_mut(&email)
                .ok_or(AuthError::NotSignedIn)?;
            if let Some(name) = update.display_name {
                account.user.display_name = Some(name);
            }
            if let Some(url) = update.photo_url {
                account.user.photo_url = Some(url);
            }
            Ok(account.user.clone())
        });
        future::ready(result).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_validate_credentials() {
        assert_eq!(validate_credentials("", "secret"), Err(AuthError::MissingCredentials));
        assert_eq!(validate_credentials("me@x.io", ""), Err(AuthError::MissingCredentials));
        assert_eq!(validate_credentials("not-an-email", "secret"), Err(AuthError::InvalidEmail));
        assert_eq!(validate_credentials("me@x.io", "123"), Err(AuthError::WeakPassword));
        assert_eq!(validate_credentials(" me@x.io ", "secret"), Ok(()));
    }

    #[test]
    fn test_name_or_anonymous() {
        let mut user = User::new("u1");
        assert_eq!(user.name_or_anonymous(), "Anonymous");
        user.display_name = Some("  ".into());
        assert_eq!(user.name_or_anonymous(), "Anonymous");
        user.display_name = Some("Ada".into());
        assert_eq!(user.name_or_anonymous(), "Ada");
    }

    #[test]
    fn test_create_sign_out_sign_in() {
        let auth = MemoryAuth::new();
        let created = block_on(auth.create_account("Ada", "ada@example.com", "hunter22")).unwrap();
        assert_eq!(auth.current_user(), Some(created.clone()));

        assert_eq!(
            block_on(auth.create_account("Other", "ada@example.com", "hunter22")),
            Err(AuthError::EmailInUse)
        );

        auth.sign_out();
        assert_eq!(auth.current_user(), None);
        assert_eq!(
            block_on(auth.sign_in("ada@example.com", "wrong")),
            Err(AuthError::WrongCredentials)
        );
        let signed_in = block_on(auth.sign_in("ada@example.com", "hunter22")).unwrap();
        assert_eq!(signed_in.uid, created.uid);
    }

    #[test]
    fn test_update_profile_requires_session() {
        let auth = MemoryAuth::new();
        assert_eq!(
            block_on(auth.update_profile(ProfileUpdate::photo("data:image/jpeg;base64,AA"))),
            Err(AuthError::NotSignedIn)
        );

        block_on(auth.sign_in_with(OAuthProvider::GitHub)).unwrap();
        let updated = block_on(auth.update_profile(ProfileUpdate::photo("data:x"))).unwrap();
        assert_eq!(updated.photo_url.as_deref(), Some("data:x"));
        assert_eq!(auth.current_user().and_then(|u| u.photo_url), Some("data:x".into()));
    }
}
