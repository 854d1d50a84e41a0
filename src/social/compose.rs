use base64::Engine as _;
use futures::FutureExt as _;
use futures::future::BoxFuture;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView as _, imageops::FilterType};
use std::sync::Arc;
use thiserror::Error;

use super::SocialError;
use super::auth::{AuthService, ProfileUpdate, User};
use super::store::TweetStore;
use super::tweet::{NewTweet, Tweet};

pub const MAX_TWEET_CHARS: usize = 180;
/// Limit on the picked file before any processing
pub const MAX_PHOTO_FILE_BYTES: usize = 10 * 1024 * 1024;
pub const MAX_PHOTO_DIMENSION: u32 = 600;
pub const PHOTO_JPEG_QUALITY: u8 = 60;
/// Limit on the decoded size of the compressed photo
pub const MAX_PHOTO_BYTES: usize = 500 * 1024;
pub const SUCCESS_MESSAGE_SECS: f64 = 2.0;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error("You need to log in to tweet")]
    NotSignedIn,

    #[error("A tweet is already being posted")]
    Busy,

    #[error("Write something first")]
    Empty,

    #[error("Tweets are limited to 180 characters, this one has {0}")]
    TooLong(usize),

    #[error("The file is too large ({0} bytes), pick one under 10 MB")]
    FileTooLarge(usize),

    #[error("The compressed photo is still too large ({0} bytes)")]
    PhotoTooLarge(usize),

    #[error("Could not read the photo: {0}")]
    InvalidPhoto(String),
}

/// Returns the trimmed text that will be posted
pub fn validate_text(text: &str) -> Result<&str, ComposeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ComposeError::Empty);
    }
    let len = text.chars().count();
    if len > MAX_TWEET_CHARS {
        return Err(ComposeError::TooLong(len));
    }
    Ok(trimmed)
}

/// Shrinks a picked photo into a JPEG `data:` URL small enough to embed in a document.
///
/// Images larger than [`MAX_PHOTO_DIMENSION`] on either side are scaled to
/// fit; smaller ones keep their size.
pub fn compress_photo(bytes: &[u8]) -> Result<String, ComposeError> {
    if bytes.len() > MAX_PHOTO_FILE_BYTES {
        return Err(ComposeError::FileTooLarge(bytes.len()));
    }
    let invalid = |err: image::ImageError| ComposeError::InvalidPhoto(err.to_string());
    let decoded = image::load_from_memory(bytes).map_err(invalid)?;

    let (width, height) = decoded.dimensions();
    let fitted = if width > MAX_PHOTO_DIMENSION || height > MAX_PHOTO_DIMENSION {
        decoded.resize(MAX_PHOTO_DIMENSION, MAX_PHOTO_DIMENSION, FilterType::Triangle)
    } else {
        decoded
    };

    let mut jpeg = Vec::new();
    DynamicImage::ImageRgb8(fitted.to_rgb8())
        .write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, PHOTO_JPEG_QUALITY))
        .map_err(invalid)?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(&jpeg);
    let estimated = encoded.len() * 3 / 4;
    if estimated > MAX_PHOTO_BYTES {
        return Err(ComposeError::PhotoTooLarge(estimated));
    }
    log::debug!("Compressed photo from {} to {} bytes", bytes.len(), jpeg.len());
    Ok(format!("data:image/jpeg;base64,{encoded}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedPhoto {
    pub name: String,
    pub data_url: String,
}

/// State of the "what's happening" box
#[derive(Debug, Default)]
pub struct Composer {
    pub text: String,
    photo: Option<AttachedPhoto>,
    posting: bool,
    success_until: Option<f64>,
    error: Option<String>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn photo(&self) -> Option<&AttachedPhoto> {
        self.photo.as_ref()
    }

    pub fn is_posting(&self) -> bool {
        self.posting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn remaining_chars(&self) -> isize {
        MAX_TWEET_CHARS as isize - self.text.chars().count() as isize
    }

    /// Compresses and attaches a photo, replacing any previous one
    pub fn attach_photo(&mut self, name: impl Into<String>, bytes: &[u8]) -> Result<(), ComposeError> {
        match compress_photo(bytes) {
            Ok(data_url) => {
                self.photo = Some(AttachedPhoto {
                    name: name.into(),
                    data_url,
                });
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn clear_photo(&mut self) {
        self.photo = None;
    }

    /// Validates the draft and builds the document to write
    pub fn prepare(&self, user: Option<&User>, now_ms: i64) -> Result<NewTweet, ComposeError> {
        let user = user.ok_or(ComposeError::NotSignedIn)?;
        if self.posting {
            return Err(ComposeError::Busy);
        }
        let text = validate_text(&self.text)?;
        Ok(NewTweet {
            tweet: text.to_owned(),
            created_at: now_ms,
            username: user.name_or_anonymous().to_owned(),
            user_id: user.uid.clone(),
            photo: self.photo.as_ref().map(|photo| photo.data_url.clone()),
        })
    }

    /// Starts posting the draft.
    ///
    /// The returned future writes the document and then, if a photo was
    /// attached, makes it the author's profile photo. Hand its output to
    /// [`Composer::finish`].
    pub fn submit(
        &mut self,
        user: Option<&User>,
        store: &Arc<dyn TweetStore>,
        auth: &Arc<dyn AuthService>,
        now_ms: i64,
    ) -> Result<BoxFuture<'static, Result<Tweet, SocialError>>, ComposeError> {
        let new_tweet = match self.prepare(user, now_ms) {
            Ok(new_tweet) => new_tweet,
            Err(err) => {
                self.error = Some(err.to_string());
                return Err(err);
            }
        };
        self.posting = true;
        self.error = None;

        let store = Arc::clone(store);
        let auth = Arc::clone(auth);
        Ok(async move {
            let photo = new_tweet.photo.clone();
            let tweet = store.add(new_tweet).await?;
            if let Some(url) = photo {
                auth.update_profile(ProfileUpdate::photo(url)).await?;
            }
            Ok(tweet)
        }
        .boxed())
    }

    /// Applies the outcome of [`Composer::submit`]
    pub fn finish(&mut self, result: &Result<Tweet, SocialError>, now_secs: f64) {
        self.posting = false;
        match result {
            Ok(tweet) => {
                log::info!("Posted tweet {}", tweet.id);
                self.text.clear();
                self.photo = None;
                self.error = None;
                self.success_until = Some(now_secs + SUCCESS_MESSAGE_SECS);
            }
            Err(err) => {
                log::error!("Posting failed: {err}");
                self.error = Some(err.to_string());
            }
        }
    }

    /// The confirmation shown for a short while after a post succeeds
    pub fn success_message(&mut self, now_secs: f64) -> Option<&'static str> {
        match self.success_until {
            Some(until) if now_secs < until => Some("Your tweet was posted!"),
            Some(_) => {
                self.success_until = None;
                None
            }
            None => None,
        }
    }
}
