//! Request and response types for the HTTP API.
//!
//! Form types decode every field as optional so that transport decoding
//! cannot reject a request ahead of the gate; `validate()` is the gate's
//! schema stage and reports the first offending field.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::rating::RatingCard;
use crate::store::PostRecord;

/// Accepts `local@domain` with non-empty, whitespace-free parts.
fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !email.chars().any(char::is_whitespace)
                && !domain.contains('@')
        }
        None => false,
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::invalid_input(field, "is required")),
    }
}

fn none_if_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Raw registration form.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RegisterForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "turnstileToken")]
    pub turnstile_token: Option<String>,
}

/// Shape-validated registration input.
#[derive(Debug)]
pub struct RegisterInput {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(self) -> Result<RegisterInput, ApiError> {
        let email = required(self.email, "email")?;
        if !is_valid_email(email.trim()) {
            return Err(ApiError::invalid_input("email", "must be a valid address"));
        }
        let password = required(self.password, "password")?;
        if password.chars().count() < 8 {
            return Err(ApiError::invalid_input(
                "password",
                "must be at least 8 characters",
            ));
        }
        Ok(RegisterInput {
            name: none_if_blank(self.name),
            email,
            password,
        })
    }
}

// ---------------------------------------------------------------------------
// Newsletter
// ---------------------------------------------------------------------------

/// Raw newsletter subscription form.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SubscribeForm {
    pub email: Option<String>,
    #[serde(rename = "turnstileToken")]
    pub turnstile_token: Option<String>,
}

impl SubscribeForm {
    pub fn validate(self) -> Result<String, ApiError> {
        let email = required(self.email, "email")?;
        if !is_valid_email(email.trim()) {
            return Err(ApiError::invalid_input("email", "must be a valid address"));
        }
        Ok(email)
    }
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// Raw post creation form.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreatePostForm {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    /// Comma-separated tag names.
    pub tags: Option<String>,
    #[serde(rename = "contentMd")]
    pub content_md: Option<String>,
    /// Checkbox-style value: "on", "true", or "1".
    pub published: Option<String>,
}

#[derive(Debug)]
pub struct CreatePostInput {
    pub title: String,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub tags: Vec<String>,
    pub content_md: String,
    pub published: bool,
}

impl CreatePostForm {
    pub fn validate(self) -> Result<CreatePostInput, ApiError> {
        let title = required(self.title, "title")?.trim().to_string();
        if !(3..=200).contains(&title.chars().count()) {
            return Err(ApiError::invalid_input(
                "title",
                "must be between 3 and 200 characters",
            ));
        }

        let slug = none_if_blank(self.slug);
        if let Some(slug) = &slug {
            let well_formed = !slug.is_empty()
                && slug
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
            if !well_formed {
                return Err(ApiError::invalid_input(
                    "slug",
                    "may only contain lowercase letters, digits, and hyphens",
                ));
            }
        }

        let content_md = required(self.content_md, "contentMd")?;

        let tags = self
            .tags
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();

        let published = matches!(
            self.published.as_deref().map(str::trim),
            Some("on" | "true" | "1")
        );

        Ok(CreatePostInput {
            title,
            slug,
            excerpt: none_if_blank(self.excerpt),
            tags,
            content_md,
            published,
        })
    }
}

/// Created-post summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct PostResponse {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub published: bool,
}

impl From<&PostRecord> for PostResponse {
    fn from(post: &PostRecord) -> Self {
        Self {
            id: post.id.clone(),
            slug: post.slug.clone(),
            title: post.title.clone(),
            published: post.published,
        }
    }
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

/// Raw rating submission form. Axis fields arrive as strings from the form
/// encoding and are parsed during validation.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RatingForm {
    #[serde(rename = "gameId")]
    pub game_id: Option<String>,
    pub gameplay: Option<String>,
    pub immersion: Option<String>,
    pub fun: Option<String>,
    pub story: Option<String>,
    pub graphics: Option<String>,
    pub sound: Option<String>,
    pub replay: Option<String>,
}

fn parse_axis(value: Option<String>, field: &'static str) -> Result<u8, ApiError> {
    let raw = required(value, field)?;
    raw.trim()
        .parse::<u8>()
        .map_err(|_| ApiError::invalid_input(field, "must be an integer"))
}

impl RatingForm {
    pub fn validate(self) -> Result<(String, RatingCard), ApiError> {
        let game_id = required(self.game_id, "gameId")?;
        let card = RatingCard {
            gameplay: parse_axis(self.gameplay, "gameplay")?,
            immersion: parse_axis(self.immersion, "immersion")?,
            fun: parse_axis(self.fun, "fun")?,
            story: parse_axis(self.story, "story")?,
            graphics: parse_axis(self.graphics, "graphics")?,
            sound: parse_axis(self.sound, "sound")?,
            replay: parse_axis(self.replay, "replay")?,
        };
        card.validate()?;
        Ok((game_id, card))
    }
}

/// Stored rating summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct RatingResponse {
    pub game_id: String,
    pub average: f64,
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// Health report.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub users: usize,
    pub subscribers: usize,
    pub posts: usize,
    pub active_sessions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("a@b"));
        assert!(!is_valid_email("plain"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@"));
        assert!(!is_valid_email("a b@c.com"));
    }

    #[test]
    fn test_register_validation() {
        let ok = RegisterForm {
            name: Some("  ".into()),
            email: Some("player@example.com".into()),
            password: Some("longenough".into()),
            turnstile_token: None,
        }
        .validate()
        .unwrap();
        assert_eq!(ok.email, "player@example.com");
        assert!(ok.name.is_none(), "blank name should become None");

        let err = RegisterForm {
            email: Some("player@example.com".into()),
            password: Some("short".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        match err {
            ApiError::InvalidInput { field, .. } => assert_eq!(field, "password"),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = RegisterForm::default().validate().unwrap_err();
        match err {
            ApiError::InvalidInput { field, .. } => assert_eq!(field, "email"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_post_validation() {
        let input = CreatePostForm {
            title: Some("My First Review".into()),
            tags: Some("rpg, , indie".into()),
            content_md: Some("# heading".into()),
            published: Some("on".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(input.tags, vec!["rpg".to_string(), "indie".to_string()]);
        assert!(input.published);
        assert!(input.slug.is_none());

        let err = CreatePostForm {
            title: Some("ok title".into()),
            slug: Some("Bad Slug!".into()),
            content_md: Some("body".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        match err {
            ApiError::InvalidInput { field, .. } => assert_eq!(field, "slug"),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = CreatePostForm {
            title: Some("no".into()),
            content_md: Some("body".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        match err {
            ApiError::InvalidInput { field, .. } => assert_eq!(field, "title"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rating_validation() {
        let form = RatingForm {
            game_id: Some("g1".into()),
            gameplay: Some("5".into()),
            immersion: Some("4".into()),
            fun: Some("5".into()),
            story: Some("3".into()),
            graphics: Some("4".into()),
            sound: Some("5".into()),
            replay: Some("2".into()),
        };
        let (game_id, card) = form.validate().unwrap();
        assert_eq!(game_id, "g1");
        assert_eq!(card.gameplay, 5);

        let err = RatingForm {
            game_id: Some("g1".into()),
            gameplay: Some("five".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        match err {
            ApiError::InvalidInput { field, .. } => assert_eq!(field, "gameplay"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
