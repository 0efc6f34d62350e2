//! In-memory community store: users, newsletter subscribers, posts, ratings.
//!
//! The write target behind the request gate. Uniqueness checks and their
//! inserts are atomic: map-entry guards for users and subscribers, a single
//! write lock around the slug probe for posts.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::ApiError;
use crate::perm::Role;
use crate::rating::RatingCard;
use crate::slug::slugify;

/// Probe ceiling for slug uniquification.
const MAX_SLUG_PROBES: u32 = 5000;

/// A registered user.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub password_digest: String,
    pub role: Role,
}

/// A published or draft post.
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content_md: String,
    pub tags: Vec<String>,
    pub published: bool,
    pub author_id: String,
}

/// One user's stored rating for one game.
#[derive(Debug, Clone, Copy)]
pub struct StoredRating {
    pub card: RatingCard,
    pub average: f64,
}

#[derive(Default)]
struct PostsInner {
    by_slug: HashMap<String, Arc<PostRecord>>,
}

/// Process-wide community state, injected through `AppState`.
#[derive(Default)]
pub struct CommunityStore {
    users_by_email: DashMap<String, Arc<UserRecord>>,
    users_by_id: DashMap<String, Arc<UserRecord>>,
    subscribers: DashSet<String>,
    posts: RwLock<PostsInner>,
    ratings: DashMap<(String, String), StoredRating>,
}

/// Canonical form used for uniqueness: trimmed, lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn digest_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl CommunityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user. The email is normalized before the uniqueness
    /// check; a duplicate is a Conflict.
    pub fn register_user(
        &self,
        email: &str,
        name: Option<String>,
        password: &str,
    ) -> Result<Arc<UserRecord>, ApiError> {
        let email = normalize_email(email);

        // The vacant-entry guard makes check-and-insert atomic per email.
        let entry = match self.users_by_email.entry(email.clone()) {
            Entry::Occupied(_) => {
                return Err(ApiError::conflict("Email already used"));
            }
            Entry::Vacant(vacant) => vacant,
        };

        let record = Arc::new(UserRecord {
            id: Uuid::new_v4().to_string(),
            email,
            name,
            password_digest: digest_password(password),
            role: Role::User,
        });
        entry.insert(Arc::clone(&record));
        self.users_by_id
            .insert(record.id.clone(), Arc::clone(&record));
        Ok(record)
    }

    pub fn user_by_id(&self, id: &str) -> Option<Arc<UserRecord>> {
        self.users_by_id.get(id).map(|e| Arc::clone(e.value()))
    }

    pub fn user_by_email(&self, email: &str) -> Option<Arc<UserRecord>> {
        self.users_by_email
            .get(&normalize_email(email))
            .map(|e| Arc::clone(e.value()))
    }

    /// Promotes (or demotes) a user. Used by the moderation tooling and
    /// by tests needing a publishing-capable author.
    pub fn set_role(&self, id: &str, role: Role) -> Option<Arc<UserRecord>> {
        let current = self.users_by_id.get(id)?;
        let updated = Arc::new(UserRecord {
            role,
            ..(**current.value()).clone()
        });
        drop(current);
        self.users_by_id.insert(id.to_string(), Arc::clone(&updated));
        self.users_by_email
            .insert(updated.email.clone(), Arc::clone(&updated));
        Some(updated)
    }

    /// Adds a newsletter subscriber; a duplicate is a Conflict.
    pub fn subscribe(&self, email: &str) -> Result<(), ApiError> {
        if self.subscribers.insert(normalize_email(email)) {
            Ok(())
        } else {
            Err(ApiError::conflict("Email already subscribed"))
        }
    }

    /// Creates a post with a uniquified slug.
    ///
    /// The requested slug (explicit, or derived from the title) is probed
    /// linearly: `base`, `base-2`, `base-3`, ... The probe and the insert run
    /// under one write lock so concurrent writers cannot claim the same slug.
    pub fn create_post(
        &self,
        author_id: &str,
        title: &str,
        requested_slug: Option<&str>,
        excerpt: Option<String>,
        content_md: String,
        tags: Vec<String>,
        published: bool,
    ) -> Result<Arc<PostRecord>, ApiError> {
        let base = match requested_slug {
            Some(s) => slugify(s),
            None => slugify(title),
        };
        let base = if base.is_empty() {
            "post".to_string()
        } else {
            base
        };

        let mut posts = self.posts.write();
        let slug = unique_slug(&posts.by_slug, &base)?;

        let record = Arc::new(PostRecord {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            slug: slug.clone(),
            excerpt,
            content_md,
            tags,
            published,
            author_id: author_id.to_string(),
        });
        posts.by_slug.insert(slug, Arc::clone(&record));
        Ok(record)
    }

    pub fn post_by_slug(&self, slug: &str) -> Option<Arc<PostRecord>> {
        self.posts.read().by_slug.get(slug).map(Arc::clone)
    }

    /// Inserts or replaces a user's rating for a game. Returns the stored
    /// record with its aggregate.
    pub fn upsert_rating(&self, user_id: &str, game_id: &str, card: RatingCard) -> StoredRating {
        let stored = StoredRating {
            card,
            average: card.average(),
        };
        self.ratings
            .insert((user_id.to_string(), game_id.to_string()), stored);
        stored
    }

    pub fn rating_for(&self, user_id: &str, game_id: &str) -> Option<StoredRating> {
        self.ratings
            .get(&(user_id.to_string(), game_id.to_string()))
            .map(|e| *e.value())
    }

    pub fn user_count(&self) -> usize {
        self.users_by_id.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn post_count(&self) -> usize {
        self.posts.read().by_slug.len()
    }

    pub fn rating_count(&self) -> usize {
        self.ratings.len()
    }
}

/// Linear probe over the slug namespace: `base`, then `base-2`, `base-3`, ...
fn unique_slug(
    taken: &HashMap<String, Arc<PostRecord>>,
    base: &str,
) -> Result<String, ApiError> {
    if !taken.contains_key(base) {
        return Ok(base.to_string());
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken.contains_key(&candidate) {
            return Ok(candidate);
        }
        n += 1;
        if n > MAX_SLUG_PROBES {
            return Err(ApiError::conflict("Could not generate a unique slug"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_normalizes_and_rejects_duplicates() {
        let store = CommunityStore::new();
        let user = store
            .register_user("  Player@Example.COM ", Some("Player".into()), "hunter2hunter2")
            .unwrap();
        assert_eq!(user.email, "player@example.com");
        assert_eq!(user.role, Role::User);

        // Same address modulo case/whitespace
        let err = store
            .register_user("player@example.com", None, "otherpassword")
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn test_password_digest_is_stable_and_distinct() {
        assert_eq!(digest_password("secret123"), digest_password("secret123"));
        assert_ne!(digest_password("secret123"), digest_password("secret124"));
        // hex sha-256
        assert_eq!(digest_password("x").len(), 64);
    }

    #[test]
    fn test_subscribe_duplicate_conflicts() {
        let store = CommunityStore::new();
        store.subscribe("News@Example.com").unwrap();
        let err = store.subscribe(" news@example.com ").unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn test_slug_probe_sequence() {
        let store = CommunityStore::new();
        let mk = |slug: Option<&str>| {
            store
                .create_post("author", "My Post", slug, None, "body".into(), vec![], true)
                .unwrap()
        };
        assert_eq!(mk(None).slug, "my-post");
        assert_eq!(mk(None).slug, "my-post-2");
        assert_eq!(mk(None).slug, "my-post-3");
        // Explicit slug probes the same namespace
        assert_eq!(mk(Some("my-post")).slug, "my-post-4");
        assert!(store.post_by_slug("my-post-2").is_some());
    }

    #[test]
    fn test_empty_title_falls_back_to_post() {
        let store = CommunityStore::new();
        let post = store
            .create_post("author", "!!!", None, None, "body".into(), vec![], false)
            .unwrap();
        assert_eq!(post.slug, "post");
    }

    #[test]
    fn test_rating_upsert_replaces() {
        let store = CommunityStore::new();
        let first = RatingCard {
            gameplay: 5,
            immersion: 4,
            fun: 5,
            story: 3,
            graphics: 4,
            sound: 5,
            replay: 2,
        };
        store.upsert_rating("u1", "g1", first);

        let second = RatingCard {
            gameplay: 1,
            immersion: 1,
            fun: 1,
            story: 1,
            graphics: 1,
            sound: 1,
            replay: 1,
        };
        store.upsert_rating("u1", "g1", second);

        let stored = store.rating_for("u1", "g1").unwrap();
        assert!((stored.average - 1.0).abs() < f64::EPSILON);
        assert_eq!(store.rating_count(), 1);
    }

    #[test]
    fn test_set_role_updates_both_indexes() {
        let store = CommunityStore::new();
        let user = store
            .register_user("mod@example.com", None, "longenoughpw")
            .unwrap();
        store.set_role(&user.id, Role::Mod).unwrap();
        assert_eq!(store.user_by_id(&user.id).unwrap().role, Role::Mod);
        assert_eq!(store.user_by_email("mod@example.com").unwrap().role, Role::Mod);
    }
}
