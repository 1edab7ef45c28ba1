//! In-memory [`Store`] with the same constraint behaviour as the PostgreSQL
//! schema: unique emails, foreign keys on tweets and follow edges, and the
//! follow list as a set.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use minitter_shared::errors::{StoreError, StoreResult};

use crate::models::{FollowEdge, NewTweet, NewUser, Tweet, User};

use super::Store;

struct StoredUser {
    user: User,
    hashed_password: String,
}

#[derive(Default)]
struct Inner {
    last_user_id: i64,
    last_tweet_id: i64,
    users: BTreeMap<i64, StoredUser>,
    tweets: Vec<Tweet>,
    follows: BTreeSet<FollowEdge>,
}

impl Inner {
    fn require_user(&self, user_id: i64, constraint: &str) -> StoreResult<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(StoreError::ForeignKeyViolation(constraint.to_string()))
        }
    }
}

pub struct MemoryStore {
    inner: RwLock<Inner>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulates losing (or regaining) the database. While unavailable every
    /// operation fails with [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Tweets written by `user_id`, oldest first.
    pub fn tweets_by(&self, user_id: i64) -> StoreResult<Vec<Tweet>> {
        let inner = self.read()?;
        Ok(inner.tweets.iter().filter(|t| t.user_id == user_id).cloned().collect())
    }

    /// Ids of the users `user_id` follows.
    pub fn following(&self, user_id: i64) -> StoreResult<Vec<i64>> {
        let inner = self.read()?;
        Ok(inner
            .follows
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.follow_user_id)
            .collect())
    }

    pub fn hashed_password(&self, user_id: i64) -> StoreResult<Option<String>> {
        let inner = self.read()?;
        Ok(inner.users.get(&user_id).map(|u| u.hashed_password.clone()))
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store marked unavailable".into()))
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.check_available()?;
        self.inner
            .read()
            .map_err(|_| StoreError::Internal("memory store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.check_available()?;
        self.inner
            .write()
            .map_err(|_| StoreError::Internal("memory store lock poisoned".into()))
    }
}

impl Store for MemoryStore {
    fn create_user(&self, user: &NewUser) -> StoreResult<i64> {
        let mut inner = self.write()?;

        // Mirrors the unique index on lower(email).
        let email = user.email.to_lowercase();
        if inner.users.values().any(|u| u.user.email.to_lowercase() == email) {
            return Err(StoreError::UniqueViolation("users_email_lower_key".into()));
        }

        inner.last_user_id += 1;
        let id = inner.last_user_id;
        inner.users.insert(
            id,
            StoredUser {
                user: User {
                    id,
                    name: user.name.clone(),
                    email: user.email.clone(),
                    profile: user.profile.clone(),
                },
                hashed_password: user.hashed_password.clone(),
            },
        );
        Ok(id)
    }

    fn get_user(&self, user_id: i64) -> StoreResult<Option<User>> {
        let inner = self.read()?;
        Ok(inner.users.get(&user_id).map(|u| u.user.clone()))
    }

    fn create_tweet(&self, tweet: &NewTweet) -> StoreResult<usize> {
        let mut inner = self.write()?;
        inner.require_user(tweet.user_id, "tweets_user_id_fkey")?;

        inner.last_tweet_id += 1;
        let id = inner.last_tweet_id;
        inner.tweets.push(Tweet {
            id,
            user_id: tweet.user_id,
            tweet: tweet.tweet.clone(),
            created_at: Utc::now(),
        });
        Ok(1)
    }

    fn create_follow(&self, edge: &FollowEdge) -> StoreResult<usize> {
        let mut inner = self.write()?;
        inner.require_user(edge.user_id, "users_follow_list_user_id_fkey")?;
        inner.require_user(edge.follow_user_id, "users_follow_list_follow_user_id_fkey")?;

        Ok(usize::from(inner.follows.insert(*edge)))
    }

    fn remove_follow(&self, edge: &FollowEdge) -> StoreResult<usize> {
        let mut inner = self.write()?;
        Ok(usize::from(inner.follows.remove(edge)))
    }

    fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "a".into(),
            email: email.into(),
            profile: "hi".into(),
            hashed_password: "hash".into(),
        }
    }

    #[test]
    fn ids_are_sequential_from_one() {
        let store = MemoryStore::new();
        assert_eq!(store.create_user(&new_user("a@x.com")).unwrap(), 1);
        assert_eq!(store.create_user(&new_user("b@x.com")).unwrap(), 2);
    }

    #[test]
    fn get_user_returns_public_fields() {
        let store = MemoryStore::new();
        let id = store.create_user(&new_user("a@x.com")).unwrap();

        let user = store.get_user(id).unwrap().unwrap();
        assert_eq!(
            user,
            User { id, name: "a".into(), email: "a@x.com".into(), profile: "hi".into() }
        );
        assert_eq!(store.hashed_password(id).unwrap().as_deref(), Some("hash"));
    }

    #[test]
    fn missing_user_is_none() {
        let store = MemoryStore::new();
        assert!(store.get_user(42).unwrap().is_none());
    }

    #[test]
    fn duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.create_user(&new_user("a@x.com")).unwrap();
        let err = store.create_user(&new_user("a@x.com")).unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
    }

    #[test]
    fn email_uniqueness_ignores_case_but_keeps_spelling() {
        let store = MemoryStore::new();
        let id = store.create_user(&new_user("Alice@X.com")).unwrap();
        assert_eq!(store.get_user(id).unwrap().unwrap().email, "Alice@X.com");

        let err = store.create_user(&new_user("alice@x.COM")).unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
    }

    #[test]
    fn tweet_requires_existing_user() {
        let store = MemoryStore::new();
        let err = store
            .create_tweet(&NewTweet { user_id: 7, tweet: "hello".into() })
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(_)));
        assert!(store.tweets_by(7).unwrap().is_empty());
    }

    #[test]
    fn follow_is_idempotent_and_unfollow_is_a_no_op_when_absent() {
        let store = MemoryStore::new();
        let a = store.create_user(&new_user("a@x.com")).unwrap();
        let b = store.create_user(&new_user("b@x.com")).unwrap();
        let edge = FollowEdge { user_id: a, follow_user_id: b };

        assert_eq!(store.remove_follow(&edge).unwrap(), 0);
        assert_eq!(store.create_follow(&edge).unwrap(), 1);
        assert_eq!(store.create_follow(&edge).unwrap(), 0);
        assert_eq!(store.following(a).unwrap(), vec![b]);
        assert_eq!(store.remove_follow(&edge).unwrap(), 1);
        assert!(store.following(a).unwrap().is_empty());
    }

    #[test]
    fn follow_requires_both_users() {
        let store = MemoryStore::new();
        let a = store.create_user(&new_user("a@x.com")).unwrap();
        let err = store
            .create_follow(&FollowEdge { user_id: a, follow_user_id: 99 })
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(_)));
    }

    #[test]
    fn unavailable_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_available(false);
        assert!(matches!(store.ping(), Err(StoreError::Unavailable(_))));
        assert!(matches!(
            store.create_user(&new_user("a@x.com")),
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(store.following(1), Err(StoreError::Unavailable(_))));

        store.set_available(true);
        assert!(store.ping().is_ok());
    }
}
