//! Data-access layer.
//!
//! Every [`Store`] method is exactly one statement against the backing store
//! and is blocking; handlers run it through [`blocking`] so the async runtime
//! is never stalled on a database round trip.
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`PgStore`] | Production; PostgreSQL through a diesel r2d2 pool |
//! | [`MemoryStore`] | Tests and local runs without a database |

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use minitter_shared::errors::{StoreError, StoreResult};

use crate::models::{FollowEdge, NewTweet, NewUser, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub trait Store: Send + Sync {
    /// Inserts a user and returns the generated id.
    ///
    /// Fails with [`StoreError::UniqueViolation`] when the email is taken.
    fn create_user(&self, user: &NewUser) -> StoreResult<i64>;

    /// Public fields of the user, or `None` when no row matches.
    fn get_user(&self, user_id: i64) -> StoreResult<Option<User>>;

    /// Inserts a tweet. Returns the number of rows written (1).
    ///
    /// Fails with [`StoreError::ForeignKeyViolation`] for an unknown user.
    fn create_tweet(&self, tweet: &NewTweet) -> StoreResult<usize>;

    /// Adds the edge if absent. Returns 1 for a new edge, 0 if it already
    /// existed.
    fn create_follow(&self, edge: &FollowEdge) -> StoreResult<usize>;

    /// Deletes the edge. Returns 0 when there was nothing to delete.
    fn remove_follow(&self, edge: &FollowEdge) -> StoreResult<usize>;

    /// One round trip to the store, for health checks.
    fn ping(&self) -> StoreResult<()>;
}

/// Runs one store call on tokio's blocking pool.
pub async fn blocking<T, F>(store: Arc<dyn Store>, op: F) -> StoreResult<T>
where
    F: FnOnce(&dyn Store) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .map_err(|e| StoreError::Internal(format!("store task failed: {e}")))?
}
