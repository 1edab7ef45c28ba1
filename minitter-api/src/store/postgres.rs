use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};

use minitter_shared::clients::db::DbPool;
use minitter_shared::errors::StoreResult;

use crate::models::{FollowEdge, NewTweet, NewUser, User};
use crate::schema::{tweets, users, users_follow_list};

use super::Store;

/// PostgreSQL-backed [`Store`]. A pooled connection is held for the span
/// of a single statement.
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> StoreResult<PooledConnection<ConnectionManager<PgConnection>>> {
        Ok(self.pool.get()?)
    }
}

impl Store for PgStore {
    fn create_user(&self, user: &NewUser) -> StoreResult<i64> {
        let mut conn = self.conn()?;

        let id = diesel::insert_into(users::table)
            .values(user)
            .returning(users::id)
            .get_result::<i64>(&mut conn)?;

        Ok(id)
    }

    fn get_user(&self, user_id: i64) -> StoreResult<Option<User>> {
        let mut conn = self.conn()?;

        let user = users::table
            .find(user_id)
            .select(User::as_select())
            .first::<User>(&mut conn)
            .optional()?;

        Ok(user)
    }

    fn create_tweet(&self, tweet: &NewTweet) -> StoreResult<usize> {
        let mut conn = self.conn()?;

        let rows = diesel::insert_into(tweets::table)
            .values(tweet)
            .execute(&mut conn)?;

        Ok(rows)
    }

    fn create_follow(&self, edge: &FollowEdge) -> StoreResult<usize> {
        let mut conn = self.conn()?;

        let rows = diesel::insert_into(users_follow_list::table)
            .values(edge)
            .on_conflict_do_nothing()
            .execute(&mut conn)?;

        Ok(rows)
    }

    fn remove_follow(&self, edge: &FollowEdge) -> StoreResult<usize> {
        let mut conn = self.conn()?;

        let rows = diesel::delete(
            users_follow_list::table
                .filter(users_follow_list::user_id.eq(edge.user_id))
                .filter(users_follow_list::follow_user_id.eq(edge.follow_user_id)),
        )
        .execute(&mut conn)?;

        Ok(rows)
    }

    fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn()?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }
}

/// These run against a real database with the migrations applied:
/// `MINITTER_TEST_DATABASE_URL=postgres://... cargo test -- --ignored`
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tweet;
    use minitter_shared::clients::db::create_pool;
    use minitter_shared::errors::StoreError;

    fn store() -> PgStore {
        let url = std::env::var("MINITTER_TEST_DATABASE_URL")
            .expect("MINITTER_TEST_DATABASE_URL must be set for postgres tests");
        PgStore::new(create_pool(&url, 2).unwrap())
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "pg".into(),
            email: email.into(),
            profile: "integration".into(),
            hashed_password: "$argon2id$placeholder".into(),
        }
    }

    fn unique_email(tag: &str) -> String {
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        format!("{tag}-{nanos}@example.com")
    }

    #[test]
    #[ignore]
    fn user_round_trip_excludes_password() {
        let store = store();
        let email = unique_email("roundtrip");
        let id = store.create_user(&new_user(&email)).unwrap();

        let user = store.get_user(id).unwrap().unwrap();
        assert_eq!(user.email, email);
        assert_eq!(user.profile, "integration");
    }

    #[test]
    #[ignore]
    fn duplicate_email_is_unique_violation() {
        let store = store();
        let email = unique_email("dup");
        store.create_user(&new_user(&email)).unwrap();

        let err = store.create_user(&new_user(&email)).unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));

        let err = store.create_user(&new_user(&email.to_uppercase())).unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
    }

    #[test]
    #[ignore]
    fn tweet_for_missing_user_is_foreign_key_violation() {
        let store = store();
        let err = store
            .create_tweet(&NewTweet { user_id: i64::MAX, tweet: "ghost".into() })
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKeyViolation(_)));
    }

    #[test]
    #[ignore]
    fn tweet_is_stored_once() {
        let store = store();
        let id = store.create_user(&new_user(&unique_email("tweet"))).unwrap();
        assert_eq!(store.create_tweet(&NewTweet { user_id: id, tweet: "hello".into() }).unwrap(), 1);

        let mut conn = store.conn().unwrap();
        let rows = tweets::table
            .filter(tweets::user_id.eq(id))
            .select(Tweet::as_select())
            .load::<Tweet>(&mut conn)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tweet, "hello");
    }

    #[test]
    #[ignore]
    fn follow_edges_are_a_set() {
        let store = store();
        let a = store.create_user(&new_user(&unique_email("fa"))).unwrap();
        let b = store.create_user(&new_user(&unique_email("fb"))).unwrap();
        let edge = FollowEdge { user_id: a, follow_user_id: b };

        assert_eq!(store.remove_follow(&edge).unwrap(), 0);
        assert_eq!(store.create_follow(&edge).unwrap(), 1);
        assert_eq!(store.create_follow(&edge).unwrap(), 0);
        assert_eq!(store.remove_follow(&edge).unwrap(), 1);
        assert_eq!(store.remove_follow(&edge).unwrap(), 0);
    }
}
