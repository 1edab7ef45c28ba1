use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::schema::{tweets, users, users_follow_list};

// --- User ---

/// Public projection of a user row. The password column is never selected.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub profile: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub profile: String,
    pub hashed_password: String,
}

// --- Tweet ---

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = tweets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Tweet {
    pub id: i64,
    pub user_id: i64,
    pub tweet: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tweets)]
pub struct NewTweet {
    pub user_id: i64,
    pub tweet: String,
}

// --- Follow ---

/// `user_id` follows `follow_user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Insertable)]
#[diesel(table_name = users_follow_list)]
pub struct FollowEdge {
    pub user_id: i64,
    pub follow_user_id: i64,
}
