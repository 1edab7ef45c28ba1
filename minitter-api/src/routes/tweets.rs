use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use minitter_shared::errors::{AppError, AppResult, ErrorCode, StoreError};

use crate::extract::ValidJson;
use crate::models::NewTweet;
use crate::store;
use crate::AppState;

/// Longest accepted tweet, counted in characters rather than bytes.
pub const MAX_TWEET_CHARS: usize = 300;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TweetRequest {
    #[validate(range(min = 1, message = "userId must be positive"))]
    pub user_id: i64,
    pub tweet: String,
}

// --- POST /tweet ---

pub async fn tweet(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<TweetRequest>,
) -> AppResult<StatusCode> {
    if req.tweet.chars().count() > MAX_TWEET_CHARS {
        return Err(AppError::new(
            ErrorCode::TweetTooLong,
            format!("tweet exceeds {MAX_TWEET_CHARS} characters"),
        ));
    }

    let user_id = req.user_id;
    let new_tweet = NewTweet {
        user_id,
        tweet: req.tweet,
    };

    store::blocking(state.store.clone(), move |store| store.create_tweet(&new_tweet))
        .await
        .map_err(|e| match e {
            StoreError::ForeignKeyViolation(_) => {
                AppError::new(ErrorCode::UnknownUser, "user does not exist")
            }
            other => other.into(),
        })?;

    tracing::debug!(user_id, "tweet created");

    Ok(StatusCode::OK)
}

// --- GET /timeline/:user_id ---

/// Reserved route. How a timeline is composed and ordered is still open.
pub async fn timeline(Path(_user_id): Path<i64>) -> AppResult<StatusCode> {
    Err(AppError::new(ErrorCode::NotImplemented, "timeline is not available yet"))
}
