use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use minitter_shared::errors::{AppError, AppResult, ErrorCode, StoreError};

use crate::extract::ValidJson;
use crate::models::FollowEdge;
use crate::store;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    #[validate(range(min = 1, message = "userId must be positive"))]
    pub user_id: i64,
    #[validate(range(min = 1, message = "followUserId must be positive"))]
    pub follow_user_id: i64,
}

impl From<FollowRequest> for FollowEdge {
    fn from(req: FollowRequest) -> Self {
        Self {
            user_id: req.user_id,
            follow_user_id: req.follow_user_id,
        }
    }
}

// --- POST /follow ---

pub async fn follow(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<FollowRequest>,
) -> AppResult<StatusCode> {
    if req.user_id == req.follow_user_id {
        return Err(AppError::new(ErrorCode::CannotFollowSelf, "cannot follow yourself"));
    }

    let edge = FollowEdge::from(req);
    let inserted = store::blocking(state.store.clone(), move |store| store.create_follow(&edge))
        .await
        .map_err(|e| match e {
            StoreError::ForeignKeyViolation(_) => {
                AppError::new(ErrorCode::UnknownUser, "user does not exist")
            }
            other => other.into(),
        })?;

    tracing::debug!(
        user_id = edge.user_id,
        follow_user_id = edge.follow_user_id,
        inserted,
        "follow recorded"
    );

    Ok(StatusCode::OK)
}

// --- POST /unfollow ---

pub async fn unfollow(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<FollowRequest>,
) -> AppResult<StatusCode> {
    let edge = FollowEdge::from(req);
    let removed = store::blocking(state.store.clone(), move |store| store.remove_follow(&edge)).await?;

    tracing::debug!(
        user_id = edge.user_id,
        follow_user_id = edge.follow_user_id,
        removed,
        "follow removed"
    );

    Ok(StatusCode::OK)
}
