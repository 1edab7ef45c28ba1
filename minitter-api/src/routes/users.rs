use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use minitter_shared::errors::{AppError, AppResult, ErrorCode, StoreError};

use crate::extract::ValidJson;
use crate::models::{NewUser, User};
use crate::services::password;
use crate::store;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(length(max = 255, message = "name must be at most 255 characters"))]
    pub name: String,
    #[validate(length(max = 255, message = "email must be at most 255 characters"))]
    pub email: String,
    pub profile: String,
    pub password: String,
}

// --- POST /sign-up ---

pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<SignUpRequest>,
) -> AppResult<Json<User>> {
    let hashed_password = password::hash_password(&req.password)?;

    let new_user = NewUser {
        name: req.name,
        email: req.email,
        profile: req.profile,
        hashed_password,
    };

    let user_id = store::blocking(state.store.clone(), move |store| store.create_user(&new_user))
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation(_) => {
                AppError::new(ErrorCode::EmailAlreadyExists, "email already registered")
            }
            other => other.into(),
        })?;

    let user = store::blocking(state.store.clone(), move |store| store.get_user(user_id))
        .await?
        .ok_or_else(|| AppError::internal("created user could not be read back"))?;

    tracing::info!(user_id, "user signed up");

    Ok(Json(user))
}

// --- GET /users/:user_id ---

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<User>> {
    store::blocking(state.store.clone(), move |store| store.get_user(user_id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))
}
