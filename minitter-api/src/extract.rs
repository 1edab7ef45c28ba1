use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use minitter_shared::errors::{AppError, ErrorCode};

/// JSON body extractor that reports every decoding failure (bad syntax,
/// missing fields, wrong content type) as a 400 and runs `Validate` before
/// the handler sees the value.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::new(ErrorCode::ValidationError, rejection.body_text()))?;

        value.validate()?;
        Ok(Self(value))
    }
}
