//! Request extractors shared by handlers.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use sharayeh_core::validation::validate_request;
use validator::Validate;

use crate::error::AppError;

/// JSON body that is deserialized and then validated.
///
/// Malformed JSON is a 400 `BAD_REQUEST`; a body that parses but breaks a
/// rule is a 400 `VALIDATION_ERROR` naming the failing fields.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        validate_request(&value)?;
        Ok(Self(value))
    }
}
