//! Validating extractors for request DTOs.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use adminguard_core::error::AppError;

use crate::error::ApiError;

/// JSON body that passed `validator` checks.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(format!("Invalid JSON: {}", e.body_text())))?;
        value.validate().map_err(validation_error)?;
        Ok(Self(value))
    }
}

/// Query string that passed `validator` checks.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| {
                AppError::validation(format!("Invalid query: {}", e.body_text()))
            })?;
        value.validate().map_err(validation_error)?;
        Ok(Self(value))
    }
}

/// Field-level messages as `{field: [messages]}` details.
fn validation_error(errors: ValidationErrors) -> ApiError {
    let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (field, field_errors) in errors.field_errors() {
        let messages = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {field}"))
            })
            .collect();
        fields.insert(field.to_string(), messages);
    }

    ApiError(
        AppError::validation("Request validation failed")
            .with_details(serde_json::json!({ "fields": fields })),
    )
}
