use std::collections::HashMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use larder_db::StoreError;
use larder_mealplan::MealPlanningError;
use larder_recipe::RecipeError;
use serde_json::{Value, json};
use thiserror::Error;

use crate::store::DataError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation failed")]
    ValidationFailed(HashMap<String, String>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Planning(#[from] MealPlanningError),

    #[error(transparent)]
    Recipe(#[from] RecipeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Internal server error")]
    InternalError(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let message = errors
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string());
                (field.to_string(), message)
            })
            .collect();
        ApiError::ValidationFailed(details)
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, Option<Value>) {
        match self {
            ApiError::ValidationFailed(details) => (
                StatusCode::BAD_REQUEST,
                "ValidationFailed",
                Some(json!(details)),
            ),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest", None),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Unauthorized", None),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound", None),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "Conflict", None),
            ApiError::Planning(MealPlanningError::Configuration(_)) => {
                (StatusCode::BAD_REQUEST, "Configuration", None)
            }
            ApiError::Planning(MealPlanningError::NoCompatibleRecipes {
                diet,
                found,
                minimum,
            }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NoCompatibleRecipes",
                Some(json!({ "diet": diet, "found": found, "minimum": minimum })),
            ),
            ApiError::Planning(MealPlanningError::UnmetGoal { day }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UnmetGoal",
                Some(json!({ "day": day })),
            ),
            ApiError::Recipe(RecipeError::NotFound(_)) => (StatusCode::NOT_FOUND, "NotFound", None),
            ApiError::Recipe(RecipeError::AlreadyExists(_)) => {
                (StatusCode::CONFLICT, "Conflict", None)
            }
            ApiError::Recipe(
                RecipeError::ValidationError(_) | RecipeError::NegativeQuantity { .. },
            ) => (StatusCode::BAD_REQUEST, "ValidationFailed", None),
            ApiError::Store(StoreError::RecipeNotFound(_)) => {
                (StatusCode::NOT_FOUND, "NotFound", None)
            }
            ApiError::Store(StoreError::ReadOnly(_)) => (StatusCode::BAD_REQUEST, "BadRequest", None),
            ApiError::Recipe(_) | ApiError::Store(_) | ApiError::Data(_) | ApiError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "InternalServerError", None)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, details) = self.parts();

        let message = if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
            "An unexpected error occurred. Please try again later.".to_string()
        } else {
            tracing::debug!(error = %self, code, "Request rejected");
            self.to_string()
        };

        let mut body = json!({
            "error": code,
            "message": message,
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}
