// src/error.rs
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::any::Any;
use thiserror::Error;
use uuid::Uuid;

use crate::models::auth::ErrorResponse;
use crate::storage::StoreError;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Interaction log error: {0}")]
    Log(#[from] StoreError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ChatError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ChatError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ChatError::Forbidden(_) => StatusCode::FORBIDDEN,
            ChatError::Log(_) | ChatError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        match self {
            ChatError::InvalidInput(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
            }
            ChatError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, Json(ErrorResponse::new(message))).into_response()
            }
            ChatError::RateLimited { retry_after_secs } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({
                        "success": false,
                        "message": "Rate limit exceeded. Please try again later.",
                        "retry_after": retry_after_secs
                    })),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                response
            }
            other => {
                // Internal details stay in the log, the client only gets the id
                let error_id = Uuid::new_v4();
                tracing::error!(error_id = %error_id, error = %other, "unhandled error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new(format!(
                        "Internal server error (ID: {})",
                        error_id
                    ))),
                )
                    .into_response()
            }
        }
    }
}

/// Turns a panic inside a handler into the same 500 body as any other internal error.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ChatError::Internal(format!("handler panicked: {}", detail)).into_response()
}
