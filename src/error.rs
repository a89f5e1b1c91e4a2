/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / error view)
 * - guest store / login workflow の error を統一的に変換
 */
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::guest::GuestStoreError;
use crate::services::login::{LoginError, UnexpectedReason};
use crate::web::view::View;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("service unavailable (maintenance)")]
    ServiceUnavailable,
    #[error("unexpected: {reason}")]
    Unexpected { reason: UnexpectedReason },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let view = match self {
            AppError::BadRequest { code, message } => View::new("common/400")
                .status(StatusCode::BAD_REQUEST)
                .with("code", code)
                .with("message", message),
            AppError::NotFound { resource } => View::new("common/404")
                .status(StatusCode::NOT_FOUND)
                .with("message", format!("{resource} not found.")),
            AppError::ServiceUnavailable => {
                View::new("common/maintenance").status(StatusCode::SERVICE_UNAVAILABLE)
            }
            // The reason was logged when the error was built; the page stays generic.
            AppError::Unexpected { .. } | AppError::Internal => {
                View::new("common/500").status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        };

        view.into_response()
    }
}

impl From<GuestStoreError> for AppError {
    fn from(e: GuestStoreError) -> Self {
        tracing::error!(error = %e, "guest store failure");
        AppError::Internal
    }
}

impl From<getrandom::Error> for AppError {
    fn from(e: getrandom::Error) -> Self {
        tracing::error!(error = %e, "random token generation failed");
        AppError::Internal
    }
}

impl From<LoginError> for AppError {
    fn from(e: LoginError) -> Self {
        match e {
            LoginError::Unexpected {
                reason,
                location,
                source,
            } => {
                tracing::error!(
                    reason = %reason,
                    location = ?location,
                    source = ?source,
                    "unexpected login failure"
                );
                AppError::Unexpected { reason }
            }
            // Handlers render field errors themselves; reaching here is a bug.
            LoginError::Registration(e) => {
                tracing::error!(errors = ?e.errors, "unhandled registration failure");
                AppError::Internal
            }
        }
    }
}
