/*
 * Responsibility
 * - /400, /404, /405, /500 の error page
 * - 未定義 path の fallback
 */
use axum::http::StatusCode;

use crate::error::AppError;
use crate::web::view::View;

pub async fn bad_request() -> View {
    View::new("common/400").status(StatusCode::BAD_REQUEST)
}

pub async fn not_found() -> View {
    View::new("common/404").status(StatusCode::NOT_FOUND)
}

pub async fn method_not_allowed() -> View {
    View::new("common/405").status(StatusCode::METHOD_NOT_ALLOWED)
}

pub async fn internal_server_error() -> View {
    View::new("common/500").status(StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn fallback() -> AppError {
    AppError::not_found("page")
}
