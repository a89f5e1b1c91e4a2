//! Maintenance interceptor: while `MAINTENANCE_MODE` is on, login pages answer 503.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

pub async fn reject_during_maintenance(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if state.maintenance_mode {
        tracing::debug!(path = %req.uri().path(), "rejected during maintenance");
        return Err(AppError::ServiceUnavailable);
    }
    Ok(next.run(req).await)
}
