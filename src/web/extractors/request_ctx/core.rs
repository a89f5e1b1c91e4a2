use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

use super::RequestCtx;

/// Handler で RequestCtx を受け取るための extractor
/// middleware が RequestCtx を request.extensions() に insert 済みである前提
/// 見つからない場合は 400 を返す (interceptor 未設定 or User-Agent なし)
pub struct RequestCtxExtractor(pub RequestCtx);

impl FromRequestParts<AppState> for RequestCtxExtractor
where
    AppState: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestCtx>()
            .cloned()
            .map(RequestCtxExtractor)
            .ok_or_else(|| AppError::bad_request("MISSING_USER_AGENT", "user agent is required"))
    }
}
