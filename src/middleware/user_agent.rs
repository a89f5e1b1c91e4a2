//! User-Agent interceptor.
//!
//! Every login page call has to carry a `User-Agent`; COR-901 receives it
//! verbatim. The value is captured once into `RequestCtx` so handlers never
//! read headers themselves.

use axum::{
    body::Body,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::web::extractors::RequestCtx;

pub async fn capture_user_agent(mut req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            tracing::warn!(path = %req.uri().path(), "request without user agent");
            AppError::bad_request("MISSING_USER_AGENT", "user agent is required")
        })?
        .to_string();

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(RequestCtx::new(user_agent));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Extension, Router, middleware::from_fn, routing::get};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn router() -> Router {
        Router::new()
            .route(
                "/Login",
                get(|Extension(ctx): Extension<RequestCtx>| async move { ctx.user_agent }),
            )
            .route_layer(from_fn(capture_user_agent))
    }

    async fn call(user_agent: Option<&'static str>) -> (axum::http::StatusCode, String) {
        let mut req = Request::get("/Login");
        if let Some(ua) = user_agent {
            req = req.header(header::USER_AGENT, ua);
        }
        let res = router()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let body = res.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn user_agent_is_captured_verbatim() {
        let (status, body) = call(Some(" Mozilla/5.0 (test)  ")).await;

        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(body, " Mozilla/5.0 (test)  ");
    }

    #[tokio::test]
    async fn blank_or_missing_user_agent_is_rejected() {
        for ua in [None, Some(""), Some("   ")] {
            let (status, _) = call(ua).await;
            assert_eq!(status, axum::http::StatusCode::BAD_REQUEST, "{ua:?}");
        }
    }
}
