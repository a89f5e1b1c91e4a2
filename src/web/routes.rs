/*
 * Responsibility
 * - /Login 配下と error page の URL 構造を定義
 * - interceptor (maintenance → user agent) は /Login 配下だけに route_layer で適用
 */
use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};

use crate::middleware::{maintenance::reject_during_maintenance, user_agent::capture_user_agent};
use crate::state::AppState;
use crate::web::handlers::{
    empty_mail::{confirm_empty_mail, empty_mail_address},
    error_pages,
    health::health,
    login::{login_page, submit},
};

pub fn routes(state: AppState) -> Router<AppState> {
    // route_layer: the last one added runs first.
    let login = Router::new()
        .route("/Login", get(login_page).post(submit))
        .route("/Login/emptymail", get(confirm_empty_mail))
        .route("/Login/emptyMailAddress", get(empty_mail_address))
        .route_layer(from_fn(capture_user_agent))
        .route_layer(from_fn_with_state(state, reject_during_maintenance));

    Router::new()
        .route("/health", get(health))
        .route("/400", get(error_pages::bad_request))
        .route("/404", get(error_pages::not_found))
        .route("/405", get(error_pages::method_not_allowed))
        .route("/500", get(error_pages::internal_server_error))
        .merge(login)
        .fallback(error_pages::fallback)
}
