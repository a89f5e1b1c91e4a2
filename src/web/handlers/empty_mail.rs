/*
 * Responsibility
 * - GET /Login/emptymail (空メール送信確認ページ)
 * - GET /Login/emptyMailAddress (空メール送信先アドレス, JSON)
 *   - coop key に guest record を (再) 保存して TTL を延長する
 */
use axum::{Json, extract::State};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::{
    error::AppError,
    state::AppState,
    web::{coop, view::View},
};

#[derive(Debug, Serialize)]
pub struct EmptyMailAddressResponse {
    pub to_address: String,
}

pub async fn confirm_empty_mail() -> View {
    View::new("login/sendEmptyMail")
}

pub async fn empty_mail_address(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<EmptyMailAddressResponse>), AppError> {
    let (jar, coop_key) = coop::ensure_coop_key(jar, state.secure_cookies)?;

    let record = state.guests.get(&coop_key).await?.unwrap_or_default();
    state
        .guests
        .put(&coop_key, &record, state.empty_mail.coop_key_ttl)
        .await?;

    let to_address = format!(
        "{}{}@{}",
        state.empty_mail.account_prefix, coop_key, state.empty_mail.domain
    );

    Ok((jar, Json(EmptyMailAddressResponse { to_address })))
}
