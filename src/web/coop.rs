/*
 * Responsibility
 * - coop key (guest record の cache key) を cookie で browser session に紐づける
 */
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::services::random;

pub const COOP_COOKIE: &str = "spplogin_coop";

/// Coop key already bound to this browser, if any.
///
/// Only values shaped like a key this server minted are accepted; anything
/// else is ignored so the browser cannot choose its cache key.
pub fn coop_key(jar: &CookieJar) -> Option<String> {
    let value = jar.get(COOP_COOKIE)?.value();
    if random::is_url_safe_token(value) {
        Some(value.to_string())
    } else {
        tracing::warn!(len = value.len(), "ignoring malformed coop cookie");
        None
    }
}

/// Reuse the browser's coop key or mint a new one and (re)set the cookie.
pub fn ensure_coop_key(
    jar: CookieJar,
    secure: bool,
) -> Result<(CookieJar, String), getrandom::Error> {
    if let Some(key) = coop_key(&jar) {
        return Ok((jar, key));
    }

    let key = random::url_safe_token()?;
    let cookie = Cookie::build((COOP_COOKIE, key.clone()))
        .path("/Login")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax);

    Ok((jar.add(cookie), key))
}
