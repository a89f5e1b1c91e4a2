//! Unguessable tokens for coop keys and authorize `state`.
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

const TOKEN_BYTES: usize = 32;
/// Encoded length of a token: 32 bytes in unpadded base64.
pub const TOKEN_LEN: usize = 43;

/// 32 bytes of entropy -> URL-safe base64 without padding.
pub fn url_safe_token() -> Result<String, getrandom::Error> {
    let mut bytes = [0u8; TOKEN_BYTES];
    getrandom::fill(&mut bytes)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Whether `s` has the shape `url_safe_token` produces.
pub fn is_url_safe_token(s: &str) -> bool {
    s.len() == TOKEN_LEN
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
