use std::fmt::Write;

use rand::{rngs::OsRng, RngCore};

use crate::error::ApiError;

const KEY_BYTES: usize = 20;
const KEYWORD: &str = "token";

/// New opaque token key: 20 random bytes as 40 lowercase hex chars.
pub fn generate_key() -> String {
    let mut raw = [0u8; KEY_BYTES];
    OsRng.fill_bytes(&mut raw);
    raw.iter().fold(String::with_capacity(KEY_BYTES * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// Pulls the key out of an `Authorization: Token <key>` header value.
///
/// A missing header or another scheme means the caller did not try to
/// authenticate with a token at all.
pub fn parse_authorization(header: Option<&str>) -> Result<&str, ApiError> {
    let not_provided = ApiError::Unauthorized("Authentication credentials were not provided.");
    let Some(header) = header else {
        return Err(not_provided);
    };

    let mut parts = header.split_whitespace();
    match parts.next() {
        Some(scheme) if scheme.eq_ignore_ascii_case(KEYWORD) => {}
        _ => return Err(not_provided),
    }

    let Some(key) = parts.next() else {
        return Err(ApiError::Unauthorized(
            "Invalid token header. No credentials provided.",
        ));
    };
    if parts.next().is_some() {
        return Err(ApiError::Unauthorized(
            "Invalid token header. Token string should not contain spaces.",
        ));
    }
    Ok(key)
}
