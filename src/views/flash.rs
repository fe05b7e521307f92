//! One-shot messages carried across a redirect in a cookie.
//!
//! The cookie holds a base64 encoded JSON list and is cleared by the page
//! that displays it.

use actix_web::HttpRequest;
use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const FLASH_COOKIE: &str = "gradebook_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Error,
    Message,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Error,
            message: message.into(),
        }
    }

    /// Neutral notice, such as the logout message
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Message,
            message: message.into(),
        }
    }
}

pub fn encode(flashes: &[Flash]) -> String {
    let json = serde_json::to_vec(flashes).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

pub fn decode(value: &str) -> Vec<Flash> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_else(|| {
            debug!("Ignoring malformed flash cookie");
            Vec::new()
        })
}

/// Messages carried by the request
pub fn pending(req: &HttpRequest) -> Vec<Flash> {
    req.cookie(FLASH_COOKIE)
        .map(|cookie| decode(cookie.value()))
        .unwrap_or_default()
}

pub fn flash_cookie(flashes: &[Flash]) -> Cookie<'static> {
    Cookie::build(FLASH_COOKIE, encode(flashes))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(FLASH_COOKIE, "")
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::ZERO)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_cookie_carries_messages() {
        let flashes = vec![
            Flash::success("Logged in successfully!"),
            Flash::error("Invalid email. Must be @uw.edu.pl."),
        ];
        let cookie = flash_cookie(&flashes);
        assert!(!cookie.value().contains('"'));

        let req = TestRequest::default().cookie(cookie).to_http_request();
        assert_eq!(pending(&req), flashes);
    }

    #[test]
    fn test_garbage_is_ignored() {
        assert!(decode("%%%not-base64").is_empty());
        assert!(decode(&URL_SAFE_NO_PAD.encode("{}")).is_empty());
    }

    #[test]
    fn test_no_cookie() {
        let req = TestRequest::default().to_http_request();
        assert!(pending(&req).is_empty());
    }
}
