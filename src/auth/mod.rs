//! Shared-password gate.
//!
//! There is no session store: the cookie carries an HMAC-SHA256 of a fixed
//! seed keyed by the site password, and every request recomputes it.

mod middleware;

pub use middleware::require_site_password;

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpRequest;
use hmac::{Hmac, Mac};
use sha2::Sha256;

pub const AUTH_COOKIE_NAME: &str = "bc_auth";
const AUTH_COOKIE_SEED: &str = "biomed-chat";
const COOKIE_MAX_AGE_DAYS: i64 = 30;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded token stored in the auth cookie for `secret`.
pub fn cookie_token(secret: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(AUTH_COOKIE_SEED.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// The configured password gate. Disabled when no password is set.
#[derive(Debug, Clone)]
pub struct Gate {
    secret: Option<String>,
    secure_cookies: bool,
}

impl Gate {
    pub fn new(secret: Option<String>, secure_cookies: bool) -> Self {
        Self {
            secret,
            secure_cookies,
        }
    }

    pub fn enabled(&self) -> bool {
        self.secret.is_some()
    }

    pub fn password_matches(&self, candidate: &str) -> bool {
        self.secret.as_deref() == Some(candidate)
    }

    pub fn verify_token(&self, token: Option<&str>) -> bool {
        let Some(secret) = self.secret.as_deref() else {
            return true;
        };
        match (token, cookie_token(secret)) {
            (Some(presented), Some(expected)) => presented.as_bytes() == expected.as_bytes(),
            _ => false,
        }
    }

    pub fn verify(&self, req: &HttpRequest) -> bool {
        let cookie = req.cookie(AUTH_COOKIE_NAME);
        self.verify_token(cookie.as_ref().map(Cookie::value))
    }

    /// Cookie granting access. `None` when the gate is disabled.
    pub fn login_cookie(&self) -> Option<Cookie<'static>> {
        let token = cookie_token(self.secret.as_deref()?)?;
        Some(self.cookie(token, Duration::days(COOKIE_MAX_AGE_DAYS)))
    }

    pub fn logout_cookie(&self) -> Cookie<'static> {
        self.cookie(String::new(), Duration::ZERO)
    }

    fn cookie(&self, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build(AUTH_COOKIE_NAME, value)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(max_age)
            .secure(self.secure_cookies)
            .finish()
    }
}
