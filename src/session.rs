//! Session cookie: the single opaque backend token carried by the browser.
//!
//! The cookie value is the raw access token returned at login; it is
//! forwarded to the backend as a bearer credential and never interpreted
//! here. `HttpOnly`, `Secure` and `SameSite` come from [`CookiePolicy`] and
//! are off unless configured.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

pub const SESSION_COOKIE_NAME: &str = "session";
pub const SESSION_MAX_AGE: Duration = Duration::days(7);

/// Attribute flags applied to the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CookiePolicy {
    pub http_only: bool,
    pub secure: bool,
    pub same_site: Option<SameSite>,
}

/// Reads, sets and clears the `session` cookie.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCookie {
    policy: CookiePolicy,
}

impl SessionCookie {
    #[must_use]
    pub fn new(policy: CookiePolicy) -> Self {
        Self { policy }
    }

    /// The session token, if the browser sent a non-empty one.
    #[must_use]
    pub fn token<'a>(&self, jar: &'a CookieJar) -> Option<&'a str> {
        jar.get(SESSION_COOKIE_NAME)
            .map(Cookie::value)
            .filter(|v| !v.is_empty())
    }

    /// Add the session cookie for `token` with a 7-day max-age.
    #[must_use]
    pub fn set(&self, jar: CookieJar, token: String) -> CookieJar {
        jar.add(self.build(token, SESSION_MAX_AGE))
    }

    /// Overwrite the session cookie with an empty, already-expired value.
    #[must_use]
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.build(String::new(), Duration::ZERO))
    }

    fn build(&self, value: String, max_age: Duration) -> Cookie<'static> {
        let mut cookie = Cookie::build((SESSION_COOKIE_NAME, value))
            .path("/")
            .max_age(max_age)
            .http_only(self.policy.http_only)
            .secure(self.policy.secure);
        if let Some(same_site) = self.policy.same_site {
            cookie = cookie.same_site(same_site);
        }
        cookie.build()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
