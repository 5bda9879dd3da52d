//! Token cookies on top of `tower-cookies`.
//!
//! [`CookieConfig`] only carries the flag values; reading, setting, and
//! removal go through the request's [`Cookies`] jar, which
//! `CookieManagerLayer` turns into `Set-Cookie` headers.

use tower_cookies::cookie::time::Duration;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};

use super::session::TokenPair;

/// Cookie carrying the access token.
pub const ACCESS_COOKIE_NAME: &str = "accessToken";
/// Cookie carrying the refresh token.
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Flags applied to every token cookie.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
        }
    }
}

/// Parse a `SameSite` attribute value, case-insensitively.
pub fn parse_same_site(value: &str) -> Result<SameSite, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "strict" => Ok(SameSite::Strict),
        "lax" => Ok(SameSite::Lax),
        "none" => Ok(SameSite::None),
        other => Err(format!("unknown SameSite value '{other}'")),
    }
}

impl CookieConfig {
    /// Load cookie flags from environment variables.
    ///
    /// | Env Var            | Default |
    /// |--------------------|---------|
    /// | `COOKIE_SECURE`    | `true`  |
    /// | `COOKIE_HTTP_ONLY` | `true`  |
    /// | `COOKIE_SAME_SITE` | `Lax`   |
    pub fn from_env() -> Self {
        let secure: bool = std::env::var("COOKIE_SECURE")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("COOKIE_SECURE must be true or false");

        let http_only: bool = std::env::var("COOKIE_HTTP_ONLY")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("COOKIE_HTTP_ONLY must be true or false");

        let same_site = parse_same_site(
            &std::env::var("COOKIE_SAME_SITE").unwrap_or_else(|_| "Lax".into()),
        )
        .unwrap_or_else(|e| panic!("COOKIE_SAME_SITE: {e}"));

        Self {
            secure,
            http_only,
            same_site,
        }
    }

    /// A cookie holding `value` for `max_age_secs`, with the configured flags.
    pub fn token_cookie(
        &self,
        name: &'static str,
        value: String,
        max_age_secs: i64,
    ) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(Duration::seconds(max_age_secs))
            .build()
    }

    /// A cookie that tells the browser to drop `name`.
    pub fn removal_cookie(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = self.token_cookie(name, String::new(), 0);
        cookie.make_removal();
        cookie
    }

    /// Queue both token cookies on the response.
    pub fn set_tokens(
        &self,
        cookies: &Cookies,
        tokens: &TokenPair,
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
    ) {
        cookies.add(self.token_cookie(
            ACCESS_COOKIE_NAME,
            tokens.access_token.clone(),
            access_ttl_secs,
        ));
        cookies.add(self.token_cookie(
            REFRESH_COOKIE_NAME,
            tokens.refresh_token.clone(),
            refresh_ttl_secs,
        ));
    }

    /// Queue removal of both token cookies.
    pub fn clear_tokens(&self, cookies: &Cookies) {
        cookies.add(self.removal_cookie(ACCESS_COOKIE_NAME));
        cookies.add(self.removal_cookie(REFRESH_COOKIE_NAME));
    }
}

/// Value of a request cookie. Empty values count as absent.
pub fn cookie_value(cookies: &Cookies, name: &str) -> Option<String> {
    cookies
        .get(name)
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty())
}
