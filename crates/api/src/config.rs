use std::str::FromStr;

use crate::auth::cookie::CookieConfig;
use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Everything except the two token secrets has a local-development default.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Origins allowed to make credentialed (cookie-carrying) requests.
    pub cors_origins: Vec<String>,
    /// Upper bound on a single request, password hashing included.
    pub request_timeout_secs: u64,
    /// Token secrets and lifetimes.
    pub jwt: JwtConfig,
    /// Flags applied to the `accessToken` and `refreshToken` cookies.
    pub cookies: CookieConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    ///
    /// Token settings are read by [`JwtConfig::from_env`] and cookie flags
    /// by [`CookieConfig::from_env`]. Panics on malformed values.
    pub fn from_env() -> Self {
        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse("PORT", 8000),
            cors_origins,
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", 30),
            jwt: JwtConfig::from_env(),
            cookies: CookieConfig::from_env(),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{name} is invalid ({raw:?}): {e}")),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parse_falls_back_to_default() {
        assert_eq!(env_parse::<u16>("VIDTUBE_TEST_UNSET_PORT", 8000), 8000);
    }

    #[test]
    fn env_parse_reads_value() {
        std::env::set_var("VIDTUBE_TEST_TIMEOUT_SECS", "45");
        assert_eq!(env_parse::<u64>("VIDTUBE_TEST_TIMEOUT_SECS", 30), 45);
    }

    #[test]
    #[should_panic(expected = "VIDTUBE_TEST_BAD_PORT is invalid")]
    fn env_parse_panics_on_garbage() {
        std::env::set_var("VIDTUBE_TEST_BAD_PORT", "eighty");
        env_parse::<u16>("VIDTUBE_TEST_BAD_PORT", 8000);
    }
}
