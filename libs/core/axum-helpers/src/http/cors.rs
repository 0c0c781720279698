use axum::http::{HeaderValue, Method, header};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Origins allowed by `CORS_ALLOWED_ORIGIN`.
#[derive(Clone, Debug, PartialEq)]
pub enum CorsOrigins {
    /// Unset or `*`: any origin, no credentials
    Any,
    List(Vec<HeaderValue>),
}

impl CorsOrigins {
    /// Parse a comma-separated origin list.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.is_empty() || raw == "*" {
            return Ok(Self::Any);
        }

        let origins = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<HeaderValue>()
                    .map_err(|e| format!("invalid origin '{}': {}", s, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if origins.is_empty() {
            return Ok(Self::Any);
        }
        Ok(Self::List(origins))
    }

    /// Read `CORS_ALLOWED_ORIGIN`, defaulting to [`CorsOrigins::Any`].
    pub fn from_env() -> Result<Self, String> {
        match std::env::var("CORS_ALLOWED_ORIGIN") {
            Ok(raw) => Self::parse(&raw),
            Err(_) => Ok(Self::Any),
        }
    }
}

/// Build the CORS layer for the given origins.
///
/// An explicit list allows credentials and the methods and headers the API
/// uses. [`CorsOrigins::Any`] is fully permissive.
pub fn create_cors_layer(origins: CorsOrigins) -> CorsLayer {
    match origins {
        CorsOrigins::Any => CorsLayer::permissive(),
        CorsOrigins::List(list) => CorsLayer::new()
            .allow_origin(AllowOrigin::list(list))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .allow_credentials(true)
            .max_age(Duration::from_secs(3600)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wildcard_and_empty() {
        assert_eq!(CorsOrigins::parse("*").unwrap(), CorsOrigins::Any);
        assert_eq!(CorsOrigins::parse("  ").unwrap(), CorsOrigins::Any);
        assert_eq!(CorsOrigins::parse(" , ").unwrap(), CorsOrigins::Any);
    }

    #[test]
    fn test_parse_list() {
        let origins =
            CorsOrigins::parse("http://localhost:5173, https://social-events.web.app").unwrap();
        match origins {
            CorsOrigins::List(list) => {
                assert_eq!(list.len(), 2);
                assert_eq!(list[1], "https://social-events.web.app");
            }
            CorsOrigins::Any => panic!("expected explicit origins"),
        }
    }

    #[test]
    fn test_parse_rejects_invalid_header_value() {
        assert!(CorsOrigins::parse("http://ok.dev,bad\norigin").is_err());
    }

    #[test]
    fn test_from_env_defaults_to_any() {
        temp_env::with_var_unset("CORS_ALLOWED_ORIGIN", || {
            assert_eq!(CorsOrigins::from_env().unwrap(), CorsOrigins::Any);
        });
    }
}
