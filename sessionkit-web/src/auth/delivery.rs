//! Credential delivery: server-set cookies or response body

use crate::config::CookieSettings;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use sessionkit_core::{AuthSdto, ClientKind, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};

/// Refresh credential lifetime, carried as the cookie max-age
pub const REFRESH_TOKEN_LIFETIME_DAYS: i64 = 7;

pub fn refresh_token_lifetime() -> Duration {
    Duration::days(REFRESH_TOKEN_LIFETIME_DAYS)
}

/// A freshly issued credential pair, tagged with how it reaches the client
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryResult {
    Cookie {
        access: String,
        refresh: String,
        expires_at: DateTime<Utc>,
    },
    Body {
        access: String,
        refresh: String,
        expires_at: DateTime<Utc>,
    },
}

impl DeliveryResult {
    /// Tag a pair for the given client kind
    pub fn for_client(
        kind: ClientKind,
        access: String,
        refresh: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        match kind {
            ClientKind::Web => DeliveryResult::Cookie {
                access,
                refresh,
                expires_at,
            },
            ClientKind::Mobile => DeliveryResult::Body {
                access,
                refresh,
                expires_at,
            },
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        match self {
            DeliveryResult::Cookie { expires_at, .. } | DeliveryResult::Body { expires_at, .. } => {
                *expires_at
            }
        }
    }

    /// Write the credentials into `jar` and build the response payload.
    ///
    /// Cookie delivery never puts a token string in the payload; body delivery never
    /// sets a cookie.
    pub fn apply(
        self,
        jar: CookieJar,
        access_lifetime: Duration,
        settings: &CookieSettings,
    ) -> (CookieJar, AuthSdto) {
        match self {
            DeliveryResult::Cookie {
                access,
                refresh,
                expires_at,
            } => {
                let jar = jar
                    .add(session_cookie(
                        ACCESS_TOKEN_COOKIE,
                        access,
                        access_lifetime,
                        settings,
                    ))
                    .add(session_cookie(
                        REFRESH_TOKEN_COOKIE,
                        refresh,
                        refresh_token_lifetime(),
                        settings,
                    ));

                let payload = AuthSdto {
                    access_token: None,
                    refresh_token: None,
                    expires_at: Some(expires_at),
                };
                (jar, payload)
            }
            DeliveryResult::Body {
                access,
                refresh,
                expires_at,
            } => {
                let payload = AuthSdto {
                    access_token: Some(access),
                    refresh_token: Some(refresh),
                    expires_at: Some(expires_at),
                };
                (jar, payload)
            }
        }
    }
}

fn session_cookie(
    name: &'static str,
    value: String,
    lifetime: Duration,
    settings: &CookieSettings,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(lifetime.num_seconds()))
        .build()
}

/// Remove whichever session cookies `jar` holds
pub fn clear_session_cookies(jar: CookieJar) -> CookieJar {
    [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE]
        .into_iter()
        .fold(jar, |jar, name| {
            if jar.get(name).is_some() {
                jar.remove(Cookie::build(name).path("/"))
            } else {
                jar
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(kind: ClientKind) -> DeliveryResult {
        DeliveryResult::for_client(
            kind,
            "access.jwt.value".to_string(),
            "refresh-value".to_string(),
            Utc::now() + Duration::minutes(15),
        )
    }

    #[test]
    fn test_web_delivery_sets_cookies_and_hides_tokens() {
        let (jar, payload) = pair(ClientKind::Web).apply(
            CookieJar::new(),
            Duration::minutes(15),
            &CookieSettings::default(),
        );

        assert!(!payload.carries_tokens());
        assert!(payload.expires_at.is_some());

        let access = jar.get(ACCESS_TOKEN_COOKIE).unwrap();
        assert_eq!(access.value(), "access.jwt.value");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Strict));
        assert_eq!(access.path(), Some("/"));
        assert_eq!(access.max_age(), Some(time::Duration::minutes(15)));

        let refresh = jar.get(REFRESH_TOKEN_COOKIE).unwrap();
        assert_eq!(refresh.value(), "refresh-value");
        assert_eq!(refresh.max_age(), Some(time::Duration::days(7)));
    }

    #[test]
    fn test_mobile_delivery_returns_tokens_without_cookies() {
        let (jar, payload) = pair(ClientKind::Mobile).apply(
            CookieJar::new(),
            Duration::minutes(15),
            &CookieSettings::default(),
        );

        assert_eq!(payload.access_token.as_deref(), Some("access.jwt.value"));
        assert_eq!(payload.refresh_token.as_deref(), Some("refresh-value"));
        assert!(jar.iter().next().is_none());
    }

    #[test]
    fn test_insecure_cookies_for_local_development() {
        let (jar, _) = pair(ClientKind::Web).apply(
            CookieJar::new(),
            Duration::minutes(15),
            &CookieSettings { secure: false },
        );

        assert_eq!(jar.get(ACCESS_TOKEN_COOKIE).unwrap().secure(), Some(false));
    }

    #[test]
    fn test_clear_only_touches_present_cookies() {
        let jar = CookieJar::new().add(Cookie::new(REFRESH_TOKEN_COOKIE, "r"));

        let cleared = clear_session_cookies(jar);
        assert!(cleared.get(REFRESH_TOKEN_COOKIE).is_none());
        assert!(cleared.get(ACCESS_TOKEN_COOKIE).is_none());

        let empty = clear_session_cookies(CookieJar::new());
        assert!(empty.iter().next().is_none());
    }
}
