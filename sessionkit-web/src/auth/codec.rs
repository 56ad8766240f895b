//! Credential codec: signed access tokens and opaque refresh tokens

use crate::{config::JwtSettings, error::AuthError, error::ConfigError, users::Identity};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Random bytes in a refresh token (256 bits of entropy)
const REFRESH_TOKEN_BYTES: usize = 32;

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    /// Unique token ID
    pub jti: String,
    pub iss: String,
    pub aud: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration time (unix seconds)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
}

impl AccessClaims {
    /// Subject as a user ID, if it is one
    pub fn subject_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Outcome of verifying an access token.
///
/// Every failure reason (signature, issuer, audience, expiry, malformed input) collapses
/// into `Invalid` so callers cannot be used as an oracle.
#[derive(Debug, Clone)]
pub enum Verification {
    Valid(AccessClaims),
    Invalid,
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid(_))
    }

    pub fn claims(self) -> Option<AccessClaims> {
        match self {
            Verification::Valid(claims) => Some(claims),
            Verification::Invalid => None,
        }
    }
}

/// A freshly signed access token
#[derive(Debug, Clone)]
pub struct IssuedAccess {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs, verifies and generates session credentials
#[derive(Clone)]
pub struct CredentialCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    access_lifetime: Duration,
    strict: Validation,
    ignore_expiry: Validation,
}

impl fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialCodec")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_lifetime", &self.access_lifetime)
            .finish_non_exhaustive()
    }
}

impl CredentialCodec {
    /// Build a codec from validated settings
    pub fn new(settings: &JwtSettings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let secret = settings.secret_key.as_bytes();

        let mut strict = Validation::new(Algorithm::HS256);
        strict.set_issuer(&[settings.issuer.as_str()]);
        strict.set_audience(&[settings.audience.as_str()]);
        strict.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        strict.leeway = 0;
        strict.validate_exp = true;

        let mut ignore_expiry = strict.clone();
        ignore_expiry.validate_exp = false;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            access_lifetime: settings.access_token_lifetime(),
            strict,
            ignore_expiry,
        })
    }

    pub fn access_lifetime(&self) -> Duration {
        self.access_lifetime
    }

    /// Issue an access token for `identity`, valid from now
    pub fn issue_access(&self, identity: &Identity) -> Result<IssuedAccess, AuthError> {
        self.issue_access_at(identity, Utc::now())
    }

    /// Issue an access token as if signed at `issued_at`
    pub fn issue_access_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedAccess, AuthError> {
        let expires_at = issued_at
            .checked_add_signed(self.access_lifetime)
            .ok_or_else(|| {
                warn!("Access token expiry is out of range");
                AuthError::TokenCreation
            })?;

        let claims = AccessClaims {
            sub: identity.id.to_string(),
            email: identity.email.clone(),
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            given_name: non_blank(identity.first_name.as_deref()),
            family_name: non_blank(identity.last_name.as_deref()),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(
            |e| {
                warn!("Failed to encode access token: {}", e);
                AuthError::TokenCreation
            },
        )?;

        Ok(IssuedAccess {
            token,
            // Second precision, so the value matches the signed `exp`
            expires_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or(expires_at),
        })
    }

    /// Generate an opaque refresh token
    pub fn issue_refresh(&self) -> String {
        let mut buffer = [0u8; REFRESH_TOKEN_BYTES];
        OsRng.fill_bytes(&mut buffer);
        URL_SAFE_NO_PAD.encode(buffer)
    }

    /// Verify signature, issuer, audience and expiry with no leeway
    pub fn verify_access(&self, token: &str) -> Verification {
        self.verify_with(token, &self.strict)
    }

    /// Verify everything except expiry; only the refresh flow uses this
    pub fn decode_ignoring_expiry(&self, token: &str) -> Verification {
        self.verify_with(token, &self.ignore_expiry)
    }

    fn verify_with(&self, token: &str, validation: &Validation) -> Verification {
        match decode::<AccessClaims>(token, &self.decoding, validation) {
            Ok(data) => Verification::Valid(data.claims),
            Err(e) => {
                debug!("Access token verification failed: {}", e);
                Verification::Invalid
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> JwtSettings {
        JwtSettings {
            secret_key: "codec-test-secret-codec-test-secret".to_string(),
            issuer: "sessionkit".to_string(),
            audience: "sessionkit-clients".to_string(),
            access_token_expiration_minutes: 15,
        }
    }

    fn identity() -> Identity {
        Identity::new(
            "a@b.com".to_string(),
            "$argon2id$placeholder".to_string(),
            Some("Ada".to_string()),
            None,
        )
    }

    #[test]
    fn test_issue_then_verify_returns_subject_and_email() {
        let codec = CredentialCodec::new(&settings()).unwrap();
        let identity = identity();

        let issued = codec.issue_access(&identity).unwrap();
        let claims = codec.verify_access(&issued.token).claims().unwrap();

        assert_eq!(claims.subject_id(), Some(identity.id));
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.given_name.as_deref(), Some("Ada"));
        assert!(claims.family_name.is_none());
        assert_eq!(claims.expires_at(), Some(issued.expires_at));
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_one_second_past_expiry_is_invalid() {
        let codec = CredentialCodec::new(&settings()).unwrap();
        let issued_at = Utc::now() - codec.access_lifetime() - Duration::seconds(1);

        let issued = codec.issue_access_at(&identity(), issued_at).unwrap();

        assert!(!codec.verify_access(&issued.token).is_valid());
        // The refresh path still recovers the subject
        assert!(codec.decode_ignoring_expiry(&issued.token).is_valid());
    }

    #[test]
    fn test_token_ids_are_unique() {
        let codec = CredentialCodec::new(&settings()).unwrap();
        let identity = identity();

        let first = codec.issue_access(&identity).unwrap();
        let second = codec.issue_access(&identity).unwrap();
        let first_jti = codec.verify_access(&first.token).claims().unwrap().jti;
        let second_jti = codec.verify_access(&second.token).claims().unwrap().jti;

        assert_ne!(first.token, second.token);
        assert_ne!(first_jti, second_jti);
    }

    #[test]
    fn test_wrong_issuer_audience_or_secret_is_invalid() {
        let codec = CredentialCodec::new(&settings()).unwrap();
        let token = codec.issue_access(&identity()).unwrap().token;

        let mut other = settings();
        other.issuer = "someone-else".to_string();
        assert!(!CredentialCodec::new(&other)
            .unwrap()
            .verify_access(&token)
            .is_valid());

        let mut other = settings();
        other.audience = "other-audience".to_string();
        assert!(!CredentialCodec::new(&other)
            .unwrap()
            .decode_ignoring_expiry(&token)
            .is_valid());

        let mut other = settings();
        other.secret_key = "a-completely-different-signing-secret".to_string();
        assert!(!CredentialCodec::new(&other)
            .unwrap()
            .verify_access(&token)
            .is_valid());
    }

    #[test]
    fn test_malformed_tokens_are_invalid() {
        let codec = CredentialCodec::new(&settings()).unwrap();

        for token in ["", "not-a-jwt", "a.b.c", "eyJhbGciOiJIUzI1NiJ9.e30.sig"] {
            assert!(!codec.verify_access(token).is_valid());
            assert!(!codec.decode_ignoring_expiry(token).is_valid());
        }
    }

    #[test]
    fn test_refresh_tokens_are_url_safe_and_random() {
        let codec = CredentialCodec::new(&settings()).unwrap();

        let first = codec.issue_refresh();
        let second = codec.issue_refresh();

        assert_ne!(first, second);
        // 32 bytes in unpadded base64
        assert_eq!(first.len(), 43);
        assert!(first
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_oversized_lifetime_fails_at_construction() {
        let mut broken = settings();
        broken.access_token_expiration_minutes = 1_000_000_000_000;
        assert!(matches!(
            CredentialCodec::new(&broken),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_expiry_overflow_is_a_creation_error() {
        let codec = CredentialCodec::new(&settings()).unwrap();

        let result = codec.issue_access_at(&identity(), DateTime::<Utc>::MAX_UTC);

        assert!(matches!(result, Err(AuthError::TokenCreation)));
    }

    #[test]
    fn test_missing_secret_fails_at_construction() {
        let mut broken = settings();
        broken.secret_key = String::new();
        assert!(matches!(
            CredentialCodec::new(&broken),
            Err(ConfigError::Missing("jwt.secret_key"))
        ));
    }
}
