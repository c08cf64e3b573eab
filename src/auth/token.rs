//! Stateless bearer tokens (HS256 JWT).
//!
//! A token carries `{sub: account id, email, iat, exp}` and nothing secret.
//! There is no session table: a token is good until `exp`, and expiry is the
//! only way one stops working.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::model::{Account, Identity};
use crate::error::{AppError, AppResult, AuthError};

pub const TOKEN_TTL_MINUTES: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(TOKEN_TTL_MINUTES),
        }
    }

    /// Signs a token for `account` valid from `now` for the fixed TTL.
    /// `iat` is `now` rounded down to the whole second and the TTL counts
    /// from that embedded `iat`, so a token issued at `hh:mm:ss.900` stops
    /// working up to a second before `now + TTL`.
    pub fn issue_at(&self, account: &Account, now: DateTime<Utc>) -> AppResult<String> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: account.id.to_string(),
            email: account.email.clone(),
            iat,
            exp: iat + self.ttl.num_seconds(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| AppError::Internal(format!("jwt encode error: {e}")))
    }
}

#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against our own clock in `verify_at`; the
        // library only has to insist that the claim is there.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Valid strictly before `exp`. Every failure is the same error.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        let claims = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| {
                tracing::debug!("jwt decode error: {}", e);
                AuthError::InvalidOrExpiredToken
            })?
            .claims;

        // `exp` is `iat + TTL` with `iat` already truncated to the second.
        if now.timestamp() >= claims.exp {
            tracing::debug!("jwt expired at {}", claims.exp);
            return Err(AuthError::InvalidOrExpiredToken);
        }

        let account_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidOrExpiredToken)?;

        Ok(Identity {
            account_id,
            email: claims.email,
        })
    }

    /// Resolve an `Authorization` header value into an identity.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Identity, AuthError> {
        let token = authorization
            .and_then(bearer_token)
            .ok_or(AuthError::MissingToken)?;
        self.verify(token)
    }
}

/// Pull the credential out of `Bearer <token>`. The scheme is matched
/// case-insensitively.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &str = "test-secret";

    fn alice() -> Account {
        Account {
            id: 42,
            name: "Alice".into(),
            email: "alice@x.com".into(),
            secret_hash: "irrelevant".into(),
        }
    }

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn claims_round_trip_identity() {
        let token = TokenIssuer::new(SECRET).issue_at(&alice(), issued_at()).unwrap();
        let identity = TokenVerifier::new(SECRET)
            .verify_at(&token, issued_at())
            .unwrap();

        assert_eq!(
            identity,
            Identity {
                account_id: 42,
                email: "alice@x.com".into()
            }
        );
    }

    #[test]
    fn valid_until_exactly_sixty_minutes() {
        let token = TokenIssuer::new(SECRET).issue_at(&alice(), issued_at()).unwrap();
        let verifier = TokenVerifier::new(SECRET);
        let expiry = issued_at() + Duration::minutes(TOKEN_TTL_MINUTES);

        assert!(verifier.verify_at(&token, expiry - Duration::seconds(1)).is_ok());
        assert!(verifier
            .verify_at(&token, expiry - Duration::milliseconds(1))
            .is_ok());
        assert_eq!(
            verifier.verify_at(&token, expiry),
            Err(AuthError::InvalidOrExpiredToken)
        );
        assert_eq!(
            verifier.verify_at(&token, expiry + Duration::days(1)),
            Err(AuthError::InvalidOrExpiredToken)
        );
    }

    #[test]
    fn ttl_counts_from_truncated_issue_second() {
        let now = issued_at() + Duration::milliseconds(900);
        let token = TokenIssuer::new(SECRET).issue_at(&alice(), now).unwrap();
        let verifier = TokenVerifier::new(SECRET);
        let expiry = issued_at() + Duration::minutes(TOKEN_TTL_MINUTES);

        assert!(verifier
            .verify_at(&token, expiry - Duration::milliseconds(1))
            .is_ok());
        // still short of `now + TTL`, but past the embedded `exp`
        assert!(expiry < now + Duration::minutes(TOKEN_TTL_MINUTES));
        assert_eq!(
            verifier.verify_at(&token, expiry),
            Err(AuthError::InvalidOrExpiredToken)
        );
    }

    #[test]
    fn wrong_key_and_garbage_collapse_to_one_error() {
        let token = TokenIssuer::new("other-secret")
            .issue_at(&alice(), issued_at())
            .unwrap();
        let verifier = TokenVerifier::new(SECRET);

        assert_eq!(
            verifier.verify_at(&token, issued_at()),
            Err(AuthError::InvalidOrExpiredToken)
        );
        assert_eq!(
            verifier.verify_at("not.a.jwt", issued_at()),
            Err(AuthError::InvalidOrExpiredToken)
        );
        assert_eq!(
            verifier.verify_at("", issued_at()),
            Err(AuthError::InvalidOrExpiredToken)
        );
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let token = TokenIssuer::new(SECRET).issue_at(&alice(), issued_at()).unwrap();
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = TokenIssuer::new(SECRET)
            .issue_at(
                &Account {
                    id: 7,
                    ..alice()
                },
                issued_at(),
            )
            .unwrap();
        parts[1] = forged.split('.').nth(1).unwrap().to_string();

        assert_eq!(
            TokenVerifier::new(SECRET).verify_at(&parts.join("."), issued_at()),
            Err(AuthError::InvalidOrExpiredToken)
        );
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[test]
    fn authenticate_requires_a_header() {
        let verifier = TokenVerifier::new(SECRET);
        assert_eq!(verifier.authenticate(None), Err(AuthError::MissingToken));
        assert_eq!(
            verifier.authenticate(Some("Token abc")),
            Err(AuthError::MissingToken)
        );

        let token = TokenIssuer::new(SECRET)
            .issue_at(&alice(), Utc::now())
            .unwrap();
        let header = format!("Bearer {token}");
        assert_eq!(verifier.authenticate(Some(&header)).unwrap().account_id, 42);
    }
}
