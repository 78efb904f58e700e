use actix_web::HttpRequest;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Cookie carrying the signed admin session token.
pub const SESSION_COOKIE: &str = "admin_session";

const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Claims encoded in the session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub admin: bool,
    pub iat: i64, // Issued at timestamp
    pub exp: i64, // Expiration timestamp
    pub jti: String, // Unique token identifier
}

/// Outcome of verifying a presented token. Absence, tampering, expiry and a
/// non-admin claim all collapse into `Anonymous`; callers cannot tell them
/// apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    AuthenticatedAdmin,
}

/// Stateless stand-in for a server-side session store: admin identity lives
/// entirely in an HMAC-signed token bound to the configured secret.
#[derive(Clone)]
pub struct SessionAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    admin_password: Option<String>,
}

impl SessionAuth {
    pub fn new(secret: &str, admin_password: Option<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            admin_password,
        }
    }

    /// Issues a signed admin token, valid for 24 hours. The `jti` nonce makes
    /// successive tokens distinct; all of them verify.
    pub fn issue_token(&self) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let claims = Claims {
            admin: true,
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Verifies a presented token. Never returns an error: any signature
    /// mismatch, malformed token, expired token, or `admin: false` claim
    /// yields `Anonymous`.
    pub fn verify_token(&self, token: &str) -> SessionState {
        match decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(data) if data.claims.admin => SessionState::AuthenticatedAdmin,
            _ => SessionState::Anonymous,
        }
    }

    /// Exact-match password check. Fails closed: with no password configured,
    /// every attempt is rejected.
    pub fn check_password(&self, supplied: &str) -> bool {
        match &self.admin_password {
            Some(expected) => supplied == expected,
            None => false,
        }
    }

    pub fn has_password_configured(&self) -> bool {
        self.admin_password.is_some()
    }

    /// Resolves the session state for a request from its session cookie.
    pub fn session_state(&self, req: &HttpRequest) -> SessionState {
        match req.cookie(SESSION_COOKIE) {
            Some(cookie) => self.verify_token(cookie.value()),
            None => SessionState::Anonymous,
        }
    }

    /// Gate for admin-only handlers; called before any data access runs.
    pub fn require_admin(&self, req: &HttpRequest) -> Result<(), ApiError> {
        match self.session_state(req) {
            SessionState::AuthenticatedAdmin => Ok(()),
            SessionState::Anonymous => Err(ApiError::Unauthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> SessionAuth {
        SessionAuth::new("test_secret_key", Some("hunter2".to_string()))
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let auth = auth();
        let token = auth.issue_token().unwrap();
        assert_eq!(auth.verify_token(&token), SessionState::AuthenticatedAdmin);
    }

    #[test]
    fn tokens_are_distinct_but_both_verify() {
        let auth = auth();
        let a = auth.issue_token().unwrap();
        let b = auth.issue_token().unwrap();
        assert_ne!(a, b);
        assert_eq!(auth.verify_token(&a), SessionState::AuthenticatedAdmin);
        assert_eq!(auth.verify_token(&b), SessionState::AuthenticatedAdmin);
    }

    #[test]
    fn token_expiry_is_set() {
        let auth = auth();
        let token = auth.issue_token().unwrap();
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test_secret_key"),
            &Validation::default(),
        )
        .unwrap();
        let expires_in = data.claims.exp - chrono::Utc::now().timestamp();
        assert!(expires_in > 23 * 3600);
        assert!(expires_in <= 24 * 3600);
    }

    #[test]
    fn tampered_token_is_anonymous() {
        let auth = auth();
        let token = auth.issue_token().unwrap();
        let mut chars: Vec<char> = token.chars().collect();
        let mid = chars.len() / 2;
        chars[mid] = if chars[mid] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();
        assert_eq!(auth.verify_token(&tampered), SessionState::Anonymous);
    }

    #[test]
    fn truncated_token_is_anonymous() {
        let auth = auth();
        let token = auth.issue_token().unwrap();
        assert_eq!(
            auth.verify_token(&token[..token.len() - 10]),
            SessionState::Anonymous
        );
    }

    #[test]
    fn malformed_token_is_anonymous() {
        assert_eq!(auth().verify_token("not-a-token"), SessionState::Anonymous);
        assert_eq!(auth().verify_token(""), SessionState::Anonymous);
    }

    #[test]
    fn foreign_secret_token_is_anonymous() {
        let issuer = SessionAuth::new("secret1", None);
        let verifier = SessionAuth::new("secret2", None);
        let token = issuer.issue_token().unwrap();
        assert_eq!(verifier.verify_token(&token), SessionState::Anonymous);
    }

    #[test]
    fn non_admin_claim_is_anonymous() {
        let auth = auth();
        let now = chrono::Utc::now();
        let claims = Claims {
            admin: false,
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(1)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        // Correctly signed, but the claim is not an admin claim.
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test_secret_key"),
        )
        .unwrap();
        assert_eq!(auth.verify_token(&token), SessionState::Anonymous);
    }

    #[test]
    fn expired_token_is_anonymous() {
        let auth = auth();
        let now = chrono::Utc::now();
        let claims = Claims {
            admin: true,
            iat: (now - chrono::Duration::hours(48)).timestamp(),
            exp: (now - chrono::Duration::hours(24)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test_secret_key"),
        )
        .unwrap();
        assert_eq!(auth.verify_token(&token), SessionState::Anonymous);
    }

    #[test]
    fn password_check_matches_exactly() {
        let auth = auth();
        assert!(auth.check_password("hunter2"));
        assert!(!auth.check_password("hunter3"));
        assert!(!auth.check_password(""));
        assert!(!auth.check_password("Hunter2"));
    }

    #[test]
    fn password_check_fails_closed_when_unconfigured() {
        let auth = SessionAuth::new("test_secret_key", None);
        assert!(!auth.check_password("hunter2"));
        assert!(!auth.check_password(""));
    }
}
