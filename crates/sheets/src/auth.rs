//! Service-account OAuth: RS256 JWT assertions exchanged for bearer tokens.
//!
//! The assertion is signed with the key's private key and traded at the
//! key's `token_uri` using the JWT-bearer grant. The resulting token is
//! reused until shortly before it expires.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::credentials::ServiceAccountKey;
use crate::error::SheetsError;

/// OAuth scopes requested for every token.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive.file",
];

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Maximum assertion lifetime Google accepts.
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the token's stated expiry.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Claims of the signed assertion sent to the token endpoint.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AssertionClaims {
    /// Issuer -- the service account's email.
    pub iss: String,
    /// Space-separated scopes.
    pub scope: String,
    /// Audience -- the token endpoint.
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Build and sign an assertion for `key`, issued at `now` (Unix seconds).
pub fn build_assertion(key: &ServiceAccountKey, now: i64) -> Result<String, SheetsError> {
    let claims = AssertionClaims {
        iss: key.client_email.clone(),
        scope: SCOPES.join(" "),
        aud: key.token_uri.clone(),
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| SheetsError::Auth(format!("invalid private key: {e}")))?;

    encode(&header, &claims, &signing_key)
        .map_err(|e| SheetsError::Auth(format!("failed to sign assertion: {e}")))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

struct BearerToken {
    value: String,
    expires_at: i64,
}

/// Hands out bearer tokens for one service account.
pub struct TokenProvider {
    http: reqwest::Client,
    key: ServiceAccountKey,
    current: Mutex<Option<BearerToken>>,
}

impl TokenProvider {
    pub fn new(http: reqwest::Client, key: ServiceAccountKey) -> Self {
        Self {
            http,
            key,
            current: Mutex::new(None),
        }
    }

    pub fn key(&self) -> &ServiceAccountKey {
        &self.key
    }

    /// Return a valid bearer token, exchanging a fresh assertion if needed.
    pub async fn access_token(&self) -> Result<String, SheetsError> {
        let mut current = self.current.lock().await;
        let now = chrono::Utc::now().timestamp();

        if let Some(token) = current.as_ref() {
            if token.expires_at - REFRESH_MARGIN_SECS > now {
                return Ok(token.value.clone());
            }
        }

        let token = self.exchange(now).await?;
        let value = token.value.clone();
        *current = Some(token);
        Ok(value)
    }

    async fn exchange(&self, now: i64) -> Result<BearerToken, SheetsError> {
        let assertion = build_assertion(&self.key, now)?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SheetsError::Auth(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!(
            service_account = %self.key.client_email,
            expires_in = token.expires_in,
            "Obtained access token"
        );

        Ok(BearerToken {
            value: token.access_token,
            expires_at: now + token.expires_in,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};

    use super::*;

    const PRIVATE_KEY: &str = include_str!("../tests/fixtures/test_key.pem");
    const PUBLIC_KEY: &str = include_str!("../tests/fixtures/test_key.pub.pem");

    fn test_key(private_key: &str) -> ServiceAccountKey {
        ServiceAccountKey {
            client_email: "intake@forms-prod.iam.gserviceaccount.com".to_string(),
            private_key: private_key.to_string(),
            private_key_id: Some("key-1".to_string()),
            project_id: Some("forms-prod".to_string()),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
        }
    }

    #[test]
    fn assertion_is_signed_with_service_account_key() {
        let now = chrono::Utc::now().timestamp();
        let token = build_assertion(&test_key(PRIVATE_KEY), now).expect("signing should succeed");

        let header = decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("key-1"));

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&["https://oauth2.googleapis.com/token"]);
        let claims = decode::<AssertionClaims>(
            &token,
            &DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap(),
            &validation,
        )
        .expect("assertion should verify with the public key")
        .claims;

        assert_eq!(claims.iss, "intake@forms-prod.iam.gserviceaccount.com");
        assert_eq!(
            claims.scope,
            "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive.file"
        );
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn garbage_private_key_is_an_auth_error() {
        let result = build_assertion(&test_key("not a pem"), 0);
        assert_matches!(result, Err(SheetsError::Auth(msg)) => {
            assert!(msg.starts_with("invalid private key"));
        });
    }
}
