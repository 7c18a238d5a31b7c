//! Service-account authentication via the OAuth2 JWT-bearer grant.

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use crate::conf::{C_GRANT_TYPE_JWT_BEARER, C_SCOPE_SPREADSHEETS, N_SECS_ASSERTION_LIFETIME};
use crate::spec::{GSheetError, SpecServiceAccountCredentials};

/// Claim set of a service-account assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecAssertionClaims {
    /// Issuer: the service-account email.
    pub iss: String,
    /// Space-separated scopes.
    pub scope: String,
    /// Audience: the token URI.
    pub aud: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

impl SpecAssertionClaims {
    pub fn new(client_email: &str, token_uri: &str, n_secs_now: i64) -> Self {
        Self {
            iss: client_email.to_string(),
            scope: C_SCOPE_SPREADSHEETS.to_string(),
            aud: token_uri.to_string(),
            iat: n_secs_now,
            exp: n_secs_now + N_SECS_ASSERTION_LIFETIME,
        }
    }
}

/// Bearer token returned by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpecAccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Sign an RS256 assertion for `credentials`.
///
/// `credentials.private_key` must already carry real line breaks.
pub fn sign_assertion(
    credentials: &SpecServiceAccountCredentials,
    token_uri: &str,
    n_secs_now: i64,
) -> Result<String, GSheetError> {
    let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())
        .map_err(|err| GSheetError::InvalidPrivateKey(err.to_string()))?;
    let claims = SpecAssertionClaims::new(&credentials.client_email, token_uri, n_secs_now);
    encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|err| GSheetError::Signing(err.to_string()))
}

/// Exchanges signed assertions for access tokens.
#[derive(Debug, Clone)]
pub struct ServiceAccountAuthenticator {
    client: reqwest::Client,
    token_uri: String,
}

impl ServiceAccountAuthenticator {
    pub fn new(client: reqwest::Client, token_uri: impl Into<String>) -> Self {
        Self {
            client,
            token_uri: token_uri.into(),
        }
    }

    /// Sign a fresh assertion and trade it for a bearer token.
    ///
    /// Tokens are not cached: every invocation authenticates once.
    pub async fn fetch_access_token(
        &self,
        credentials: &SpecServiceAccountCredentials,
    ) -> Result<SpecAccessToken, GSheetError> {
        let assertion = sign_assertion(
            credentials,
            &self.token_uri,
            chrono::Utc::now().timestamp(),
        )?;

        tracing::debug!(
            client_email = %credentials.client_email,
            token_uri = %self.token_uri,
            "requesting access token"
        );
        let resp = self
            .client
            .post(&self.token_uri)
            .form(&[
                ("grant_type", C_GRANT_TYPE_JWT_BEARER),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GSheetError::TokenExchange {
                status: status.as_u16(),
                body,
            });
        }

        let token: SpecAccessToken = resp.json().await?;
        Ok(token)
    }
}
