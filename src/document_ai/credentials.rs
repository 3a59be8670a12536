//! OAuth2 credential providers for the Document AI REST API.
//!
//! Credentials are injected into the client explicitly. The adapter never
//! mutates process environment to point at a key file.
//!
//! # Providers
//!
//! - [`StaticToken`] - a pre-issued access token
//! - [`ServiceAccountCredentials`] - service account key file (JWT bearer grant)
//! - [`AuthorizedUserCredentials`] - gcloud user credentials (refresh token grant)

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::provider::ProcessingError;

/// OAuth2 scope covering Document AI.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Google's OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Environment variable naming a credentials file.
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Environment variable holding a ready-made access token.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

const ADC_FILE_NAME: &str = "application_default_credentials.json";
/// OAuth2 grant type used for service account assertions.
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Source of bearer tokens for remote calls.
#[async_trait]
pub trait CredentialsProvider: Send + Sync + std::fmt::Debug {
    /// Obtain an access token for the next request.
    async fn access_token(&self) -> Result<String, ProcessingError>;

    /// Get the provider name for logging and debugging.
    fn provider_name(&self) -> &'static str;
}

/// A pre-issued access token, e.g. from `gcloud auth print-access-token`.
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken").finish_non_exhaustive()
    }
}

#[async_trait]
impl CredentialsProvider for StaticToken {
    async fn access_token(&self) -> Result<String, ProcessingError> {
        Ok(self.token.clone())
    }

    fn provider_name(&self) -> &'static str {
        "Static token"
    }
}

/// On-disk credential file formats understood by [`load_credentials_file`].
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum CredentialsFile {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUserKey),
}

#[derive(Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct AuthorizedUserKey {
    client_id: String,
    client_secret: String,
    refresh_token: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

impl std::fmt::Debug for AuthorizedUserKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedUserKey")
            .field("client_id", &self.client_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Service account key credentials.
pub struct ServiceAccountCredentials {
    client: reqwest::Client,
    client_email: String,
    token_uri: String,
    signing_key: EncodingKey,
}

impl ServiceAccountCredentials {
    fn from_key(key: ServiceAccountKey) -> Result<Self, ProcessingError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            ProcessingError::Configuration(format!("Invalid service account private key: {e}"))
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            client_email: key.client_email,
            token_uri: key.token_uri,
            signing_key,
        })
    }

    /// Service account identity used as the assertion issuer.
    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    fn signed_assertion(&self) -> Result<String, ProcessingError> {
        let iat = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| ProcessingError::transport(format!("Failed to sign token assertion: {e}")))
    }
}

impl std::fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CredentialsProvider for ServiceAccountCredentials {
    async fn access_token(&self) -> Result<String, ProcessingError> {
        tracing::debug!(
            name: "docai.credentials.exchange",
            client_email = %self.client_email(),
            token_uri = %self.token_uri,
            "Exchanging service account assertion"
        );
        let assertion = self.signed_assertion()?;
        let request = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())]);

        exchange_token(request).await
    }

    fn provider_name(&self) -> &'static str {
        "Service account"
    }
}

/// gcloud user credentials holding a long-lived refresh token.
pub struct AuthorizedUserCredentials {
    client: reqwest::Client,
    key: AuthorizedUserKey,
}

impl AuthorizedUserCredentials {
    fn from_key(key: AuthorizedUserKey) -> Self {
        Self {
            client: reqwest::Client::new(),
            key,
        }
    }
}

impl std::fmt::Debug for AuthorizedUserCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedUserCredentials")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CredentialsProvider for AuthorizedUserCredentials {
    async fn access_token(&self) -> Result<String, ProcessingError> {
        let request = self.client.post(&self.key.token_uri).form(&[
            ("grant_type", "refresh_token"),
            ("client_id", self.key.client_id.as_str()),
            ("client_secret", self.key.client_secret.as_str()),
            ("refresh_token", self.key.refresh_token.as_str()),
        ]);

        exchange_token(request).await
    }

    fn provider_name(&self) -> &'static str {
        "Authorized user"
    }
}

async fn exchange_token(request: reqwest::RequestBuilder) -> Result<String, ProcessingError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProcessingError::transport(format!("Token exchange failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(ProcessingError::RemoteService {
            status: Some(status.as_u16()),
            message: format!("Token exchange rejected: {error_text}"),
        });
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| ProcessingError::transport(format!("Malformed token response: {e}")))?;

    Ok(token.access_token)
}

/// Load a credentials file and build the matching provider.
///
/// Supports `service_account` and `authorized_user` files. Any read or
/// parse failure is reported as [`ProcessingError::Configuration`].
pub fn load_credentials_file(
    path: impl AsRef<Path>,
) -> Result<Arc<dyn CredentialsProvider>, ProcessingError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ProcessingError::Configuration(format!(
            "Cannot read credentials file {}: {e}",
            path.display()
        ))
    })?;

    let file: CredentialsFile = serde_json::from_str(&raw).map_err(|e| {
        ProcessingError::Configuration(format!(
            "Unsupported credentials file {}: {e}",
            path.display()
        ))
    })?;

    let provider: Arc<dyn CredentialsProvider> = match file {
        CredentialsFile::ServiceAccount(key) => Arc::new(ServiceAccountCredentials::from_key(key)?),
        CredentialsFile::AuthorizedUser(key) => Arc::new(AuthorizedUserCredentials::from_key(key)),
    };

    tracing::debug!(
        name: "docai.credentials.loaded",
        path = %path.display(),
        provider = provider.provider_name(),
        "Credentials file loaded"
    );

    Ok(provider)
}

/// Location of the gcloud application-default credentials file.
fn well_known_adc_path() -> Option<PathBuf> {
    let config_dir = match std::env::var_os("CLOUDSDK_CONFIG") {
        Some(dir) => PathBuf::from(dir),
        None => dirs::config_dir()?.join("gcloud"),
    };
    Some(config_dir.join(ADC_FILE_NAME))
}

/// Resolve credentials from the environment.
///
/// Checks, in order: [`CREDENTIALS_ENV`], [`ACCESS_TOKEN_ENV`], then the
/// gcloud application-default credentials file.
pub fn resolve_ambient() -> Result<Arc<dyn CredentialsProvider>, ProcessingError> {
    if let Some(path) = std::env::var_os(CREDENTIALS_ENV).filter(|p| !p.is_empty()) {
        tracing::info!(
            name: "docai.credentials.resolved",
            source = CREDENTIALS_ENV,
            "Using credentials file from environment"
        );
        return load_credentials_file(PathBuf::from(path));
    }

    if let Some(token) = std::env::var(ACCESS_TOKEN_ENV)
        .ok()
        .filter(|t| !t.trim().is_empty())
    {
        tracing::info!(
            name: "docai.credentials.resolved",
            source = ACCESS_TOKEN_ENV,
            "Using access token from environment"
        );
        return Ok(Arc::new(StaticToken::new(token.trim())));
    }

    if let Some(path) = well_known_adc_path().filter(|p| p.is_file()) {
        tracing::info!(
            name: "docai.credentials.resolved",
            source = "gcloud",
            path = %path.display(),
            "Using gcloud application-default credentials"
        );
        return load_credentials_file(path);
    }

    Err(ProcessingError::Configuration(format!(
        "No credentials found: pass a credentials file, set {CREDENTIALS_ENV} or \
         {ACCESS_TOKEN_ENV}, or run `gcloud auth application-default login`"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_json(value: &serde_json::Value) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(file, "{value}").unwrap();
        file
    }

    #[tokio::test]
    async fn test_static_token() {
        let provider = StaticToken::new("ya29.token");
        assert_eq!(provider.access_token().await.unwrap(), "ya29.token");
        assert_eq!(provider.provider_name(), "Static token");
    }

    #[test]
    fn test_static_token_debug_hides_secret() {
        let rendered = format!("{:?}", StaticToken::new("ya29.secret"));
        assert!(!rendered.contains("ya29.secret"));
    }

    #[test]
    fn test_load_authorized_user_file() {
        let file = write_json(&serde_json::json!({
            "type": "authorized_user",
            "client_id": "id.apps.googleusercontent.com",
            "client_secret": "secret",
            "refresh_token": "1//refresh"
        }));

        let provider = load_credentials_file(file.path()).unwrap();
        assert_eq!(provider.provider_name(), "Authorized user");
        assert!(!format!("{provider:?}").contains("1//refresh"));
    }

    #[test]
    fn test_invalid_private_key_is_configuration_error() {
        let file = write_json(&serde_json::json!({
            "type": "service_account",
            "client_email": "svc@project.iam.gserviceaccount.com",
            "private_key": "not a pem key"
        }));

        let err = load_credentials_file(file.path()).unwrap_err();
        assert!(matches!(err, ProcessingError::Configuration(_)));
    }

    #[test]
    fn test_unknown_credentials_type() {
        let file = write_json(&serde_json::json!({ "type": "external_account" }));
        let err = load_credentials_file(file.path()).unwrap_err();
        assert!(matches!(err, ProcessingError::Configuration(msg) if msg.contains("Unsupported")));
    }

    #[test]
    fn test_missing_credentials_file() {
        let err = load_credentials_file("/nonexistent/key.json").unwrap_err();
        assert!(matches!(err, ProcessingError::Configuration(msg) if msg.contains("Cannot read")));
    }
}
