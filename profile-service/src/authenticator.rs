use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    /// The provider rejected the credentials. Deliberately never
    /// distinguishes an unknown user from a wrong password.
    #[error("invalid username or password")]
    Rejected,
    /// The provider could not be reached within the bounded timeout.
    #[error("authenticator unavailable: {0}")]
    Unavailable(String),
}

/// Trust boundary with the external identity provider. The service never
/// stores or compares passwords itself; tests substitute their own
/// implementation.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> Result<(), CredentialError>;
}

/// Delegates credential checks to the upstream authenticator endpoint using
/// HTTP basic auth. One GET, no body, no retry.
pub struct HttpAuthenticator {
    client: Client,
    url: String,
}

impl HttpAuthenticator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CredentialVerifier for HttpAuthenticator {
    async fn verify(&self, username: &str, password: &str) -> Result<(), CredentialError> {
        let response = self
            .client
            .get(&self.url)
            .basic_auth(username, Some(password))
            .send()
            .await
            .map_err(|err| CredentialError::Unavailable(err.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CredentialError::Rejected)
        }
    }
}
