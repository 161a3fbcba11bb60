//! OAuth password grant for the content hub

use linkedin_connector_domain::ContentSourceError;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::OnceCell;

/// Credentials for the OAuth password grant
#[derive(Debug, Clone)]
pub struct PasswordGrant {
    pub client_id: String,
    pub client_secret: SecretString,
    pub username: String,
    pub password: SecretString,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Fetches the access token on first use and keeps it for the process lifetime.
/// There is no refresh; an expired token makes later requests fail with `Auth`.
pub(crate) struct TokenProvider {
    grant: PasswordGrant,
    token: OnceCell<SecretString>,
}

impl TokenProvider {
    pub(crate) fn new(grant: PasswordGrant) -> Self {
        Self {
            grant,
            token: OnceCell::new(),
        }
    }

    pub(crate) async fn token(
        &self,
        client: &Client,
        base_url: &str,
    ) -> Result<&SecretString, ContentSourceError> {
        self.token
            .get_or_try_init(|| self.fetch(client, base_url))
            .await
    }

    async fn fetch(
        &self,
        client: &Client,
        base_url: &str,
    ) -> Result<SecretString, ContentSourceError> {
        let url = format!("{}/oauth/token", base_url);

        tracing::debug!(client_id = %self.grant.client_id, "Requesting content hub token");

        let form = [
            ("grant_type", "password"),
            ("client_id", self.grant.client_id.as_str()),
            ("client_secret", self.grant.client_secret.expose_secret()),
            ("username", self.grant.username.as_str()),
            ("password", self.grant.password.expose_secret()),
        ];

        let response = client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| ContentSourceError::Network(e.to_string()))?;

        let status = response.status();
        if status == 400 || status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(ContentSourceError::Auth(format!(
                "Token request rejected: {}",
                body
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContentSourceError::Api(format!(
                "Token request failed with {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ContentSourceError::InvalidResponse(e.to_string()))?;

        Ok(SecretString::new(token.access_token.into()))
    }
}
