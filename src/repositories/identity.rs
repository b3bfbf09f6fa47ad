use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("missing or invalid credential")]
    Unauthenticated,
    #[error("could not reach identity provider: {0}")]
    Transport(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

/// Exchanges a bearer token for a user identity against the external auth
/// provider. Token validation itself happens upstream; this client only
/// relays the credential.
#[derive(Clone)]
pub struct IdentityClient {
    url: String,
    client: reqwest::Client,
}

impl IdentityClient {
    pub fn new(url: String) -> Self {
        IdentityClient {
            url,
            client: reqwest::Client::new(),
        }
    }

    pub async fn verify(&self, token: &str) -> Result<Identity, IdentityError> {
        let response = self
            .client
            .get(format!("{}/user", self.url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IdentityError::Unauthenticated);
        }

        response
            .json::<Identity>()
            .await
            .map_err(|_| IdentityError::Unauthenticated)
    }
}
