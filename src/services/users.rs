use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::models::profiles::UserProfile;
use crate::repositories::ProfileStore;

use super::{RequestHandler, Service, ServiceError};

pub enum UserRequest {
    GetProfile {
        id: String,
        email: String,
        response: oneshot::Sender<Result<UserProfile, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct UserRequestHandler {
    profiles: Arc<dyn ProfileStore>,
}

impl UserRequestHandler {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        UserRequestHandler { profiles }
    }

    /// Profiles are created lazily on first fetch, counter at 0.
    async fn get_profile(&self, id: &str, email: &str) -> Result<UserProfile, ServiceError> {
        let profile = self
            .profiles
            .get_profile(id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        match profile {
            Some(profile) => Ok(profile),
            None => self
                .profiles
                .create_default_profile(id, email)
                .await
                .map_err(|e| ServiceError::Database(e.to_string())),
        }
    }
}

#[async_trait]
impl RequestHandler<UserRequest> for UserRequestHandler {
    async fn handle_request(&self, request: UserRequest) {
        match request {
            UserRequest::GetProfile {
                id,
                email,
                response,
            } => {
                let profile = self.get_profile(&id, &email).await;
                let _ = response.send(profile);
            }
        }
    }
}

pub struct UserService;

impl UserService {
    pub fn new() -> Self {
        UserService {}
    }
}

#[async_trait]
impl Service<UserRequest, UserRequestHandler> for UserService {}
