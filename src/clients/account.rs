use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::api::ApiClient;
use crate::domain::{CrewMember, Profile, ProfilePatch, Registration, Role, User};
use crate::error::{AccountError, ApiError, SessionError};
use crate::session::{Session, Tokens};

#[derive(Debug, Deserialize)]
struct RoleResponse {
    role: Role,
}

/// Client for identity and account operations: registration, login, profile
/// self-service, role lookup and the delivery-crew directory.
#[derive(Clone)]
pub struct AccountClient {
    api: ApiClient,
}

impl AccountClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Registers a new account. Role assignment happens server-side; the
    /// new user logs in afterwards as usual.
    #[instrument(fields(username = %registration.username), skip(self, registration))]
    pub async fn register(&self, registration: &Registration) -> Result<(), AccountError> {
        debug!("Sending request");
        match self.api.post::<_, serde_json::Value>("/auth/users/", registration).await {
            Ok(_) => {
                info!("Account registered");
                Ok(())
            }
            Err(ApiError::BadRequest { detail }) => Err(AccountError::Validation(detail)),
            Err(err) => Err(err.into()),
        }
    }

    /// Exchanges credentials for a token pair, then assembles the session
    /// identity from `/auth/users/me/`, `/api/user-role/` and
    /// `/api/profile/`.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, SessionError> {
        debug!("Requesting token pair");
        let tokens: Tokens = self
            .api
            .post("/auth/jwt/create/", &json!({ "username": username, "password": password }))
            .await
            .map_err(|err| match err {
                ApiError::Unauthorized => SessionError::InvalidCredentials,
                err => SessionError::Api(err),
            })?;
        self.api.set_tokens(tokens).await;

        let mut user: User = self.api.get("/auth/users/me/").await?;
        let RoleResponse { role } = self.api.get("/api/user-role/").await?;
        // The profile endpoint is authoritative for names and email.
        let profile: Profile = self.api.get("/api/profile/").await?;
        user.first_name = profile.first_name;
        user.last_name = profile.last_name;
        user.email = profile.email;

        info!(user = %user.username, ?role, "Login complete");
        Ok(Session::new(user, role))
    }

    /// Tears the session down. Local state only; the backend holds no
    /// session to invalidate.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        self.api.clear_tokens().await;
        info!("Session cleared");
    }

    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<Profile, AccountError> {
        debug!("Sending request");
        self.api.get("/api/profile/").await.map_err(AccountError::from)
    }

    /// Updates names and/or email. The username is immutable and never part
    /// of the patch.
    #[instrument(skip(self, patch))]
    pub async fn update_profile(&self, patch: &ProfilePatch) -> Result<Profile, AccountError> {
        debug!("Sending request");
        match self.api.patch("/api/profile/", patch).await {
            Ok(profile) => Ok(profile),
            Err(ApiError::BadRequest { detail }) => Err(AccountError::Validation(detail)),
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn role(&self) -> Result<Role, AccountError> {
        debug!("Sending request");
        let RoleResponse { role } = self.api.get("/api/user-role/").await?;
        Ok(role)
    }

    /// The delivery-crew directory, including each member's current
    /// out-for-delivery load.
    #[instrument(skip(self))]
    pub async fn delivery_crew(&self) -> Result<Vec<CrewMember>, AccountError> {
        debug!("Sending request");
        self.api
            .get("/api/users/delivery-crew/")
            .await
            .map_err(AccountError::from)
    }
}
