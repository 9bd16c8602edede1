use serde::{Deserialize, Serialize};

use crate::domain::{Role, User};

/// Access/refresh token pair issued by `/auth/jwt/create/`.
///
/// The access token rides every request as a bearer header; the refresh
/// token is spent only by the single refresh-on-401 retry. Tokens are the
/// only state this client keeps across operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    pub access: String,
    pub refresh: String,
}

/// The authenticated identity for a running app: who is logged in and in
/// which role. Built once at login and injected where needed, never read
/// from ambient global state.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub role: Role,
}

impl Session {
    pub fn new(user: User, role: Role) -> Self {
        Self { user, role }
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }
}
