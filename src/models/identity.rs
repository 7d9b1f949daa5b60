use serde::{Deserialize, Serialize};

/// Distinguished role granting roster read/write access
pub const ADMIN_ROLE: &str = "ROLE_ADMIN";

/// The authenticated principal: id, display fields, and role set.
///
/// The role set is immutable for the lifetime of a session and is only
/// re-derived by a fresh sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == ADMIN_ROLE)
    }

    /// Name to greet the user with: display name, else username.
    pub fn display(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// Response from `POST /auth/signin` and `POST /auth/signup`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl AuthResponse {
    /// Split into the bearer token and the identity it belongs to.
    pub fn into_parts(self) -> (String, Identity) {
        let identity = Identity {
            id: self.id,
            username: self.username,
            email: self.email,
            display_name: None,
            roles: self.roles,
        };
        (self.access_token, identity)
    }
}

/// Profile object from `GET /profile`.
///
/// The synchronization layer fetches this for its auth signal; none of the
/// fields feed the account snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// One entry of the full client roster (privileged identities only).
///
/// Mutated server-side by the blacklist toggle; locally always replaced by
/// a re-fetch, never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "isBlacklisted", alias = "blacklisted", default)]
    pub is_blacklisted: bool,
}
