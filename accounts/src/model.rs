//! Account domain models.

use chrono::{DateTime, Utc};
use fitsync_core::entity::Entity;
use serde::{Deserialize, Serialize};

/// Unique identifier for a user account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap an existing id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Third-party identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThirdPartyProvider {
    /// Google sign-in.
    Google,
    /// Facebook sign-in.
    Facebook,
}

impl ThirdPartyProvider {
    /// Provider name as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
        }
    }
}

/// The authenticated principal as reported by the auth gateway.
///
/// This is the gateway's view of the account, not the stored profile; the
/// profile record ([`PublicUser`]) is created or refreshed from it during
/// the auth workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Account id.
    pub id: UserId,
    /// Email address.
    pub email: String,
    /// Display name, when the provider supplies one.
    pub display_name: Option<String>,
    /// Avatar URL, when the provider supplies one.
    pub avatar_url: Option<String>,
    /// Whether the email address has been verified.
    pub email_verified: bool,
}

/// The stored user profile record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    /// Account id.
    pub id: UserId,
    /// Email address.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Avatar URL, if set.
    pub avatar_url: Option<String>,
    /// Administrator flag (set server-side only).
    pub is_admin: bool,
    /// Whether the email address has been verified.
    pub email_verified: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial update payload for the user profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserChanges {
    /// New display name.
    pub display_name: Option<String>,
    /// New avatar URL.
    pub avatar_url: Option<String>,
    /// New verification state.
    pub email_verified: Option<bool>,
    /// New update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for PublicUser {
    type Id = UserId;
    type Changes = UserChanges;

    fn id(&self) -> &UserId {
        &self.id
    }

    fn apply(&mut self, changes: &UserChanges) {
        if let Some(display_name) = &changes.display_name {
            self.display_name = display_name.clone();
        }
        if let Some(avatar_url) = &changes.avatar_url {
            self.avatar_url = Some(avatar_url.clone());
        }
        if let Some(email_verified) = changes.email_verified {
            self.email_verified = email_verified;
        }
        if let Some(updated_at) = changes.updated_at {
            self.updated_at = updated_at;
        }
    }
}

/// Derive a display name for a fresh profile.
///
/// Prefers the provider-supplied name, falling back to the local part of
/// the email address.
#[must_use]
pub fn default_display_name(user: &AuthUser) -> String {
    user.display_name.clone().unwrap_or_else(|| {
        user.email
            .split('@')
            .next()
            .unwrap_or(user.email.as_str())
            .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_email_local_part() {
        let user = AuthUser {
            id: UserId::new("u-1"),
            email: "casey@example.com".to_string(),
            display_name: None,
            avatar_url: None,
            email_verified: false,
        };
        assert_eq!(default_display_name(&user), "casey");

        let named = AuthUser { display_name: Some("Casey".to_string()), ..user };
        assert_eq!(default_display_name(&named), "Casey");
    }

    #[test]
    fn apply_merges_profile_changes() {
        let now = Utc::now();
        let mut profile = PublicUser {
            id: UserId::new("u-1"),
            email: "casey@example.com".to_string(),
            display_name: "casey".to_string(),
            avatar_url: None,
            is_admin: false,
            email_verified: false,
            created_at: now,
            updated_at: now,
        };

        profile.apply(&UserChanges {
            display_name: Some("Casey R".to_string()),
            email_verified: Some(true),
            ..UserChanges::default()
        });

        assert_eq!(profile.display_name, "Casey R");
        assert!(profile.email_verified);
        assert!(profile.avatar_url.is_none());
    }
}
