//! Profile data models.

use serde::Deserialize;

/// Raw profile record as returned by `GET /me`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProfileRecord {
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// The current user's profile as cached by the profile service.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub username: String,
    /// First and last name joined with a space; missing parts are skipped.
    pub display_name: String,
    /// Username prefixed with `@`.
    pub login_handle: String,
    pub bio: Option<String>,
}

impl From<ProfileRecord> for Profile {
    fn from(record: ProfileRecord) -> Self {
        let display_name = [record.first_name.as_deref(), record.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            login_handle: format!("@{}", record.username),
            username: record.username,
            display_name,
            bio: record.bio,
        }
    }
}

/// Profile image URL variants of a user record.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProfileImageRecord {
    pub small: String,
}

/// Raw user record as returned by `GET /users/{username}`; only the
/// profile image is consumed.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct UserRecord {
    pub profile_image: ProfileImageRecord,
}
