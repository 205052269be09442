//! API configuration.

/// Photos requested per feed page.
pub const PER_PAGE: u32 = 10;

/// Endpoint and credential configuration for the photo API.
///
/// Constructed once at the composition root and shared by every
/// service. `standard()` carries the production endpoints; tests point
/// `base_url`/`token_url` at a mock server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Public application key, sent as `client_id`.
    pub access_key: String,
    /// Confidential application key, sent only during token exchange.
    pub secret_key: String,
    /// Redirect URI registered with the API.
    pub redirect_uri: String,
    /// OAuth scopes requested during authorization.
    pub access_scope: String,
    /// Base URL of the REST API.
    pub base_url: String,
    /// Token exchange endpoint (lives on the auth host, not the API host).
    pub token_url: String,
    /// Authorization page shown to the user before the code callback.
    pub authorize_url: String,
}

impl ApiConfig {
    /// Standard production configuration.
    pub fn standard(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            redirect_uri: "urn:ietf:wg:oauth:2.0:oob".to_string(),
            access_scope: "public+read_user+write_likes".to_string(),
            base_url: "https://api.example.com".to_string(),
            token_url: "https://api.example.com/oauth/token".to_string(),
            authorize_url: "https://api.example.com/oauth/authorize".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_defaults() {
        let config = ApiConfig::standard("ak", "sk");
        assert_eq!(config.access_key, "ak");
        assert_eq!(config.redirect_uri, "urn:ietf:wg:oauth:2.0:oob");
        assert!(config.token_url.ends_with("/oauth/token"));
    }
}
