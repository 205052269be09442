//! OAuth token exchange response.

use serde::Deserialize;

/// Body of a successful `POST /oauth/token` exchange.
///
/// The token itself is opaque; everything beyond `access_token` is
/// ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct OAuthTokenResponse {
    pub access_token: String,
}
