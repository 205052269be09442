//! # ImageFeed Core
//!
//! Network/session core for the ImageFeed client: OAuth2 token
//! exchange with request coalescing, a paginated photo feed with
//! dedup-merge semantics, profile and avatar caching, and a typed HTTP
//! pipeline with a uniform error taxonomy.
//!
//! Services are explicitly constructed and wired through
//! [`ImageFeedServices`] — there are no process-wide singletons. Each
//! service serializes its own state behind a mutex and publishes change
//! notifications over broadcast channels; subscribers unsubscribe by
//! dropping their receiver.

pub mod avatar;
pub mod config;
pub mod error;
pub mod feed;
pub mod http;
pub mod logout;
pub mod oauth;
pub mod profile;
pub mod token_store;

pub use avatar::{AvatarChange, AvatarUrlService};
pub use config::{ApiConfig, PER_PAGE};
pub use error::{ApiError, ApiResult};
pub use feed::{FeedChange, PhotoFeedService};
pub use http::ApiClient;
pub use logout::LogoutService;
pub use oauth::OAuth2Service;
pub use profile::ProfileService;
pub use token_store::{TokenStore, TokenStoreError};

use std::sync::Arc;

/// Composition root: constructs the shared HTTP client and token store
/// and wires every service through them.
#[derive(Clone)]
pub struct ImageFeedServices {
    pub token_store: Arc<TokenStore>,
    pub oauth: OAuth2Service,
    pub profile: ProfileService,
    pub avatar: AvatarUrlService,
    pub feed: PhotoFeedService,
    pub logout: LogoutService,
}

impl ImageFeedServices {
    /// Wire the services against the OS keyring token store.
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        Self::with_token_store(config, Arc::new(TokenStore::new()))
    }

    /// Wire the services against an injected token store (tests use the
    /// in-memory one).
    pub fn with_token_store(config: ApiConfig, token_store: Arc<TokenStore>) -> ApiResult<Self> {
        let api = ApiClient::new()?;

        let oauth = OAuth2Service::new(api.clone(), config.clone(), Arc::clone(&token_store));
        let profile = ProfileService::new(api.clone(), config.clone());
        let avatar = AvatarUrlService::new(api.clone(), config.clone(), Arc::clone(&token_store));
        let feed = PhotoFeedService::new(api, config, Arc::clone(&token_store));
        let logout = LogoutService::new(
            Arc::clone(&token_store),
            profile.clone(),
            avatar.clone(),
            feed.clone(),
        );

        Ok(Self { token_store, oauth, profile, avatar, feed, logout })
    }
}
