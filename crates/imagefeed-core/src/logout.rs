//! Session teardown.

use std::sync::Arc;

use crate::avatar::AvatarUrlService;
use crate::feed::PhotoFeedService;
use crate::profile::ProfileService;
use crate::token_store::TokenStore;

/// Orchestrates logout: token first, then each cached state, each step
/// independent of the others. No network calls.
#[derive(Clone)]
pub struct LogoutService {
    token_store: Arc<TokenStore>,
    profile: ProfileService,
    avatar: AvatarUrlService,
    feed: PhotoFeedService,
}

impl LogoutService {
    pub fn new(
        token_store: Arc<TokenStore>,
        profile: ProfileService,
        avatar: AvatarUrlService,
        feed: PhotoFeedService,
    ) -> Self {
        Self { token_store, profile, avatar, feed }
    }

    pub async fn logout(&self) {
        if let Err(e) = self.token_store.set(None) {
            tracing::warn!(error = %e, "failed to clear stored token");
        }
        self.profile.clear().await;
        self.avatar.clear().await;
        self.feed.clear().await;
        tracing::info!("session torn down");
    }
}
