//! Profile image URL fetching.
//!
//! Unlike the profile service there is no coalescing here: a new fetch
//! always supersedes the in-flight one. Successful fetches update the
//! cached URL and broadcast a change event carrying the new URL.

use std::sync::Arc;

use tokio::sync::{broadcast, oneshot, Mutex};
use tokio::task::JoinHandle;

use imagefeed_types::UserRecord;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;
use crate::token_store::TokenStore;

const EVENT_CAPACITY: usize = 16;

/// Payload of an avatar change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarChange {
    /// Newly fetched avatar URL.
    pub url: String,
}

struct AvatarState {
    avatar_url: Option<String>,
    next_id: u64,
    in_flight: Option<(u64, JoinHandle<()>)>,
}

struct Inner {
    api: ApiClient,
    config: ApiConfig,
    token_store: Arc<TokenStore>,
    state: Mutex<AvatarState>,
    events: broadcast::Sender<AvatarChange>,
}

/// Fetches `GET /users/{username}` and caches the small avatar URL.
///
/// Cheap to clone; clones share the cache, the in-flight state, and the
/// event channel.
#[derive(Clone)]
pub struct AvatarUrlService {
    inner: Arc<Inner>,
}

impl AvatarUrlService {
    pub fn new(api: ApiClient, config: ApiConfig, token_store: Arc<TokenStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                api,
                config,
                token_store,
                state: Mutex::new(AvatarState { avatar_url: None, next_id: 0, in_flight: None }),
                events,
            }),
        }
    }

    /// Register for change notifications. Dropping the receiver is the
    /// unsubscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<AvatarChange> {
        self.inner.events.subscribe()
    }

    /// Last successfully fetched avatar URL, if any.
    pub async fn avatar_url(&self) -> Option<String> {
        self.inner.state.lock().await.avatar_url.clone()
    }

    /// Drop the cached URL; used during logout.
    pub async fn clear(&self) {
        self.inner.state.lock().await.avatar_url = None;
        tracing::info!("cleared avatar cache");
    }

    /// Fetch the avatar URL for `username`.
    ///
    /// Requires a stored token; fails immediately with
    /// [`ApiError::MissingAuthorization`] when there is none. Any prior
    /// in-flight fetch is aborted unconditionally and its caller
    /// resolves to [`ApiError::Cancelled`].
    pub async fn fetch_avatar_url(&self, username: &str) -> ApiResult<String> {
        let Some(token) = self.inner.token_store.get() else {
            tracing::warn!("avatar fetch attempted without a stored token");
            return Err(ApiError::MissingAuthorization);
        };

        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.inner.state.lock().await;
            if let Some((_, stale)) = state.in_flight.take() {
                tracing::debug!("superseding in-flight avatar fetch");
                stale.abort();
            }
            let id = state.next_id;
            state.next_id += 1;
            let service = self.clone();
            let handle = tokio::spawn(run_fetch(service, id, username.to_string(), token, tx));
            state.in_flight = Some((id, handle));
        }
        rx.await.unwrap_or(Err(ApiError::Cancelled))
    }
}

impl Inner {
    async fn request_avatar(&self, username: &str, token: &str) -> ApiResult<String> {
        let url = format!("{}/users/{}", self.config.base_url, username);
        let request = self.api.get(&url).bearer_auth(token);
        let record: UserRecord = self.api.fetch_object(request).await?;
        Ok(record.profile_image.small)
    }
}

async fn run_fetch(
    service: AvatarUrlService,
    id: u64,
    username: String,
    token: String,
    waiter: oneshot::Sender<ApiResult<String>>,
) {
    let inner = &service.inner;
    let result = inner.request_avatar(&username, &token).await;

    let mut state = inner.state.lock().await;
    // A newer fetch may have superseded this one after the HTTP call
    // finished; its result must not touch the cache or the waiter.
    if state.in_flight.as_ref().map(|(flight_id, _)| *flight_id) != Some(id) {
        return;
    }
    state.in_flight = None;

    match &result {
        Ok(url) => {
            state.avatar_url = Some(url.clone());
            let _ = inner.events.send(AvatarChange { url: url.clone() });
            tracing::info!(%username, "avatar url fetched");
        }
        Err(e) => tracing::error!(error = %e, %username, "avatar fetch failed"),
    }

    let _ = waiter.send(result);
}
