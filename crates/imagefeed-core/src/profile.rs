//! Current-user profile fetching and caching.
//!
//! Same coalescing discipline as the OAuth exchange, keyed by token
//! equality: concurrent fetches for one token share a single request;
//! a fetch with a different token supersedes the in-flight one and its
//! waiters resolve to [`ApiError::Cancelled`].

use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use imagefeed_types::{Profile, ProfileRecord};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;

struct InFlightFetch {
    id: u64,
    token: String,
    waiters: Vec<oneshot::Sender<ApiResult<Profile>>>,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct ProfileState {
    profile: Option<Profile>,
    next_id: u64,
    in_flight: Option<InFlightFetch>,
}

struct Inner {
    api: ApiClient,
    config: ApiConfig,
    state: Mutex<ProfileState>,
}

/// Fetches `GET /me` and keeps the last successful result.
///
/// Cheap to clone; clones share the cache and in-flight state.
#[derive(Clone)]
pub struct ProfileService {
    inner: Arc<Inner>,
}

impl ProfileService {
    pub fn new(api: ApiClient, config: ApiConfig) -> Self {
        Self {
            inner: Arc::new(Inner { api, config, state: Mutex::new(ProfileState::default()) }),
        }
    }

    /// Last successfully fetched profile, if any.
    pub async fn profile(&self) -> Option<Profile> {
        self.inner.state.lock().await.profile.clone()
    }

    /// Drop the cached profile; used during logout.
    pub async fn clear(&self) {
        self.inner.state.lock().await.profile = None;
        tracing::info!("cleared profile cache");
    }

    /// Fetch the current user's profile with the given bearer token.
    ///
    /// Failures are surfaced to the caller, never retried internally.
    pub async fn fetch_profile(&self, token: &str) -> ApiResult<Profile> {
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.inner.state.lock().await;
            match state.in_flight.as_mut() {
                Some(in_flight) if in_flight.token == token => {
                    tracing::debug!("coalescing duplicate profile fetch");
                    in_flight.waiters.push(tx);
                }
                _ => {
                    if let Some(stale) = state.in_flight.take() {
                        tracing::debug!("superseding in-flight profile fetch");
                        stale.handle.abort();
                    }
                    let id = state.next_id;
                    state.next_id += 1;
                    let service = self.clone();
                    let handle = tokio::spawn(run_fetch(service, id, token.to_string()));
                    state.in_flight = Some(InFlightFetch {
                        id,
                        token: token.to_string(),
                        waiters: vec![tx],
                        handle,
                    });
                }
            }
        }
        rx.await.unwrap_or(Err(ApiError::Cancelled))
    }
}

impl Inner {
    async fn request_profile(&self, token: &str) -> ApiResult<Profile> {
        let url = format!("{}/me", self.config.base_url);
        let request = self.api.get(&url).bearer_auth(token);
        let record: ProfileRecord = self.api.fetch_object(request).await?;
        Ok(Profile::from(record))
    }
}

async fn run_fetch(service: ProfileService, id: u64, token: String) {
    let inner = &service.inner;
    let result = inner.request_profile(&token).await;

    let mut state = inner.state.lock().await;
    let Some(in_flight) = state.in_flight.take_if(|f| f.id == id) else {
        return;
    };

    match &result {
        Ok(profile) => {
            state.profile = Some(profile.clone());
            tracing::info!(username = %profile.username, "profile fetched");
        }
        Err(e) => tracing::error!(error = %e, "profile fetch failed"),
    }

    for waiter in in_flight.waiters {
        let _ = waiter.send(result.clone());
    }
}
