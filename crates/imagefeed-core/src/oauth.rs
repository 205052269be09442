//! OAuth2 authorization-code exchange.
//!
//! At most one exchange is in flight at any time. Concurrent callers
//! submitting the *same* code are queued onto the in-flight request and
//! all receive the same terminal result; a *different* code aborts the
//! in-flight request and discards its queue (stale waiters resolve to
//! [`ApiError::Cancelled`] and never see an HTTP result). All state
//! transitions happen under one mutex, which is what keeps the
//! at-most-one-in-flight invariant sound under concurrent callers.

use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use imagefeed_types::OAuthTokenResponse;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;
use crate::token_store::TokenStore;

struct InFlightExchange {
    id: u64,
    code: String,
    waiters: Vec<oneshot::Sender<ApiResult<String>>>,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct ExchangeState {
    next_id: u64,
    in_flight: Option<InFlightExchange>,
}

struct Inner {
    api: ApiClient,
    config: ApiConfig,
    token_store: Arc<TokenStore>,
    state: Mutex<ExchangeState>,
}

/// Exchanges an authorization code for a bearer token and persists it.
///
/// Cheap to clone; clones share the same in-flight state.
#[derive(Clone)]
pub struct OAuth2Service {
    inner: Arc<Inner>,
}

impl OAuth2Service {
    pub fn new(api: ApiClient, config: ApiConfig, token_store: Arc<TokenStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                config,
                token_store,
                state: Mutex::new(ExchangeState::default()),
            }),
        }
    }

    /// Exchange `code` for a bearer token.
    ///
    /// On success the token has already been written to the token store
    /// before any waiter resumes. No retry: a failed exchange resets to
    /// idle and the caller may re-invoke.
    pub async fn exchange_code(&self, code: &str) -> ApiResult<String> {
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.inner.state.lock().await;
            match state.in_flight.as_mut() {
                Some(in_flight) if in_flight.code == code => {
                    tracing::debug!("coalescing duplicate token exchange");
                    in_flight.waiters.push(tx);
                }
                _ => {
                    if let Some(stale) = state.in_flight.take() {
                        tracing::debug!("superseding in-flight token exchange");
                        stale.handle.abort();
                        // Dropping the stale queue resolves its waiters
                        // as Cancelled.
                    }
                    let id = state.next_id;
                    state.next_id += 1;
                    let service = self.clone();
                    let handle = tokio::spawn(run_exchange(service, id, code.to_string()));
                    state.in_flight = Some(InFlightExchange {
                        id,
                        code: code.to_string(),
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
    async fn request_token(&self, code: &str) -> ApiResult<String> {
        let params = [
            ("client_id", self.config.access_key.as_str()),
            ("client_secret", self.config.secret_key.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
        ];
        let request = self.api.post(&self.config.token_url).form(&params);
        let body: OAuthTokenResponse = self.api.fetch_object(request).await?;
        Ok(body.access_token)
    }
}

async fn run_exchange(service: OAuth2Service, id: u64, code: String) {
    let inner = &service.inner;
    let result = inner.request_token(&code).await;

    let mut state = inner.state.lock().await;
    // A newer exchange may have replaced this one while the request was
    // outstanding; its queue already belongs to someone else.
    let Some(in_flight) = state.in_flight.take_if(|f| f.id == id) else {
        return;
    };

    match &result {
        Ok(token) => {
            // Persist before fan-out so waiters observe the stored token.
            if let Err(e) = inner.token_store.set(Some(token)) {
                tracing::warn!(error = %e, "failed to persist bearer token");
            }
            tracing::info!("token exchange succeeded");
        }
        Err(e) => tracing::error!(error = %e, "token exchange failed"),
    }

    for waiter in in_flight.waiters {
        let _ = waiter.send(result.clone());
    }
}
