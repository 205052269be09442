//! Photo feed service.
//!
//! Maintains the authoritative insertion-ordered photo collection for
//! the session. Pages are merged with dedup-by-id semantics; the
//! like/unlike mutation replaces a photo in place only after the server
//! confirms the call. Observers subscribe to change events carrying the
//! old and new collection counts and compute their own diff.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use imagefeed_types::{Photo, PhotoRecord};

use crate::config::{ApiConfig, PER_PAGE};
use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;
use crate::token_store::TokenStore;

const EVENT_CAPACITY: usize = 64;

/// Payload of a feed change notification.
///
/// The service does not compute the diff; observers compare the counts
/// (and re-read [`PhotoFeedService::photos`]) to decide what to reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedChange {
    pub old_count: usize,
    pub new_count: usize,
}

struct FeedState {
    photos: Vec<Photo>,
    last_loaded_page: Option<u32>,
}

struct Inner {
    api: ApiClient,
    config: ApiConfig,
    token_store: Arc<TokenStore>,
    state: Mutex<FeedState>,
    fetch_in_flight: AtomicBool,
    events: broadcast::Sender<FeedChange>,
}

/// Paginated photo listing with dedup-merge and server-confirmed likes.
///
/// Cheap to clone; clones share the collection and the event channel.
#[derive(Clone)]
pub struct PhotoFeedService {
    inner: Arc<Inner>,
}

// Resets the in-flight flag even when the driving future is dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl PhotoFeedService {
    pub fn new(api: ApiClient, config: ApiConfig, token_store: Arc<TokenStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                api,
                config,
                token_store,
                state: Mutex::new(FeedState { photos: Vec::new(), last_loaded_page: None }),
                fetch_in_flight: AtomicBool::new(false),
                events,
            }),
        }
    }

    /// Register for change notifications. Dropping the receiver is the
    /// unsubscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<FeedChange> {
        self.inner.events.subscribe()
    }

    /// Snapshot of the current collection, in insertion order.
    pub async fn photos(&self) -> Vec<Photo> {
        self.inner.state.lock().await.photos.clone()
    }

    /// Highest page number merged into the collection so far.
    pub async fn last_loaded_page(&self) -> Option<u32> {
        self.inner.state.lock().await.last_loaded_page
    }

    /// Empty the collection and reset the page counter; used during
    /// logout.
    pub async fn clear(&self) {
        let mut state = self.inner.state.lock().await;
        state.photos.clear();
        state.last_loaded_page = None;
        tracing::info!("cleared photo collection");
    }

    /// Fetch and merge the next feed page.
    ///
    /// No-op while a page fetch is already in flight. Failures are
    /// logged and leave all state unchanged, so the next call retries
    /// the same page. A page yielding zero unique photos also advances
    /// nothing and emits nothing — a duplicate page will be re-requested
    /// forever (preserved behavior, see DESIGN.md).
    pub async fn fetch_next_page(&self) {
        let inner = &self.inner;
        if inner.fetch_in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!("page fetch already in flight, skipping");
            return;
        }
        let _guard = InFlightGuard(&inner.fetch_in_flight);

        let next_page = inner.state.lock().await.last_loaded_page.map_or(1, |page| page + 1);
        tracing::info!(page = next_page, "requesting feed page");

        match inner.request_page(next_page).await {
            Ok(records) => inner.merge_page(next_page, records).await,
            Err(e) => tracing::error!(error = %e, page = next_page, "feed page fetch failed"),
        }
    }

    /// Like or unlike a photo, server-confirmed.
    ///
    /// On success the photo is replaced in place with the flipped like
    /// state, preserving its position, and a change event fires. When
    /// the photo is no longer in the collection the mutation is skipped
    /// silently but the call still reports success.
    pub async fn change_like(&self, photo_id: &str, like: bool) -> ApiResult<()> {
        let inner = &self.inner;
        let Some(token) = inner.token_store.get() else {
            tracing::warn!(%photo_id, "like change attempted without a stored token");
            return Err(ApiError::MissingAuthorization);
        };

        let url = format!("{}/photos/{}/like", inner.config.base_url, photo_id);
        let request = if like { inner.api.post(&url) } else { inner.api.delete(&url) };
        inner.api.send_no_body(request.bearer_auth(token)).await?;

        let mut state = inner.state.lock().await;
        if let Some(index) = state.photos.iter().position(|photo| photo.id == photo_id) {
            let updated = state.photos[index].with_liked(like);
            state.photos[index] = updated;
            let count = state.photos.len();
            let _ = inner.events.send(FeedChange { old_count: count, new_count: count });
            tracing::info!(%photo_id, like, "updated like state");
        } else {
            tracing::debug!(%photo_id, "photo no longer present, skipping like update");
        }
        Ok(())
    }
}

impl Inner {
    async fn request_page(&self, page: u32) -> ApiResult<Vec<PhotoRecord>> {
        let url = format!("{}/photos", self.config.base_url);
        let request = self.api.get(&url).query(&[
            ("page", page.to_string()),
            ("per_page", PER_PAGE.to_string()),
            ("client_id", self.config.access_key.clone()),
        ]);
        self.api.fetch_object(request).await
    }

    async fn merge_page(&self, page: u32, records: Vec<PhotoRecord>) {
        let mut state = self.state.lock().await;

        let mut seen: HashSet<String> =
            state.photos.iter().map(|photo| photo.id.clone()).collect();
        let unique: Vec<Photo> = records
            .into_iter()
            .map(Photo::from)
            .filter(|photo| seen.insert(photo.id.clone()))
            .collect();

        if unique.is_empty() {
            tracing::warn!(page, "no unique photos on page, skipping update");
            return;
        }

        let old_count = state.photos.len();
        state.photos.extend(unique);
        state.last_loaded_page = Some(page);
        let new_count = state.photos.len();
        tracing::info!(page, added = new_count - old_count, "loaded new photos");

        let _ = self.events.send(FeedChange { old_count, new_count });
    }
}
