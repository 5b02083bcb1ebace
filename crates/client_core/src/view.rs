use std::sync::Arc;

use shared::domain::Article;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    gate::LOGIN_REQUIRED_NOTICE, CancelToken, Feed, FeedError, FeedEvent, FeedResolver,
    GateOutcome, NavigationGate, SortController, SortOrder,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    Idle,
    Loading,
    Ready,
    Unavailable(FeedError),
    RedirectedToLogin,
}

#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub status: FeedStatus,
    pub articles: Vec<Article>,
    pub next_order: SortOrder,
}

struct FeedViewState {
    status: FeedStatus,
    feed: Feed,
    sort: SortController,
}

impl FeedViewState {
    fn reset(&mut self, status: FeedStatus) {
        self.status = status;
        self.feed = Feed::default();
        self.sort = SortController::new();
    }
}

struct ActiveResolution {
    cancel: CancelToken,
    task: Option<JoinHandle<()>>,
}

impl Drop for ActiveResolution {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// The article list view: owns one feed and at most one in-flight
/// resolution. The feed is only ever replaced whole.
pub struct FeedView {
    gate: NavigationGate,
    resolver: Arc<FeedResolver>,
    state: Arc<Mutex<FeedViewState>>,
    active: Mutex<Option<ActiveResolution>>,
    events: broadcast::Sender<FeedEvent>,
}

impl FeedView {
    pub fn new(gate: NavigationGate, resolver: FeedResolver) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            gate,
            resolver: Arc::new(resolver),
            state: Arc::new(Mutex::new(FeedViewState {
                status: FeedStatus::Idle,
                feed: Feed::default(),
                sort: SortController::new(),
            })),
            active: Mutex::new(None),
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FeedEvent> {
        self.events.subscribe()
    }

    /// Opens the view. Any resolution left over from a previous activation
    /// is cancelled first. Signed-out sessions are redirected and get
    /// `FeedError::Unauthenticated`; no fetch is started for them.
    ///
    /// The `active` slot stays locked for the whole call, so overlapping
    /// activations run one after the other and each one releases the
    /// resolution started before it.
    pub async fn activate(&self) -> Result<(), FeedError> {
        let mut active = self.active.lock().await;
        *active = None;
        self.state.lock().await.reset(FeedStatus::Idle);

        if self.gate.check().await == GateOutcome::Redirected {
            self.state.lock().await.status = FeedStatus::RedirectedToLogin;
            let _ = self.events.send(FeedEvent::RedirectedToLogin {
                notice: LOGIN_REQUIRED_NOTICE.to_string(),
            });
            return Err(FeedError::Unauthenticated);
        }

        let cancel = CancelToken::new();
        self.state.lock().await.status = FeedStatus::Loading;
        let task = tokio::spawn(run_resolution(
            Arc::clone(&self.resolver),
            Arc::clone(&self.state),
            self.events.clone(),
            cancel.clone(),
        ));
        *active = Some(ActiveResolution {
            cancel,
            task: Some(task),
        });
        debug!("feed view activated");
        Ok(())
    }

    /// Closes the view: in-flight fetches are dropped and the feed discarded.
    pub async fn deactivate(&self) {
        *self.active.lock().await = None;
        self.state.lock().await.reset(FeedStatus::Idle);
        info!("feed view deactivated; pending fetches released");
    }

    /// Waits for the current resolution, if any, and returns the resulting
    /// status.
    pub async fn settled(&self) -> FeedStatus {
        let task = {
            let mut active = self.active.lock().await;
            active.as_mut().and_then(|active| active.task.take())
        };
        if let Some(task) = task {
            if let Err(err) = task.await {
                if !err.is_cancelled() {
                    warn!(error = %err, "feed resolution task failed");
                }
            }
        }
        self.state.lock().await.status.clone()
    }

    pub async fn toggle_sort(&self) -> SortOrder {
        let mut state = self.state.lock().await;
        let FeedViewState { feed, sort, .. } = &mut *state;
        let order = sort.toggle(feed);
        let _ = self.events.send(FeedEvent::SortChanged { order });
        order
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        let state = self.state.lock().await;
        FeedSnapshot {
            status: state.status.clone(),
            articles: state.feed.articles().to_vec(),
            next_order: state.sort.next_order(),
        }
    }
}

async fn run_resolution(
    resolver: Arc<FeedResolver>,
    state: Arc<Mutex<FeedViewState>>,
    events: broadcast::Sender<FeedEvent>,
    cancel: CancelToken,
) {
    let outcome = resolver.resolve_feed(&cancel).await;

    let mut state = state.lock().await;
    if cancel.is_cancelled() {
        debug!("discarding feed resolution for a closed view");
        return;
    }

    match outcome {
        Ok(feed) => {
            let count = feed.len();
            state.feed = feed;
            state.sort = SortController::new();
            state.status = FeedStatus::Ready;
            let _ = events.send(FeedEvent::FeedLoaded { count });
        }
        Err(FeedError::Cancelled) => {}
        Err(err) => {
            warn!(error = %err, "feed unavailable");
            state.feed = Feed::default();
            state.status = FeedStatus::Unavailable(err.clone());
            let _ = events.send(FeedEvent::FeedUnavailable {
                reason: err.to_string(),
            });
        }
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
