//! Session context
//!
//! [`SessionContext`] owns the process-wide "who am I" state: the resolved
//! user and the handle of the request currently resolving it. Concurrent
//! callers of [`SessionContext::current_user_once`] share one request, so
//! the backend sees at most one `/auth/me` call at a time.
//!
//! Login/logout transitions arrive on the client's session bus; see
//! [`SessionContext::spawn_listener`].

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{broadcast::error::RecvError, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use patrimoni_common::events::SessionEvent;
use patrimoni_common::models::{AuthToken, Credentials, User};

use crate::api::{ApiClient, ApiError, ApiResult};

/// Longest lockout honoured from a `Retry-After` hint
const MAX_LOCKOUT_SECS: u64 = 24 * 60 * 60;

type UserRequest = Shared<BoxFuture<'static, ApiResult<User>>>;

#[derive(Default)]
struct CacheState {
    user: Option<User>,
    in_flight: Option<UserRequest>,
    /// Bumped whenever the session is reset; results of older requests are
    /// not cached
    generation: u64,
}

struct SessionInner {
    client: ApiClient,
    state: Mutex<CacheState>,
    user_tx: watch::Sender<Option<User>>,
}

/// Shared session state; clone freely
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<SessionInner>,
}

impl SessionContext {
    pub fn new(client: ApiClient) -> Self {
        let (user_tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(SessionInner {
                client,
                state: Mutex::new(CacheState::default()),
                user_tx,
            }),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The resolved user, without any network call
    pub fn cached_user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    /// Observe the current user as it changes
    pub fn watch_user(&self) -> watch::Receiver<Option<User>> {
        self.inner.user_tx.subscribe()
    }

    /// Resolve the current user, sharing any request already in flight
    pub async fn current_user_once(&self) -> ApiResult<User> {
        let request = {
            let mut state = self.lock();
            if let Some(user) = &state.user {
                return Ok(user.clone());
            }
            match &state.in_flight {
                Some(request) => request.clone(),
                None => {
                    let request = self.fetch_user(state.generation).boxed().shared();
                    state.in_flight = Some(request.clone());
                    request
                }
            }
        };
        request.await
    }

    fn fetch_user(
        &self,
        generation: u64,
    ) -> impl std::future::Future<Output = ApiResult<User>> + Send + 'static {
        let session = self.clone();
        async move {
            let result = session.inner.client.me().await;
            session.settle(generation, &result);
            result
        }
    }

    /// Record the outcome of a "who am I" request started at `generation`
    fn settle(&self, generation: u64, result: &ApiResult<User>) {
        let current = {
            let mut state = self.lock();
            let current = state.generation == generation;
            if current {
                state.in_flight = None;
                if let Ok(user) = result {
                    state.user = Some(user.clone());
                }
            }
            current
        };
        match result {
            Ok(user) if current => {
                debug!(username = %user.username, "Current user resolved");
                self.inner.user_tx.send_replace(Some(user.clone()));
            }
            Ok(_) => debug!("Discarding user resolved for a reset session"),
            Err(err) if current => self.on_failure(err),
            Err(err) => debug!(error = %err, "Discarding failure for a reset session"),
        }
    }

    /// A failed "who am I" always ends with no user
    ///
    /// Without a credential the failure is expected and only traced.
    fn on_failure(&self, err: &ApiError) {
        if !self.inner.client.has_token() {
            debug!(error = %err, "No current user without a credential");
        } else if err.is_unauthorized() {
            info!("Credential rejected while resolving current user");
        } else {
            error!(error = %err, "Failed to resolve current user");
        }
        self.clear_user();
    }

    /// Forget the user and any request in flight
    pub fn clear_user(&self) {
        {
            let mut state = self.lock();
            state.user = None;
            state.in_flight = None;
            state.generation = state.generation.wrapping_add(1);
        }
        self.inner.user_tx.send_replace(None);
    }

    /// Resolve the user again from the server, ignoring the cache
    ///
    /// Any older request is superseded; callers arriving while the refresh
    /// runs share it.
    pub async fn refresh(&self) -> ApiResult<User> {
        let request = {
            let mut state = self.lock();
            state.generation = state.generation.wrapping_add(1);
            let request = self.fetch_user(state.generation).boxed().shared();
            state.in_flight = Some(request.clone());
            request
        };
        request.await
    }

    /// Resolve the user at startup; failures leave the session empty
    pub async fn bootstrap(&self) -> Option<User> {
        self.current_user_once().await.ok()
    }

    /// React to one session transition
    pub async fn handle_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::Login => {
                let _ = self.refresh().await;
            }
            SessionEvent::Logout { reason } => {
                info!(?reason, "Session ended");
                self.clear_user();
            }
        }
    }

    /// Follow the client's session bus until the task is aborted
    ///
    /// The subscription is taken before this returns, so transitions emitted
    /// right after are not missed.
    pub fn spawn_listener(&self) -> JoinHandle<()> {
        let mut rx = self.inner.client.subscribe();
        let session = self.clone();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => session.handle_event(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Session listener lagged; resynchronizing");
                        let _ = session.refresh().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Log in, honouring any active lockout
    ///
    /// On success the token is stored (which broadcasts a login). A
    /// throttled failure engages `lockout` from the server's hint.
    pub async fn sign_in(
        &self,
        credentials: &Credentials,
        lockout: &mut LoginLockout,
    ) -> ApiResult<AuthToken> {
        if let Some(remaining_secs) = lockout.remaining_secs() {
            return Err(ApiError::LockedOut { remaining_secs });
        }
        match self.inner.client.login(credentials).await {
            Ok(token) => {
                lockout.clear();
                self.inner.client.set_token(Some(token.access_token.clone()));
                Ok(token)
            }
            Err(err) => {
                if let Some(until) = lockout.engage(&err) {
                    warn!(%until, "Login throttled");
                }
                Err(err)
            }
        }
    }

    /// Clear the credential and the user immediately
    pub fn logout(&self) {
        self.inner.client.clear_token();
        self.clear_user();
    }
}

// ========================================
// Login lockout
// ========================================

/// Client-side login lockout driven by a throttled response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoginLockout {
    until: Option<DateTime<Utc>>,
}

impl LoginLockout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engage from a failed login, if it was throttled with a hint
    pub fn engage(&mut self, err: &ApiError) -> Option<DateTime<Utc>> {
        self.engage_at(err, Utc::now())
    }

    pub fn engage_at(&mut self, err: &ApiError, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if !err.is_throttled() {
            return None;
        }
        let secs = err.retry_after_seconds()?.min(MAX_LOCKOUT_SECS);
        let until = now + Duration::seconds(secs as i64);
        self.until = Some(until);
        Some(until)
    }

    pub fn locked_until(&self) -> Option<DateTime<Utc>> {
        self.until
    }

    /// Whole seconds left, rounded up; `None` once expired
    pub fn remaining_secs(&self) -> Option<u64> {
        self.remaining_secs_at(Utc::now())
    }

    pub fn remaining_secs_at(&self, now: DateTime<Utc>) -> Option<u64> {
        let millis = (self.until? - now).num_milliseconds();
        if millis <= 0 {
            return None;
        }
        Some(((millis + 999) / 1000) as u64)
    }

    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.remaining_secs_at(now).is_some()
    }

    pub fn clear(&mut self) {
        self.until = None;
    }
}
