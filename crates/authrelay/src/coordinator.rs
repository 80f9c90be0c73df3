//! Single-flight credential refresh.
//!
//! The first caller to need a fresh token becomes the leader and starts the
//! refresh; everyone arriving while it runs queues a one-shot waiter and is
//! released with the leader's outcome, in arrival order. Waiters give up after
//! a fixed deadline even if the refresh never settles.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, trace, warn};

use authrelay_core::{AccessToken, ApiError, CredentialProvider, Navigator, codes};

use crate::config::DEFAULT_WAITER_TIMEOUT;

type Outcome = Result<AccessToken, ApiError>;
type Waiter = oneshot::Sender<Outcome>;

/// Collapses concurrent refresh requests into one call to
/// [`CredentialProvider::refresh`].
///
/// Cheap to clone; clones share the same refresh state.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    credentials: Arc<dyn CredentialProvider>,
    navigator: Arc<dyn Navigator>,
    waiter_timeout: Duration,
    state: Mutex<RefreshState>,
}

/// `waiters` is only non-empty while `in_flight` is set.
#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    waiters: VecDeque<Waiter>,
}

enum Role {
    Leader,
    Waiter(oneshot::Receiver<Outcome>),
}

impl RefreshCoordinator {
    /// Create a coordinator with the default 10 second waiter deadline.
    pub fn new(credentials: Arc<dyn CredentialProvider>, navigator: Arc<dyn Navigator>) -> Self {
        Self::with_waiter_timeout(credentials, navigator, DEFAULT_WAITER_TIMEOUT)
    }

    /// Create a coordinator with a custom waiter deadline.
    pub fn with_waiter_timeout(
        credentials: Arc<dyn CredentialProvider>,
        navigator: Arc<dyn Navigator>,
        waiter_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                credentials,
                navigator,
                waiter_timeout,
                state: Mutex::new(RefreshState::default()),
            }),
        }
    }

    /// Returns a fresh access token, refreshing at most once across all
    /// concurrent callers.
    ///
    /// # Errors
    ///
    /// - the provider's own error if its refresh fails
    /// - `REFRESH_NO_TOKEN` if the provider succeeded without storing a token
    /// - `REFRESH_TIMEOUT` if this caller waited longer than the deadline
    /// - `REFRESH_FAILED` if the refresh task died without a result
    #[instrument(skip(self))]
    pub async fn ensure_fresh_token(&self) -> Result<AccessToken, ApiError> {
        match self.join() {
            Role::Leader => self.lead().await,
            Role::Waiter(rx) => self.wait(rx).await,
        }
    }

    /// Check whether a refresh is currently running.
    pub fn is_refreshing(&self) -> bool {
        self.inner.lock_state().in_flight
    }

    /// Number of callers queued behind the running refresh.
    pub fn waiter_count(&self) -> usize {
        self.inner.lock_state().waiters.len()
    }

    fn join(&self) -> Role {
        let mut state = self.inner.lock_state();
        if state.in_flight {
            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(tx);
            debug!(waiters = state.waiters.len(), "Refresh in flight, waiting");
            Role::Waiter(rx)
        } else {
            state.in_flight = true;
            Role::Leader
        }
    }

    async fn lead(&self) -> Result<AccessToken, ApiError> {
        let inner = Arc::clone(&self.inner);

        // Detached so a caller dropping this future cannot strand the waiters.
        let task = tokio::spawn(async move {
            let mut guard = SettleGuard {
                inner: Arc::clone(&inner),
                settled: false,
            };
            let outcome = match AssertUnwindSafe(inner.run_refresh()).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(_) => {
                    let err = ApiError::refresh_failed("refresh panicked", 0);
                    inner.end_session(&err);
                    Err(err)
                }
            };
            guard.settle(&outcome);
            outcome
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(err) => Err(ApiError::refresh_failed(format!("refresh task failed: {err}"), 0)),
        }
    }

    async fn wait(&self, rx: oneshot::Receiver<Outcome>) -> Result<AccessToken, ApiError> {
        let deadline = self.inner.waiter_timeout;
        match tokio::time::timeout(deadline, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(ApiError::refresh_failed("refresh ended without a result", 0)),
            Err(_) => {
                warn!(timeout_ms = deadline.as_millis() as u64, "Gave up waiting for refresh");
                Err(ApiError::new(
                    codes::REFRESH_TIMEOUT,
                    format!("Token refresh timeout after {}ms", deadline.as_millis()),
                    0,
                ))
            }
        }
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run_refresh(&self) -> Outcome {
        info!("Refreshing credentials");

        let outcome = match self.credentials.refresh().await {
            Ok(()) => self.credentials.access_token().ok_or_else(|| {
                ApiError::new(
                    codes::REFRESH_NO_TOKEN,
                    "refresh succeeded but no access token is stored",
                    0,
                )
            }),
            Err(err) => Err(err),
        };

        match &outcome {
            Ok(_) => info!("Credentials refreshed"),
            Err(err) => self.end_session(err),
        }

        outcome
    }

    fn end_session(&self, err: &ApiError) {
        warn!(code = %err.code, status = err.status, "Refresh failed, clearing session");
        self.credentials.clear();
        self.navigator.redirect_to_login();
    }

    /// Release every waiter with `outcome` and leave the idle state.
    fn settle(&self, outcome: &Outcome) {
        let mut state = self.lock_state();
        let waiters = std::mem::take(&mut state.waiters);
        trace!(waiters = waiters.len(), "Releasing waiters");
        for waiter in waiters {
            // A closed channel means that waiter already timed out.
            let _ = waiter.send(outcome.clone());
        }
        state.in_flight = false;
    }
}

/// Clears the refresh state even if the refresh task unwinds.
struct SettleGuard {
    inner: Arc<Inner>,
    settled: bool,
}

impl SettleGuard {
    fn settle(&mut self, outcome: &Outcome) {
        self.inner.settle(outcome);
        self.settled = true;
    }
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        if !self.settled {
            self.inner.settle(&Err(ApiError::refresh_failed(
                "refresh aborted before completing",
                0,
            )));
        }
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock_state();
        f.debug_struct("RefreshCoordinator")
            .field("in_flight", &state.in_flight)
            .field("waiters", &state.waiters.len())
            .field("waiter_timeout", &self.inner.waiter_timeout)
            .finish()
    }
}
