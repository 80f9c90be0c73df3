//! Login navigators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use authrelay_core::Navigator;

/// A navigator that ignores redirects.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn redirect_to_login(&self) {}
}

/// A navigator that tracks an application route.
///
/// Redirecting moves to the login path and remembers where the user was so
/// they can be sent back after logging in. Redirecting while already on the
/// login path does nothing, which keeps repeated auth failures from looping.
#[derive(Debug)]
pub struct RouteNavigator {
    login_path: String,
    state: Mutex<RouteState>,
    redirects: AtomicUsize,
}

#[derive(Debug)]
struct RouteState {
    current: String,
    return_to: Option<String>,
}

impl RouteNavigator {
    /// Create a navigator starting at `current_path`.
    pub fn new(login_path: impl Into<String>, current_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            state: Mutex::new(RouteState {
                current: current_path.into(),
                return_to: None,
            }),
            redirects: AtomicUsize::new(0),
        }
    }

    /// Returns the current path.
    pub fn current_path(&self) -> String {
        self.lock_state().current.clone()
    }

    /// Move to another path.
    pub fn navigate(&self, path: impl Into<String>) {
        self.lock_state().current = path.into();
    }

    /// Returns the path the user was on before the last redirect to login.
    pub fn return_to(&self) -> Option<String> {
        self.lock_state().return_to.clone()
    }

    /// Check whether the current path is the login path.
    pub fn is_on_login(&self) -> bool {
        is_login_path(&self.lock_state().current, &self.login_path)
    }

    /// Number of redirects actually performed.
    pub fn redirect_count(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }

    fn lock_state(&self) -> MutexGuard<'_, RouteState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for RouteNavigator {
    fn redirect_to_login(&self) {
        let mut state = self.lock_state();
        if is_login_path(&state.current, &self.login_path) {
            debug!("Already on login path, skipping redirect");
            return;
        }

        let previous = std::mem::replace(&mut state.current, self.login_path.clone());
        info!(from = %previous, to = %self.login_path, "Redirecting to login");
        state.return_to = Some(previous);
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

/// Compare paths ignoring any query string or fragment.
fn is_login_path(current: &str, login_path: &str) -> bool {
    let path = current.split(['?', '#']).next().unwrap_or(current);
    path.trim_end_matches('/') == login_path.trim_end_matches('/')
}
