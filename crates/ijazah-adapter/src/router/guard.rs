/*
[INPUT]:  Navigation target and current session snapshot
[OUTPUT]: Proceed or redirect decision
[POS]:    Router layer - access control before each navigation
[UPDATE]: When redirect rules change
*/

use tracing::debug;

use super::routes::{HOME_PATH, LOGIN_PATH, Route, RouteTable};
use crate::auth::{AuthSnapshot, AuthStore};

/// Outcome of a navigation check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    RedirectToLogin,
    RedirectToHome,
}

impl Navigation {
    /// Where to go instead, if anywhere
    pub fn target_path(&self) -> Option<&'static str> {
        match self {
            Navigation::Proceed => None,
            Navigation::RedirectToLogin => Some(LOGIN_PATH),
            Navigation::RedirectToHome => Some(HOME_PATH),
        }
    }
}

/// Pure access decision.
///
/// Unauthenticated visitors of a protected page go to login; authenticated
/// users lacking the role go home, never back to login.
pub fn decide(route: &Route, snapshot: &AuthSnapshot) -> Navigation {
    if !route.requires_auth {
        return Navigation::Proceed;
    }
    if !snapshot.is_authenticated() {
        return Navigation::RedirectToLogin;
    }
    match route.required_role {
        Some(role) if !snapshot.has_role(role) => Navigation::RedirectToHome,
        _ => Navigation::Proceed,
    }
}

/// Guard bound to one session context
#[derive(Debug, Clone)]
pub struct RouteGuard {
    store: AuthStore,
    table: RouteTable,
}

impl RouteGuard {
    pub fn new(store: AuthStore) -> Self {
        Self::with_table(store, RouteTable::default())
    }

    pub fn with_table(store: AuthStore, table: RouteTable) -> Self {
        Self { store, table }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Waits for session restore on the first call, then decides
    pub async fn before_each(&self, path: &str) -> Navigation {
        self.store.init().await;
        self.decide_now(path)
    }

    /// Decide without waiting. Before restore completes the session counts
    /// as anonymous.
    pub fn decide_now(&self, path: &str) -> Navigation {
        let Some(matched) = self.table.resolve(path) else {
            debug!(path = %path, "no route for path");
            return Navigation::RedirectToHome;
        };

        let snapshot = if self.store.is_initialized() {
            self.store.snapshot()
        } else {
            AuthSnapshot::anonymous()
        };

        let navigation = decide(matched.route, &snapshot);
        debug!(path = %path, route = %matched.route.name, ?navigation, "navigation decided");
        navigation
    }
}
