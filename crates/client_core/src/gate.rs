use std::sync::Arc;

use tracing::warn;

use crate::{Navigator, Notifier, Route, SessionAccessor};

pub const LOGIN_REQUIRED_NOTICE: &str = "Session token unavailable. Please sign in.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Proceed,
    Redirected,
}

/// Keeps signed-out sessions away from the feed. A failed check notifies the
/// user and navigates to the login view; nothing else runs.
pub struct NavigationGate {
    session: Arc<dyn SessionAccessor>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl NavigationGate {
    pub fn new(
        session: Arc<dyn SessionAccessor>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session,
            navigator,
            notifier,
        }
    }

    pub async fn check(&self) -> GateOutcome {
        let token = match self.session.token().await {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "session store unreadable; treating as signed out");
                None
            }
        };

        if token.is_some_and(|token| !token.is_empty()) {
            return GateOutcome::Proceed;
        }

        warn!("no session token; redirecting to login");
        self.notifier.notify(LOGIN_REQUIRED_NOTICE);
        self.navigator.navigate(Route::Login);
        GateOutcome::Redirected
    }
}
