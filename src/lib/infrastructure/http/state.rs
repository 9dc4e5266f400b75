//! Application state module

use std::{fmt, sync::Arc};

use crate::domain::communication::mailer::Mailer;

/// Global application state
#[derive(Clone)]
pub struct AppState<M: Mailer> {
    /// Mailer used to relay messages
    pub mailer: Arc<M>,
}

impl<M: Mailer> AppState<M> {
    /// Create a new application state
    pub fn new(mailer: M) -> Self {
        Self {
            mailer: Arc::new(mailer),
        }
    }
}

impl<M: Mailer> fmt::Debug for AppState<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("mailer", &"Mailer")
            .finish()
    }
}

#[cfg(test)]
use crate::domain::communication::mailer::tests::MockMailer;

/// State backed by a [`MockMailer`] with no expectations unless one is given
#[cfg(test)]
pub fn test_state(mailer: Option<MockMailer>) -> AppState<MockMailer> {
    AppState {
        mailer: Arc::new(mailer.unwrap_or_default()),
    }
}
