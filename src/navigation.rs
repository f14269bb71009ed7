//! Client-side navigation abstraction
//!
//! The resolver decides where the browser goes next; a [`Navigator`] carries
//! the decision out. On the server the decision is recorded and handed back to
//! the callback page, which performs it.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Pathname the user originally tried to reach
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FromLocation {
    pub pathname: String,
}

/// Contextual state attached to a navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NavigationState {
    /// `{"fromAuth": true}` on a restored destination
    FromAuth {
        #[serde(rename = "fromAuth")]
        from_auth: bool,
    },
    /// `{"from": {"pathname": ..}}` forwarded to the sign-in page
    ReturnTo { from: FromLocation },
}

impl NavigationState {
    #[must_use]
    pub fn from_auth() -> Self {
        Self::FromAuth { from_auth: true }
    }

    #[must_use]
    pub fn return_to(pathname: impl Into<String>) -> Self {
        Self::ReturnTo {
            from: FromLocation {
                pathname: pathname.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Overwrite the current history entry instead of pushing
    pub replace: bool,
    pub state: Option<NavigationState>,
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: &str, options: NavigateOptions);
}

/// A navigation that was requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub destination: String,
    pub options: NavigateOptions,
}

/// Navigator that records requests instead of performing them
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    navigations: Mutex<Vec<Navigation>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded navigations, oldest first
    #[must_use]
    pub fn navigations(&self) -> Vec<Navigation> {
        self.navigations
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    /// The most recent navigation, if any
    #[must_use]
    pub fn last(&self) -> Option<Navigation> {
        self.navigations
            .lock()
            .ok()
            .and_then(|n| n.last().cloned())
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, destination: &str, options: NavigateOptions) {
        if let Ok(mut navigations) = self.navigations.lock() {
            navigations.push(Navigation {
                destination: destination.to_string(),
                options,
            });
        }
    }
}
