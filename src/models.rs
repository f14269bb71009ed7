use serde::{Deserialize, Serialize};

use crate::callback::CallbackState;
use crate::navigation::{Navigation, NavigationState};

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Body posted by the callback page: the full URL it was loaded at
#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    pub url: String,
}

/// What the callback page should do next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CallbackResponse {
    Redirect {
        destination: String,
        replace: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        state: Option<NavigationState>,
    },
    Error {
        message: String,
        /// Where the "back to sign-in" action goes
        retry: String,
    },
}

impl CallbackResponse {
    /// Build the response from the resolver's state and the navigation it requested
    #[must_use]
    pub fn from_outcome(
        state: &CallbackState,
        navigation: Option<Navigation>,
        sign_in_path: &str,
    ) -> Self {
        match (state, navigation) {
            (CallbackState::Error { message }, _) => Self::Error {
                message: message.clone(),
                retry: sign_in_path.to_string(),
            },
            (_, Some(nav)) => Self::Redirect {
                destination: nav.destination,
                replace: nav.options.replace,
                state: nav.options.state,
            },
            // Every non-error state navigates; fall back to sign-in if it somehow did not
            (_, None) => Self::Redirect {
                destination: sign_in_path.to_string(),
                replace: false,
                state: None,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecoverRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct RecoverResponse {
    pub status: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::NavigateOptions;

    #[test]
    fn test_redirect_serialization() {
        let response = CallbackResponse::from_outcome(
            &CallbackState::RestoreRedirect {
                path: "/books".to_string(),
            },
            Some(Navigation {
                destination: "/books".to_string(),
                options: NavigateOptions {
                    replace: true,
                    state: Some(NavigationState::from_auth()),
                },
            }),
            "/auth/sign_in",
        );

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({
                "status": "redirect",
                "destination": "/books",
                "replace": true,
                "state": {"fromAuth": true}
            })
        );
    }

    #[test]
    fn test_redirect_without_state_omits_it() {
        let response = CallbackResponse::from_outcome(
            &CallbackState::SignInRedirect { from: None },
            Some(Navigation {
                destination: "/auth/sign_in".to_string(),
                options: NavigateOptions::default(),
            }),
            "/auth/sign_in",
        );

        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("state").is_none());
        assert_eq!(value["replace"], false);
    }

    #[test]
    fn test_error_serialization() {
        let response = CallbackResponse::from_outcome(
            &CallbackState::Error {
                message: "network error".to_string(),
            },
            None,
            "/auth/sign_in",
        );

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({
                "status": "error",
                "message": "network error",
                "retry": "/auth/sign_in"
            })
        );
    }
}
