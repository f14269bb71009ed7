#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the daring-different backend
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod callback;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod navigation;
pub mod payments;
pub mod session;
pub mod settings;
pub mod storage;
pub mod utils;

// Test utilities for unit tests and, behind the `testing` feature, integration tests
#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use callback::{CallbackResolver, CallbackState, PageGuard};
pub use handlers::{configure_services, AppState};
pub use identity::{IdentityProvider, ProviderError, SupabaseIdentityClient};
pub use navigation::{NavigateOptions, NavigationState, Navigator, RecordingNavigator};
pub use payments::{CheckoutProvider, StripeCheckoutClient};
pub use session::{AuthSessionCookie, RedirectPathStore, RedirectStore, SessionSink};
pub use settings::DaringSettings;
pub use storage::{SessionStorage, StorageError};
