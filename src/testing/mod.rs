//! Testing utilities for the daring-different backend
//!
//! Available to unit tests and, with the `testing` feature, to integration
//! tests.
//!
//! - [`fixtures`] - Pre-built sessions, settings and application state
//! - [`mock`] - Fake identity/checkout providers and a failing storage backend
//!
//! ```rust,ignore
//! use daring_different::testing::{fixtures::TestFixtures, mock::MockIdentityProvider};
//!
//! let state = TestFixtures::app_state(
//!     MockIdentityProvider::with_session(),
//!     daring_different::testing::mock::MockCheckoutProvider::succeeding(),
//! );
//! assert!(!state.settings.cookies.secure);
//! ```

pub mod fixtures;
pub mod mock;

pub use fixtures::TestFixtures;

/// Common test constants
pub mod constants {
    /// Default test email address
    pub const TEST_EMAIL: &str = "reader@daringdifferent.com";

    /// Default test user id
    pub const TEST_USER_ID: &str = "8f14e45f-ceea-467f-a0e6-7b5c1e9a2d41";

    /// Secret the test storage cookie key is derived from
    pub const TEST_SESSION_SECRET: &str = "test-session-secret-for-storage-cookies";

    /// Base URL of the fake site
    pub const TEST_BASE_URL: &str = "https://daringdifferent.com";

    /// Fake identity provider URL
    pub const TEST_IDENTITY_URL: &str = "https://project.supabase.co";
}
