//! igdm-instagram: Instagram client for the DM server
//!
//! Talks to the Instagram private mobile API with a session cookie and
//! converts its responses into the `igdm-core` data model. The rest of the
//! workspace only sees [`DirectApi`] and the [`InstagramSession`] handle.

pub mod api;
pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;
pub mod session;

pub use api::{DirectApi, DirectSendReceipt, InstagramApi};
pub use error::{InstagramError, Result};
#[cfg(any(test, feature = "test-support"))]
pub use mock::{MockCall, MockDirectApi};
pub use session::InstagramSession;
