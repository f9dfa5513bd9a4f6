//! Transport-neutral resource endpoint over `opsdesk_core`.
//!
//! # Responsibility
//! - Authenticate every request before any kind lookup or service call.
//! - Decode JSON bodies into typed fields and patches, encode records back.
//! - Map core errors onto a small, stable status set.
//!
//! # Invariants
//! - Handlers never panic; every failure becomes an [`ApiResponse`].
//! - The core never sees a request that failed authentication.

mod auth;
mod config;
mod endpoint;
mod envelope;
mod router;

pub use auth::{AuthError, Authenticator, StaticTokenAuthenticator};
pub use config::{ApiConfig, ApiConfigError, ENV_API_TOKENS};
pub use endpoint::{ResourceEndpoint, ResourceHandler};
pub use envelope::{Action, ApiRequest, ApiResponse, ApiStatus};
pub use router::Api;
