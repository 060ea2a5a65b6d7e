//! facelink-client — Talks to the remote face-recognition service.
//!
//! Provides the HTTP client and its bearer-token session, the persisted
//! administrator credentials, and a keyed runner for user-initiated actions.

pub mod api;
pub mod config;
pub mod credentials;
pub mod service;
pub mod session;
pub mod tasks;

pub use api::FaceClient;
pub use config::ClientConfig;
pub use credentials::{CredentialStore, Credentials};
pub use service::FaceService;
pub use session::Session;
pub use tasks::{ActionHandle, ActionKey, ActionRunner};

/// Library version, shown on the settings screen.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
