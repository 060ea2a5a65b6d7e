//! facelink-core — Wire types and pure logic for the face-recognition client.
//!
//! Holds the request/response bodies exchanged with the remote service,
//! the closed error taxonomy, the JPEG data-URI codec, date display
//! formatting and the outcome/presentation layer used by screens.

pub mod codec;
pub mod dates;
pub mod error;
pub mod outcome;
pub mod types;

pub use error::ApiError;
pub use outcome::{Action, Outcome, Presentation};
pub use types::{MatchResult, UserRecord};
