//! Client-side session state: token persistence, claims decoding, and the
//! route guard that gates navigation on token presence.

pub mod claims;
pub mod error;
pub mod guard;
pub mod store;

pub use claims::{Claims, decode_claims};
pub use error::{DecodeError, SessionError, SessionResult};
pub use guard::{GuardDecision, RouteGuard};
pub use store::SessionStore;

/// Fixed key under which the token is persisted, matching the name the
/// backend and the navigation cookie use for it.
pub const TOKEN_KEY: &str = "access_token";
