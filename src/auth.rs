//! Realm and client identifiers plus the redacted bearer-token wrapper.

pub mod id;
pub mod secret;

pub use id::*;
pub use secret::*;
