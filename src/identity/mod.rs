//! Caller identity.
//!
//! Authentication happens upstream. The identity provider forwards the
//! authenticated owner id in the `X-Owner-Id` header and this crate trusts it
//! as given.

mod middleware;

pub use middleware::{OWNER_HEADER, OwnerRejection, RequireOwner};
