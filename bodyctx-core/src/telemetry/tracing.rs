//! Tracing core rexport, for your convenience.
//!
//! bodyctx only emits events, it never installs a subscriber:
//! that choice is left to the application.

#[doc(inline)]
pub use tracing::*;
