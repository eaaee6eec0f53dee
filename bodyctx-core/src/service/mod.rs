//! Service type and utilities.
//!
//! Services are the abstraction of (leaf) services in bodyctx.

mod svc;
#[doc(inline)]
pub use svc::Service;

pub mod handler;
pub use handler::{ServiceFn, service_fn};
