//! `async fn serve(&self, Request) -> Result<Response, Error>`
//!
//! # bodyctx core
//!
//! The minimal service and layer abstractions that the `bodyctx` middleware
//! is built on, together with the shared error type and the tracing re-export.
//!
//! Heavily inspired by [tower-service](https://docs.rs/tower-service/0.3.0/tower_service/trait.Service.html),
//! minus the `poll_ready` back-pressure contract, which request scoped
//! middleware has no use for.

#[doc(hidden)]
pub use ::bytes;

pub mod error;

pub mod service;
pub use service::Service;

pub mod layer;
pub use layer::Layer;

pub mod telemetry;
