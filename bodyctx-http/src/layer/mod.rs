//! Http middleware built on top of the request context.

pub mod context;
pub use context::{ContextLayer, ContextService};
