//! Error utilities for bodyctx and its users.
//!
//! Errors that cross a type-erased boundary (such as the erased
//! `Body` of `bodyctx-http`) are boxed as a [`BoxError`]. The original error can always be
//! recovered by downcasting it:
//!
//! ```
//! use bodyctx_core::error::BoxError;
//!
//! #[derive(Debug)]
//! struct Oops;
//!
//! impl std::fmt::Display for Oops {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         f.write_str("oops")
//!     }
//! }
//!
//! impl std::error::Error for Oops {}
//!
//! let err: BoxError = Oops.into();
//! assert!(err.downcast_ref::<Oops>().is_some());
//! ```

/// Alias for a type-erased error type.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Returns true if the given [`BoxError`], or any error in its source chain,
/// is of type `T`.
pub fn is_caused_by<T>(err: &(dyn std::error::Error + 'static)) -> bool
where
    T: std::error::Error + 'static,
{
    let mut current = Some(err);
    while let Some(err) = current {
        if err.is::<T>() {
            return true;
        }
        current = err.source();
    }
    false
}
