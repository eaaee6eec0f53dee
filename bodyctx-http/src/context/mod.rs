//! Request scoped context, carried by the request body.
//!
//! The accessors in this module attach key-value data to a request
//! without changing its type: the first accessor called on a request
//! replaces its [`Body`] with a [`ContextBody`], a decorator which streams
//! exactly like the body it wraps and carries a [`ContextMap`] on top.
//!
//! Every later accessor call finds that same carrier again, even when other
//! middleware wrapped the body in decorators of its own in the meantime,
//! as long as those decorators are [unwrappable](crate::body::Unwrappable).
//!
//! ```
//! use bodyctx_http::{Body, Request, context};
//!
//! let mut req = Request::new(Body::from("hello"));
//!
//! context::set(&mut req, "user", "john");
//! context::set(&mut req, "admin", false);
//!
//! // middleware wrapping the body does not hide the context
//! let body = std::mem::take(req.body_mut());
//! *req.body_mut() = body.traced();
//!
//! assert_eq!(context::get_string(&mut req, "user"), "john");
//! assert_eq!(context::get(&mut req, "admin").downcast_ref::<bool>(), Some(&false));
//! assert!(context::get(&mut req, "missing").is_null());
//! assert!(context::get_ok(&mut req, "missing").is_none());
//!
//! context::delete(&mut req, "admin");
//! assert_eq!(context::get_all(&mut req).len(), 1);
//! ```

use crate::body::{Body, HasBody};
use bodyctx_core::telemetry::tracing;
use std::mem;

mod key;
pub use key::Key;

mod value;
pub use value::Value;

mod map;
pub use map::ContextMap;

mod carrier;
pub use carrier::ContextBody;

/// Find the [`ContextBody`] of the request, installing one if there is none.
///
/// The body itself is checked first, after which the chain of
/// [unwrappable](crate::body::Unwrappable) decorators is walked,
/// returning the first carrier found. When no carrier is found the
/// body of the request is wrapped in a new [`ContextBody`] with an empty
/// context, which is returned.
///
/// Calling [`resolve`] again on the same request returns the same carrier.
pub fn resolve<R>(req: &mut R) -> &mut ContextBody
where
    R: HasBody + ?Sized,
{
    let body = req.body_mut();
    match carrier_depth(body) {
        Some(0) => (),
        Some(depth) => {
            tracing::trace!(depth, "found nested context carrier");
        }
        None => {
            let inner = mem::take(body);
            *body = Body::unwrappable(ContextBody::new(inner));
            tracing::trace!("installed context carrier");
        }
    }
    carrier_mut(body)
}

/// Find the [`ContextBody`] of the request, without installing one.
///
/// Returns `None` if no accessor (or [`resolve`]) was used on the request yet,
/// or if the carrier is hidden below an opaque body.
#[must_use]
pub fn find<R>(req: &R) -> Option<&ContextBody>
where
    R: HasBody + ?Sized,
{
    let mut body = req.body();
    loop {
        if let Some(carrier) = body.downcast_ref::<ContextBody>() {
            return Some(carrier);
        }
        body = body.inner()?;
    }
}

/// Amount of decorators to unwrap before reaching the carrier.
fn carrier_depth(mut body: &Body) -> Option<usize> {
    let mut depth = 0;
    loop {
        if body.is::<ContextBody>() {
            return Some(depth);
        }
        body = body.inner()?;
        depth += 1;
    }
}

#[expect(
    clippy::expect_used,
    reason = "the chain holds a carrier: either one was found or one was just installed"
)]
fn carrier_mut(body: &mut Body) -> &mut ContextBody {
    find_carrier_mut(body).expect("context carrier in body chain")
}

fn find_carrier_mut(mut body: &mut Body) -> Option<&mut ContextBody> {
    loop {
        if body.is::<ContextBody>() {
            return body.downcast_mut();
        }
        body = body.inner_mut()?;
    }
}

/// Set the value for the given key in the context of the request,
/// overwriting any previous value.
pub fn set<R>(req: &mut R, key: impl Into<Key>, value: impl Into<Value>)
where
    R: HasBody + ?Sized,
{
    resolve(req).context().insert(key, value);
}

/// Get the value for the given key from the context of the request,
/// or [`Value::NULL`] if there is none.
///
/// Use [`get_ok`] to distinguish an absent key from a stored null value.
pub fn get<R>(req: &mut R, key: impl Into<Key>) -> Value
where
    R: HasBody + ?Sized,
{
    resolve(req).context().get(key).unwrap_or_default()
}

/// Get the value for the given key from the context of the request,
/// `None` if the key is absent.
pub fn get_ok<R>(req: &mut R, key: impl Into<Key>) -> Option<Value>
where
    R: HasBody + ?Sized,
{
    resolve(req).context().get(key)
}

/// Get the string value for the given key from the context of the request.
///
/// Returns an empty string if the key is absent
/// or its value is not a string.
pub fn get_string<R>(req: &mut R, key: impl Into<Key>) -> String
where
    R: HasBody + ?Sized,
{
    get(req, key).as_str().map(ToOwned::to_owned).unwrap_or_default()
}

/// Get the handle to the context of the request.
///
/// The handle aliases the context: changes made through it are seen
/// by the accessors, and the other way around, until [`clear`] is called.
pub fn get_all<R>(req: &mut R) -> ContextMap
where
    R: HasBody + ?Sized,
{
    resolve(req).context().clone()
}

/// Delete the value for the given key from the context of the request,
/// if there is one.
pub fn delete<R>(req: &mut R, key: impl Into<Key>)
where
    R: HasBody + ?Sized,
{
    resolve(req).context().remove(key);
}

/// Replace the context of the request by a new empty one.
///
/// Handles obtained using [`get_all`] before this call keep
/// referring to the previous context, with its values intact.
pub fn clear<R>(req: &mut R)
where
    R: HasBody + ?Sized,
{
    let previous = resolve(req).clear_context();
    tracing::trace!(entries = previous.len(), "cleared request context");
}
