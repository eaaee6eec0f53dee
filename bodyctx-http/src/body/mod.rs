//! Asynchronous, type-erased HTTP request or response body.
//!
//! See [`Body`] for more details.
//!
//! # Unwrappable decorators
//!
//! Middleware frequently wraps a body into a decorator of its own,
//! to limit it, trace it, compress it, ... A [`Body`] created with
//! [`Body::new`] is opaque: nothing can be found beneath it. A decorator
//! registered with [`Body::unwrappable`] on the other hand exposes the inner
//! [`Body`] it owns through the [`Unwrappable`] capability, which keeps
//! everything nested below it discoverable, such as the
//! [`ContextBody`] that carries the request context.

use crate::context::ContextBody;
use bodyctx_core::bytes::Bytes;
use bodyctx_core::error::BoxError;
use std::any::Any;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

// Things from http-body crate
pub use http_body::Body as StreamingBody;
pub use http_body::Frame;
pub use http_body::SizeHint;

// Things from http-body-util crate
pub mod util {
    pub use http_body_util::*;
}

mod limit;
pub use limit::{LengthLimitError, LimitedBody};

mod trace;
pub use trace::TraceBody;

/// A body decorator which exposes the [`Body`] it wraps.
///
/// Implement this for your own decorators and register them using
/// [`Body::unwrappable`] in order to keep the bodies below them
/// (and the request context carried by them) reachable.
pub trait Unwrappable {
    /// Get a shared reference to the wrapped [`Body`].
    fn inner(&self) -> &Body;

    /// Get an exclusive reference to the wrapped [`Body`].
    fn inner_mut(&mut self) -> &mut Body;
}

/// Access to the [`Body`] of a request-like value,
/// such as a [`Request`] or [`Response`].
///
/// [`Request`]: crate::Request
/// [`Response`]: crate::Response
pub trait HasBody {
    /// Get a shared reference to the [`Body`].
    fn body(&self) -> &Body;

    /// Get an exclusive reference to the [`Body`],
    /// which allows it to be replaced.
    fn body_mut(&mut self) -> &mut Body;
}

impl HasBody for Body {
    #[inline(always)]
    fn body(&self) -> &Body {
        self
    }

    #[inline(always)]
    fn body_mut(&mut self) -> &mut Body {
        self
    }
}

impl HasBody for http::Request<Body> {
    #[inline(always)]
    fn body(&self) -> &Body {
        Self::body(self)
    }

    #[inline(always)]
    fn body_mut(&mut self) -> &mut Body {
        Self::body_mut(self)
    }
}

impl HasBody for http::Response<Body> {
    #[inline(always)]
    fn body(&self) -> &Body {
        Self::body(self)
    }

    #[inline(always)]
    fn body_mut(&mut self) -> &mut Body {
        Self::body_mut(self)
    }
}

type PollFrame = Poll<Option<Result<Frame<Bytes>, BoxError>>>;

/// Object safe view on a body stored within a [`Body`].
trait DynBody: Send + Sync + 'static {
    fn poll_frame_dyn(&mut self, cx: &mut Context<'_>) -> PollFrame;
    fn is_end_stream_dyn(&self) -> bool;
    fn size_hint_dyn(&self) -> SizeHint;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> Option<&mut dyn Any>;

    fn unwrap_ref(&self) -> Option<&Body>;
    fn unwrap_mut(&mut self) -> Option<&mut Body>;
}

/// A body which might not be [`Unpin`], pinned on the heap.
///
/// Nothing can be found beneath it.
struct Opaque<B>(Pin<Box<B>>);

impl<B> DynBody for Opaque<B>
where
    B: StreamingBody<Data = Bytes, Error: Into<BoxError>> + Send + Sync + 'static,
{
    fn poll_frame_dyn(&mut self, cx: &mut Context<'_>) -> PollFrame {
        self.0.as_mut().poll_frame(cx).map_err(Into::into)
    }

    fn is_end_stream_dyn(&self) -> bool {
        self.0.is_end_stream()
    }

    fn size_hint_dyn(&self) -> SizeHint {
        self.0.size_hint()
    }

    fn as_any(&self) -> &dyn Any {
        self.0.as_ref().get_ref()
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        None
    }

    fn unwrap_ref(&self) -> Option<&Body> {
        None
    }

    fn unwrap_mut(&mut self) -> Option<&mut Body> {
        None
    }
}

/// An [`Unwrappable`] decorator, stored unpinned so it can be walked through.
struct Transparent<D>(D);

impl<D> DynBody for Transparent<D>
where
    D: StreamingBody<Data = Bytes, Error: Into<BoxError>>
        + Unwrappable
        + Unpin
        + Send
        + Sync
        + 'static,
{
    fn poll_frame_dyn(&mut self, cx: &mut Context<'_>) -> PollFrame {
        Pin::new(&mut self.0).poll_frame(cx).map_err(Into::into)
    }

    fn is_end_stream_dyn(&self) -> bool {
        self.0.is_end_stream()
    }

    fn size_hint_dyn(&self) -> SizeHint {
        self.0.size_hint()
    }

    fn as_any(&self) -> &dyn Any {
        &self.0
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        Some(&mut self.0)
    }

    fn unwrap_ref(&self) -> Option<&Body> {
        Some(self.0.inner())
    }

    fn unwrap_mut(&mut self) -> Option<&mut Body> {
        Some(self.0.inner_mut())
    }
}

#[expect(
    clippy::unwrap_used,
    reason = "the slot is only emptied by a successful downcast"
)]
pub(crate) fn try_downcast<T, K>(k: K) -> Result<T, K>
where
    T: 'static,
    K: 'static,
{
    let mut k = Some(k);
    if let Some(k) = <dyn Any>::downcast_mut::<Option<T>>(&mut k) {
        Ok(k.take().unwrap())
    } else {
        Err(k.unwrap())
    }
}

/// The body type used in bodyctx requests and responses.
///
/// Reading the body is done by polling its frames as a [`StreamingBody`],
/// closing it is done by dropping it. Both are forwarded unchanged
/// by every decorator found in this crate.
#[must_use]
pub struct Body(Box<dyn DynBody>);

impl Body {
    /// Create a new opaque [`Body`] that wraps another [`StreamingBody`].
    ///
    /// A [`Body`] is returned as-is, and the decorators of this crate
    /// ([`ContextBody`], [`LimitedBody`] and [`TraceBody`])
    /// are registered as [unwrappable](Self::unwrappable).
    pub fn new<B>(body: B) -> Self
    where
        B: StreamingBody<Data = Bytes, Error: Into<BoxError>> + Send + Sync + 'static,
    {
        let body = match try_downcast::<Self, _>(body) {
            Ok(body) => return body,
            Err(body) => body,
        };
        let body = match try_downcast::<ContextBody, _>(body) {
            Ok(body) => return Self::unwrappable(body),
            Err(body) => body,
        };
        let body = match try_downcast::<LimitedBody, _>(body) {
            Ok(body) => return Self::unwrappable(body),
            Err(body) => body,
        };
        match try_downcast::<TraceBody, _>(body) {
            Ok(body) => Self::unwrappable(body),
            Err(body) => Self(Box::new(Opaque(Box::pin(body)))),
        }
    }

    /// Create a new [`Body`] from an [`Unwrappable`] decorator,
    /// keeping the bodies nested within it reachable.
    pub fn unwrappable<D>(decorator: D) -> Self
    where
        D: StreamingBody<Data = Bytes, Error: Into<BoxError>>
            + Unwrappable
            + Unpin
            + Send
            + Sync
            + 'static,
    {
        Self(Box::new(Transparent(decorator)))
    }

    /// Create an empty body.
    pub fn empty() -> Self {
        Self::new(util::Empty::<Bytes>::new())
    }

    /// Wrap this [`Body`] in a [`LimitedBody`] with the given maximum size in bytes.
    pub fn limited(self, limit: usize) -> Self {
        Self::unwrappable(LimitedBody::new(self, limit))
    }

    /// Wrap this [`Body`] in a [`TraceBody`].
    pub fn traced(self) -> Self {
        Self::unwrappable(TraceBody::new(self))
    }

    /// Returns true if this body is of type `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    /// Get a shared reference to this body as type `T`, if it is one.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }

    /// Get an exclusive reference to this body as type `T`, if it is one.
    ///
    /// Only bodies created using [`Body::unwrappable`] can be borrowed
    /// exclusively, opaque bodies are pinned in place.
    #[must_use]
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.0.as_any_mut()?.downcast_mut()
    }

    /// Returns true if this body is an [`Unwrappable`] decorator.
    #[must_use]
    pub fn is_unwrappable(&self) -> bool {
        self.0.unwrap_ref().is_some()
    }

    /// Get a shared reference to the [`Body`] wrapped by this decorator,
    /// `None` for opaque bodies.
    #[must_use]
    pub fn inner(&self) -> Option<&Self> {
        self.0.unwrap_ref()
    }

    /// Get an exclusive reference to the [`Body`] wrapped by this decorator,
    /// `None` for opaque bodies.
    #[must_use]
    pub fn inner_mut(&mut self) -> Option<&mut Self> {
        self.0.unwrap_mut()
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Body");
        d.field("unwrappable", &self.is_unwrappable());
        if let Some(inner) = self.inner() {
            d.field("inner", inner);
        }
        d.finish()
    }
}

impl StreamingBody for Body {
    type Data = Bytes;
    type Error = BoxError;

    #[inline]
    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        self.get_mut().0.poll_frame_dyn(cx)
    }

    #[inline]
    fn size_hint(&self) -> SizeHint {
        self.0.size_hint_dyn()
    }

    #[inline]
    fn is_end_stream(&self) -> bool {
        self.0.is_end_stream_dyn()
    }
}

macro_rules! body_from_impl {
    ($ty:ty) => {
        impl From<$ty> for Body {
            fn from(buf: $ty) -> Self {
                Self::new(util::Full::<Bytes>::from(buf))
            }
        }
    };
}

body_from_impl!(&'static [u8]);
body_from_impl!(std::borrow::Cow<'static, [u8]>);
body_from_impl!(Vec<u8>);

body_from_impl!(&'static str);
body_from_impl!(std::borrow::Cow<'static, str>);
body_from_impl!(String);

body_from_impl!(Bytes);

impl From<ContextBody> for Body {
    fn from(body: ContextBody) -> Self {
        Self::unwrappable(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use util::BodyExt;

    #[derive(Debug)]
    struct Wrapper(Body);

    impl StreamingBody for Wrapper {
        type Data = Bytes;
        type Error = BoxError;

        fn poll_frame(
            self: Pin<&mut Self>,
            cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
            Pin::new(&mut self.get_mut().0).poll_frame(cx)
        }
    }

    impl Unwrappable for Wrapper {
        fn inner(&self) -> &Body {
            &self.0
        }

        fn inner_mut(&mut self) -> &mut Body {
            &mut self.0
        }
    }

    #[tokio::test]
    async fn test_body_from_str_collects() {
        let body = Body::from("hello");
        let bytes = body.collect().await.unwrap().to_bytes();
        assert_eq!(bytes, "hello");
    }

    #[test]
    fn test_new_body_does_not_double_wrap() {
        let body = Body::new(Body::from("x").traced());
        assert!(body.is::<TraceBody>());
    }

    #[test]
    fn test_new_body_keeps_own_decorators_unwrappable() {
        let body = Body::new(LimitedBody::new(Body::from("x"), 8));
        assert!(body.is::<LimitedBody>());
        assert!(body.is_unwrappable());

        let body = Body::new(TraceBody::new(Body::from("x")));
        assert!(body.is::<TraceBody>());
        assert!(body.is_unwrappable());

        let body = Body::new(ContextBody::new(Body::from("x")));
        assert!(body.is::<ContextBody>());
        assert!(body.is_unwrappable());
    }

    #[test]
    fn test_opaque_body_hides_inner() {
        let body = Body::new(Wrapper(Body::from("x")));
        assert!(body.is::<Wrapper>());
        assert!(body.downcast_ref::<Wrapper>().is_some());
        assert!(!body.is_unwrappable());
        assert!(body.inner().is_none());
    }

    #[test]
    fn test_unwrappable_body_exposes_inner() {
        let mut body = Body::unwrappable(Wrapper(Body::from("x")));
        assert!(body.is_unwrappable());
        assert!(body.downcast_mut::<Wrapper>().is_some());

        let inner = body.inner_mut().unwrap();
        assert!(!inner.is_unwrappable());
        assert!(inner.inner().is_none());
    }

    #[test]
    fn test_opaque_body_cannot_be_borrowed_mutably() {
        let mut body = Body::from("x");
        assert!(body.downcast_mut::<util::Full<Bytes>>().is_none());
        assert!(body.downcast_ref::<util::Full<Bytes>>().is_some());
    }

    #[tokio::test]
    async fn test_unwrappable_body_streams_inner() {
        let body = Body::unwrappable(Wrapper(Body::unwrappable(Wrapper(Body::from(
            "nested",
        )))));
        let bytes = body.collect().await.unwrap().to_bytes();
        assert_eq!(bytes, "nested");
    }
}
