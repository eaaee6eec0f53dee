use super::ContextMap;
use crate::body::{Body, Frame, SizeHint, StreamingBody, Unwrappable};
use bodyctx_core::bytes::Bytes;
use bodyctx_core::error::BoxError;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A [`StreamingBody`] decorator which carries the context of a request.
///
/// It streams exactly like the [`Body`] it wraps, and on top of that
/// owns the [`ContextMap`] used by the accessors in [`crate::context`].
///
/// A [`ContextBody`] is [`Unwrappable`] itself, so other decorators
/// (and carriers) nested below it remain reachable.
#[derive(Debug)]
pub struct ContextBody {
    inner: Body,
    context: ContextMap,
}

impl ContextBody {
    /// Create a new [`ContextBody`] with an empty context.
    pub fn new(inner: Body) -> Self {
        Self::with_context(inner, ContextMap::new())
    }

    /// Create a new [`ContextBody`] carrying the given context.
    pub fn with_context(inner: Body, context: ContextMap) -> Self {
        Self { inner, context }
    }

    /// Get the handle to the carried context.
    #[must_use]
    pub fn context(&self) -> &ContextMap {
        &self.context
    }

    /// Replace the carried context, returning the previous one.
    pub fn replace_context(&mut self, context: ContextMap) -> ContextMap {
        mem::replace(&mut self.context, context)
    }

    /// Replace the carried context by a new empty one,
    /// returning the previous one.
    pub fn clear_context(&mut self) -> ContextMap {
        self.replace_context(ContextMap::new())
    }

    /// Consume this [`ContextBody`], returning the wrapped [`Body`].
    pub fn into_inner(self) -> Body {
        self.inner
    }
}

impl Unwrappable for ContextBody {
    fn inner(&self) -> &Body {
        &self.inner
    }

    fn inner_mut(&mut self) -> &mut Body {
        &mut self.inner
    }
}

impl StreamingBody for ContextBody {
    type Data = Bytes;
    type Error = BoxError;

    #[inline]
    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Pin::new(&mut self.get_mut().inner).poll_frame(cx)
    }

    #[inline]
    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    #[inline]
    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
