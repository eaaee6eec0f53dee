use super::{Body, Frame, SizeHint, StreamingBody, Unwrappable};
use bodyctx_core::bytes::Bytes;
use bodyctx_core::error::BoxError;
use bodyctx_core::telemetry::tracing;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

/// A [`StreamingBody`] decorator which yields at most `limit` bytes of data,
/// failing with a [`LengthLimitError`] once more is received.
///
/// The decorator is [`Unwrappable`].
#[derive(Debug)]
pub struct LimitedBody {
    inner: Body,
    limit: usize,
    remaining: usize,
}

impl LimitedBody {
    /// Create a new [`LimitedBody`] allowing at most `limit` bytes.
    pub fn new(inner: Body, limit: usize) -> Self {
        Self {
            inner,
            limit,
            remaining: limit,
        }
    }

    /// The maximum amount of bytes this body yields.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The amount of bytes which can still be yielded.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Consume this [`LimitedBody`], returning the wrapped [`Body`].
    pub fn into_inner(self) -> Body {
        self.inner
    }
}

impl Unwrappable for LimitedBody {
    fn inner(&self) -> &Body {
        &self.inner
    }

    fn inner_mut(&mut self) -> &mut Body {
        &mut self.inner
    }
}

impl StreamingBody for LimitedBody {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let result = match ready!(Pin::new(&mut this.inner).poll_frame(cx)) {
            None => None,
            Some(Ok(frame)) => match frame.data_ref().map(|data| data.len()) {
                Some(size) if size > this.remaining => {
                    tracing::debug!(
                        limit = this.limit,
                        frame.size = size,
                        "body length limit exceeded"
                    );
                    this.remaining = 0;
                    Some(Err(LengthLimitError { limit: this.limit }.into()))
                }
                Some(size) => {
                    this.remaining -= size;
                    Some(Ok(frame))
                }
                None => Some(Ok(frame)),
            },
            Some(Err(err)) => Some(Err(err)),
        };

        Poll::Ready(result)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        let Ok(n) = u64::try_from(self.remaining) else {
            return self.inner.size_hint();
        };

        let mut hint = self.inner.size_hint();
        if hint.lower() >= n {
            hint.set_exact(n);
        } else if let Some(max) = hint.upper() {
            hint.set_upper(n.min(max));
        } else {
            hint.set_upper(n);
        }
        hint
    }
}

/// An error returned when a [`LimitedBody`] exceeds its length limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthLimitError {
    limit: usize,
}

impl LengthLimitError {
    /// The limit which was exceeded.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl fmt::Display for LengthLimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "length limit of {} bytes exceeded", self.limit)
    }
}

impl std::error::Error for LengthLimitError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::util::BodyExt;
    use bodyctx_core::error::is_caused_by;

    #[tokio::test]
    async fn test_within_limit() {
        let body = Body::from("hello").limited(5);
        let bytes = body.collect().await.unwrap().to_bytes();
        assert_eq!(bytes, "hello");
    }

    #[tokio::test]
    async fn test_exceeds_limit() {
        let body = Body::from("hello world").limited(5);
        let err = body.collect().await.unwrap_err();
        assert!(is_caused_by::<LengthLimitError>(&*err));
        assert_eq!(
            err.downcast_ref::<LengthLimitError>().unwrap().limit(),
            5
        );
    }

    #[test]
    fn test_size_hint_is_capped() {
        let body = LimitedBody::new(Body::from("hello world"), 5);
        assert_eq!(body.size_hint().exact(), Some(5));

        let body = LimitedBody::new(Body::from("hi"), 5);
        assert_eq!(body.size_hint().exact(), Some(2));
    }

    #[test]
    fn test_unwrappable() {
        let body = Body::from("x").limited(1);
        assert!(body.is::<LimitedBody>());
        assert_eq!(body.downcast_ref::<LimitedBody>().unwrap().remaining(), 1);
        assert!(body.inner().is_some());
    }
}
