use super::{Body, Frame, SizeHint, StreamingBody, Unwrappable};
use bodyctx_core::bytes::Bytes;
use bodyctx_core::error::BoxError;
use bodyctx_core::telemetry::tracing;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

/// A [`StreamingBody`] decorator which emits a trace event
/// for every frame it forwards, counting the data bytes as it goes.
///
/// The decorator is [`Unwrappable`].
#[derive(Debug)]
pub struct TraceBody {
    inner: Body,
    frames: usize,
    bytes: usize,
}

impl TraceBody {
    /// Create a new [`TraceBody`].
    pub fn new(inner: Body) -> Self {
        Self {
            inner,
            frames: 0,
            bytes: 0,
        }
    }

    /// The amount of data bytes forwarded so far.
    #[must_use]
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// Consume this [`TraceBody`], returning the wrapped [`Body`].
    pub fn into_inner(self) -> Body {
        self.inner
    }
}

impl Unwrappable for TraceBody {
    fn inner(&self) -> &Body {
        &self.inner
    }

    fn inner_mut(&mut self) -> &mut Body {
        &mut self.inner
    }
}

impl StreamingBody for TraceBody {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let result = ready!(Pin::new(&mut this.inner).poll_frame(cx));
        match &result {
            Some(Ok(frame)) => {
                this.frames += 1;
                if let Some(data) = frame.data_ref() {
                    this.bytes += data.len();
                    tracing::trace!(
                        frame.index = this.frames,
                        frame.size = data.len(),
                        body.bytes = this.bytes,
                        "body data frame"
                    );
                } else if frame.is_trailers() {
                    tracing::trace!(frame.index = this.frames, "body trailers frame");
                }
            }
            Some(Err(err)) => {
                tracing::debug!(body.bytes = this.bytes, "body error: {err}");
            }
            None => {
                tracing::trace!(
                    body.frames = this.frames,
                    body.bytes = this.bytes,
                    "body end of stream"
                );
            }
        }
        Poll::Ready(result)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
