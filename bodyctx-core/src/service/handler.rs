//! `async fn(Request) -> Result<Response, Error>` as a [`Service`].

use crate::Service;
use std::fmt;

/// Create a [`ServiceFn`] from a function.
pub const fn service_fn<F>(f: F) -> ServiceFn<F> {
    ServiceFn { f }
}

/// A [`ServiceFn`] is a [`Service`] implemented using a function.
///
/// You do not need to implement this type yourself.
/// Instead, use the [`service_fn`] function to create a [`ServiceFn`].
#[derive(Clone)]
pub struct ServiceFn<F> {
    f: F,
}

impl<F> fmt::Debug for ServiceFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceFn")
            .field("f", &format_args!("{}", std::any::type_name::<F>()))
            .finish()
    }
}

impl<F, Fut, Request, Response, Error> Service<Request> for ServiceFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
    Response: Send + 'static,
    Error: Send + 'static,
{
    type Response = Response;
    type Error = Error;

    #[inline]
    fn serve(
        &self,
        req: Request,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + '_ {
        (self.f)(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_service_fn() {
        let svc = service_fn(|x: usize| async move { Ok::<_, Infallible>(x * 2) });
        assert_eq!(svc.serve(21).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_service_fn_shared() {
        let svc = Arc::new(service_fn(|s: &'static str| async move {
            Ok::<_, Infallible>(s.len())
        }));
        assert_eq!(svc.serve("bodyctx").await.unwrap(), 7);
    }
}
