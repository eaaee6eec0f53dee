//! Middleware that installs the request context before the inner service runs,
//! optionally seeding it with default values.
//!
//! # Example
//!
//! ```
//! use bodyctx_core::{Layer, Service, service::service_fn};
//! use bodyctx_http::{Body, Request, context, layer::ContextLayer};
//! use std::convert::Infallible;
//!
//! async fn handle(mut req: Request) -> Result<String, Infallible> {
//!     Ok(context::get_string(&mut req, "realm"))
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let svc = ContextLayer::new()
//!     .with_value("realm", "public")
//!     .into_layer(service_fn(handle));
//!
//! let realm = svc.serve(Request::new(Body::empty())).await.unwrap();
//! assert_eq!(realm, "public");
//! # }
//! ```

use crate::body::HasBody;
use crate::context::{self, Key, Value};
use bodyctx_core::{Layer, Service};
use std::fmt;
use std::sync::Arc;

/// [`Layer`] which installs the request context for every request
/// passing through the produced [`ContextService`].
#[derive(Debug, Clone, Default)]
pub struct ContextLayer {
    defaults: Vec<(Key, Value)>,
}

impl ContextLayer {
    /// Create a new [`ContextLayer`] without default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the context of every request with the given value,
    /// unless a value is already present for the key.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.set_value(key, value);
        self
    }

    /// Seed the context of every request with the given value,
    /// unless a value is already present for the key.
    pub fn set_value(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.defaults.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.defaults.push((key, value)),
        }
        self
    }
}

impl<S> Layer<S> for ContextLayer {
    type Service = ContextService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ContextService {
            inner,
            defaults: self.defaults.as_slice().into(),
        }
    }

    fn into_layer(self, inner: S) -> Self::Service {
        ContextService {
            inner,
            defaults: self.defaults.into(),
        }
    }
}

/// Middleware which installs the request context,
/// created using [`ContextLayer`].
pub struct ContextService<S> {
    inner: S,
    defaults: Arc<[(Key, Value)]>,
}

impl<S: fmt::Debug> fmt::Debug for ContextService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextService")
            .field("inner", &self.inner)
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl<S: Clone> Clone for ContextService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            defaults: self.defaults.clone(),
        }
    }
}

impl<S> ContextService<S> {
    /// Create a new [`ContextService`] without default values.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            defaults: Arc::new([]),
        }
    }

    /// Get a reference to the inner service.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Consume `self`, returning the inner service.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<R, S> Service<R> for ContextService<S>
where
    R: HasBody + Send + 'static,
    S: Service<R>,
{
    type Response = S::Response;
    type Error = S::Error;

    fn serve(
        &self,
        mut req: R,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + '_ {
        let carrier = context::resolve(&mut req);
        for (key, value) in self.defaults.iter() {
            carrier.context().insert_if_absent(key, value.clone());
        }
        self.inner.serve(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::util::BodyExt;
    use crate::context::ContextBody;
    use crate::{Body, Request};
    use bodyctx_core::service::service_fn;
    use std::convert::Infallible;

    #[tokio::test]
    async fn test_installs_carrier() {
        let svc = ContextLayer::new().into_layer(service_fn(async |req: Request| {
            Ok::<_, Infallible>(req.body().is::<ContextBody>())
        }));
        assert!(svc.serve(Request::new(Body::empty())).await.unwrap());
    }

    #[tokio::test]
    async fn test_seeds_defaults_without_overwriting() {
        let layer = ContextLayer::new()
            .with_value("realm", "public")
            .with_value("role", "guest");
        let svc = layer.layer(service_fn(async |mut req: Request| {
            Ok::<_, Infallible>((
                context::get_string(&mut req, "realm"),
                context::get_string(&mut req, "role"),
            ))
        }));

        let mut req = Request::new(Body::empty());
        context::set(&mut req, "role", "admin");

        let (realm, role) = svc.serve(req).await.unwrap();
        assert_eq!(realm, "public");
        assert_eq!(role, "admin");
    }

    #[tokio::test]
    async fn test_keeps_existing_carrier() {
        let svc = ContextLayer::new().into_layer(service_fn(async |mut req: Request| {
            Ok::<_, Infallible>(context::get_all(&mut req))
        }));

        let mut req = Request::new(Body::empty());
        let before = context::get_all(&mut req);
        let after = svc.serve(req).await.unwrap();
        assert!(before.ptr_eq(&after));
    }

    #[tokio::test]
    async fn test_body_is_untouched() {
        let svc = ContextLayer::new().into_layer(service_fn(async |req: Request| {
            req.into_body().collect().await.map(|c| c.to_bytes())
        }));
        let bytes = svc.serve(Request::new(Body::from("data"))).await.unwrap();
        assert_eq!(bytes, "data");
    }

    #[tokio::test]
    async fn test_stacked_layers_outer_defaults_win() {
        let outer = ContextLayer::new().with_value("realm", "outer");
        let inner = ContextLayer::new()
            .with_value("realm", "inner")
            .with_value("role", "guest");

        let svc = (&outer, inner, ()).layer(service_fn(async |mut req: Request| {
            Ok::<_, Infallible>((
                context::get_string(&mut req, "realm"),
                context::get_string(&mut req, "role"),
                context::get_all(&mut req).len(),
            ))
        }));

        let (realm, role, len) = svc.serve(Request::new(Body::empty())).await.unwrap();
        assert_eq!(realm, "outer");
        assert_eq!(role, "guest");
        assert_eq!(len, 2);
    }

    #[test]
    fn test_set_value_overwrites_default() {
        let mut layer = ContextLayer::new();
        layer.set_value("a", 1u8).set_value("a", 2u8);

        let svc = layer.into_layer(service_fn(async |mut req: Request| {
            Ok::<_, Infallible>(context::get(&mut req, "a"))
        }));
        let value = tokio_test::block_on(svc.serve(Request::new(Body::empty()))).unwrap();
        assert_eq!(value.downcast_ref::<u8>(), Some(&2));
    }
}
