//! Request scoped context for Rust http services, carried by the request body.
//!
//! `bodyctx` lets request handling code attach arbitrary key-value data
//! to an incoming request and retrieve it later during the lifetime of
//! that same request, without changing the request type and without
//! threading extra parameters through every call.
//!
//! It does so by replacing the request [`Body`] with a decorator,
//! the carrier, which streams exactly like the original body and carries
//! a mutable mapping on top. Because middleware often wraps a body in
//! decorators of its own, the carrier is also found when buried underneath
//! such decorators, as long as they are [unwrappable](http::body::Unwrappable).
//!
//! | category | support list |
//! |-|-|
//! | ✅ [context](http::context) | ✅ [set](http::context::set) ⸱ ✅ [get](http::context::get) ⸱ ✅ [get_ok](http::context::get_ok) ⸱ ✅ [get_string](http::context::get_string) ⸱ ✅ [get_all](http::context::get_all) ⸱ ✅ [delete](http::context::delete) ⸱ ✅ [clear](http::context::clear) |
//! | ✅ [body](http::body) | ✅ [type-erased body](http::Body) ⸱ ✅ [length limit](http::body::LimitedBody) ⸱ ✅ [tracing](http::body::TraceBody) |
//! | ✅ [middleware](http::layer) | ✅ [context layer](http::layer::ContextLayer) ⸱ ✅ [Service] ⸱ ✅ [Layer] |
//!
//! # Example
//!
//! ```
//! use bodyctx::http::{Body, Request, context};
//!
//! let mut req = Request::new(Body::from("hello"));
//! context::set(&mut req, "user", "john");
//!
//! assert_eq!(context::get_string(&mut req, "user"), "john");
//! assert!(context::get_ok(&mut req, "missing").is_none());
//! ```
//!
//! [`Body`]: http::Body

#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]
#![forbid(unsafe_code)]

#[doc(inline)]
pub use ::bodyctx_core::{Layer, Service, error, layer, service, telemetry};

#[cfg(feature = "http")]
#[doc(inline)]
pub use ::bodyctx_http as http;
