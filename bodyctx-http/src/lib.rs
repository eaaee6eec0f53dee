//! bodyctx http types, body decorators and the request context
//!
//! # bodyctx
//!
//! Crate used by the end-user `bodyctx` crate and middleware authors alike.
//!
//! The [`context`] module attaches request scoped key-value data to a
//! [`Request`] by replacing its [`Body`] with a carrier decorator,
//! which the [`body`] decorators of this crate keep reachable.

#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]

pub mod body;
pub use body::{Body, HasBody, StreamingBody, Unwrappable};

pub mod context;

pub mod layer;

/// Type alias for [`http::Request`] whose body type defaults to [`Body`].
pub type Request<T = Body> = http::Request<T>;

/// Type alias for [`http::Response`] whose body type defaults to [`Body`].
pub type Response<T = Body> = http::Response<T>;

pub mod dep {
    //! Dependencies for bodyctx http modules.
    //!
    //! Exported for your convenience.

    pub mod http {
        //! Re-export of the [`http`] crate.
        //!
        //! A general purpose library of common HTTP types.
        //!
        //! [`http`]: https://docs.rs/http

        #[doc(inline)]
        pub use http::*;
    }

    pub mod http_body {
        //! Re-export of the [`http-body`] crate.
        //!
        //! Asynchronous HTTP request or response body.
        //!
        //! [`http-body`]: https://docs.rs/http-body

        #[doc(inline)]
        pub use http_body::*;
    }

    pub mod http_body_util {
        //! Re-export of the [`http-body-util`] crate.
        //!
        //! Utilities for working with [`http-body`] types.
        //!
        //! [`http-body`]: https://docs.rs/http-body
        //! [`http-body-util`]: https://docs.rs/http-body-util

        #[doc(inline)]
        pub use http_body_util::*;
    }
}
