//! tilesplit Shim
//!
//! Interception decorators over the two request-sending transports:
//! - [`FetchInterceptor`]: promise-style, split requests fire concurrently
//! - [`XhrInterceptor`]: open/send-style, split requests fire in order
//!
//! Both delegate untouched to the native transport for any call that is not
//! an eligible write, and for any eligible call whose processing fails.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tilesplit_core::{InterceptConfig, RequestBodyProcessor};
//! use tilesplit_shim::{install_fetch, FetchTransport, RequestInit};
//!
//! let processor = Arc::new(RequestBodyProcessor::new(InterceptConfig::new(), console)?);
//! let fetch = install_fetch(native_fetch, processor);
//!
//! let response = fetch
//!     .fetch(url, Some(RequestInit::new().with_method("POST").with_body(body)))
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod fetch;
mod plan;
mod transport;
mod xhr;

pub use fetch::{install_fetch, FetchInterceptor};
pub use plan::DispatchPlan;
pub use transport::{
    FetchTransport, RequestBody, RequestInit, TransportError, XhrRequest, XhrTransport,
};
pub use xhr::{install_xhr, InterceptedXhr, RequestContext, XhrInterceptor};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
