//! # fnshim - HTTP-to-function invocation adapter
//!
//! fnshim exposes a single user function as an HTTP service. Every request
//! is normalized into an [`Event`] plus a [`Context`], handed to the
//! function once, and whatever the function returns is shaped back into a
//! `(body, status, headers)` triple and written to the client.
//!
//! ## Architecture
//!
//! ```text
//!  HTTP request
//!       │
//!       ▼
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Event +      │──▶│   Invoker    │──▶│  Response    │──▶│ ShimServer   │
//! │ Context      │   │ (handler x1) │   │  Formatter   │   │ (hyper)      │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fnshim::prelude::*;
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Handler for Hello {
//!     async fn handle(
//!         &self,
//!         event: Event,
//!         ctx: &Context,
//!     ) -> Result<Option<HandlerResult>, HandlerError> {
//!         Ok(Some(
//!             HandlerResult::new()
//!                 .status(200)
//!                 .text(format!("{} {} served by {}", event.method, event.path, ctx.hostname))
//!                 .header("X-Served-By", ctx.hostname.clone()),
//!         ))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     ShimServer::from_env(Hello).run().await
//! }
//! ```
//!
//! ## Response shaping
//!
//! - No result: empty body, `200`, no headers.
//! - `status_code` missing: `200`. Present: used verbatim.
//! - Body: empty, a JSON object (sent as `application/json`), or text.
//! - Headers: a mapping (flattened in insertion order) or a list of pairs
//!   (passed through as-is).
//!
//! Handler failures are never recovered; the client sees a bare `500`.

pub mod error;
pub mod function;
pub mod http;
pub mod runtime;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::error::{HandlerError, InvocationError};
    pub use crate::function::{
        format_response, handler_fn, Body, Context, ContextBuilder, Handler, HandlerResult,
        Headers, Json, JsonHandler,
    };
    pub use crate::http::{Event, FormattedResponse, Method, Query};
    pub use crate::runtime::{ShimConfig, ShimServer};
    pub use async_trait::async_trait;
}

pub use error::{HandlerError, InvocationError};
pub use function::{Context, Handler, HandlerResult};
pub use http::{Event, FormattedResponse};
pub use runtime::{ShimConfig, ShimServer};
