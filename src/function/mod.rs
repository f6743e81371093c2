//! The invocation side: context, handler contract and response formatting.

pub mod context;
pub mod formatter;
pub mod handler;
pub mod result;

pub use context::{Context, ContextBuilder};
pub use formatter::format_response;
pub use handler::{handler_fn, FnHandler, Handler, Invoker, Json, JsonHandler};
pub use result::{Body, HandlerResult, Headers};
