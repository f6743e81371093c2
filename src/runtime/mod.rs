//! The HTTP runtime hosting the handler.

mod config;
pub mod routing;
mod server;

pub use config::{parse_timeout, ShimConfig, DEFAULT_TIMEOUT};
pub use routing::{Route, RouteMatch, RouteMethod, RouteTable};
pub use server::{build_response, Pipeline, ShimServer};
