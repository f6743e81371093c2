//! HTTP-side types: the inbound event and the outbound response triple.

mod request;
mod response;

pub use request::{Event, Method, Query};
pub use response::{FormattedResponse, JSON_CONTENT_TYPE};
