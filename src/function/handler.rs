//! Handler traits and the invoker that calls them.

use crate::error::{HandlerError, InvocationError};
use crate::function::context::Context;
use crate::function::result::HandlerResult;
use crate::http::Event;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// A user function exposed over HTTP.
///
/// `handle` is called once per request with a freshly built event and
/// context. Returning `Ok(None)` produces an empty `200` response.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(
        &self,
        event: Event,
        ctx: &Context,
    ) -> Result<Option<HandlerResult>, HandlerError>;
}

/// A handler that replies with a loose JSON value instead of a
/// [`HandlerResult`]. Wrap it in [`Json`] to serve it.
///
/// The value must be `null` or an object with optional `statusCode`,
/// `body` and `headers` keys.
#[async_trait]
pub trait JsonHandler: Send + Sync {
    async fn handle(&self, event: Event, ctx: &Context) -> Result<Value, HandlerError>;
}

/// Adapts a [`JsonHandler`] to [`Handler`].
pub struct Json<H>(pub H);

#[async_trait]
impl<H: JsonHandler> Handler for Json<H> {
    async fn handle(
        &self,
        event: Event,
        ctx: &Context,
    ) -> Result<Option<HandlerResult>, HandlerError> {
        let value = self.0.handle(event, ctx).await?;
        Ok(HandlerResult::from_value(value)?)
    }
}

/// A plain synchronous function used as a handler.
pub struct FnHandler<F>(F);

/// Wrap a closure as a [`Handler`].
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(Event, &Context) -> Result<Option<HandlerResult>, HandlerError> + Send + Sync,
{
    FnHandler(f)
}

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: Fn(Event, &Context) -> Result<Option<HandlerResult>, HandlerError> + Send + Sync,
{
    async fn handle(
        &self,
        event: Event,
        ctx: &Context,
    ) -> Result<Option<HandlerResult>, HandlerError> {
        (self.0)(event, ctx)
    }
}

/// Calls the handler exactly once per request.
///
/// No retry, timeout or concurrency limit: a slow handler holds its
/// connection task for as long as it runs.
#[derive(Clone)]
pub struct Invoker {
    handler: Arc<dyn Handler>,
}

impl Invoker {
    /// Create an invoker for `handler`.
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self { handler }
    }

    /// Run the handler with the given event and context.
    pub async fn invoke(
        &self,
        event: Event,
        ctx: &Context,
    ) -> Result<Option<HandlerResult>, InvocationError> {
        debug!(method = %event.method, path = %event.path, "invoking handler");
        let result = self.handler.handle(event, ctx).await?;
        debug!(absent = result.is_none(), "handler returned");
        Ok(result)
    }
}

impl std::fmt::Debug for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_err, assert_ok};

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Handler for CountingHandler {
        async fn handle(
            &self,
            event: Event,
            ctx: &Context,
        ) -> Result<Option<HandlerResult>, HandlerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(
                HandlerResult::new().text(format!("{} {} {}", event.method, event.path, ctx.hostname)),
            ))
        }
    }

    struct EchoJson;

    #[async_trait]
    impl JsonHandler for EchoJson {
        async fn handle(&self, event: Event, _ctx: &Context) -> Result<Value, HandlerError> {
            Ok(event.json()?)
        }
    }

    #[tokio::test]
    async fn test_invoker_calls_once_with_inputs() {
        let calls = Arc::new(AtomicUsize::new(0));
        let invoker = Invoker::new(Arc::new(CountingHandler {
            calls: calls.clone(),
        }));

        let result = invoker
            .invoke(Event::new(Method::Delete, "/a/b"), &Context::new("box-1"))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result, Some(HandlerResult::new().text("DELETE /a/b box-1")));
    }

    #[tokio::test]
    async fn test_invoker_propagates_failure() {
        let invoker = Invoker::new(Arc::new(handler_fn(|_, _| Err(HandlerError::new("nope")))));
        let err = assert_err!(invoker.invoke(Event::default(), &Context::default()).await);
        assert!(matches!(err, InvocationError::Handler(_)));
    }

    #[tokio::test]
    async fn test_invoker_reports_malformed_json_result() {
        let invoker = Invoker::new(Arc::new(Json(EchoJson)));
        let event = Event::new(Method::Post, "/").body(r#"{"statusCode": "201"}"#);
        let err = assert_err!(invoker.invoke(event, &Context::default()).await);
        assert!(matches!(err, InvocationError::MalformedResult(_)));
    }

    #[tokio::test]
    async fn test_fn_handler_absent_result() {
        let invoker = Invoker::new(Arc::new(handler_fn(|_, _| Ok(None))));
        let result = assert_ok!(invoker.invoke(Event::default(), &Context::default()).await);
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_json_handler() {
        let handler = Json(EchoJson);
        let event = Event::new(Method::Post, "/").body(r#"{"statusCode": 202, "body": "queued"}"#);
        let result = handler.handle(event, &Context::default()).await.unwrap().unwrap();
        assert_eq!(result.status_code, Some(202));

        let event = Event::new(Method::Post, "/").body(r#"{"headers": 5}"#);
        let err = assert_err!(handler.handle(event, &Context::default()).await);
        assert!(matches!(err, HandlerError::MalformedResult(_)));

        let event = Event::new(Method::Post, "/").body("null");
        assert_eq!(assert_ok!(handler.handle(event, &Context::default()).await), None);
    }
}
