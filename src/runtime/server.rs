//! HTTP server binding the invocation pipeline to a TCP listener.

use crate::error::InvocationError;
use crate::function::{format_response, ContextBuilder, Handler, Invoker};
use crate::http::{Event, FormattedResponse, JSON_CONTENT_TYPE};
use crate::runtime::routing::{RouteMatch, RouteTable};
use crate::runtime::ShimConfig;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Request -> event/context -> handler -> formatted response.
///
/// Holds no per-request state; every call builds its own context.
pub struct Pipeline {
    routes: RouteTable,
    contexts: ContextBuilder,
    invoker: Invoker,
}

impl Pipeline {
    /// Create a pipeline serving `handler` on the catch-all function route.
    pub fn new(handler: Arc<dyn Handler>, contexts: ContextBuilder) -> Self {
        Self {
            routes: RouteTable::function(),
            contexts,
            invoker: Invoker::new(handler),
        }
    }

    /// The route table in use.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Invoke the handler for one event and format what it returns.
    pub async fn process(&self, event: Event) -> Result<FormattedResponse, InvocationError> {
        let ctx = self.contexts.build();
        let result = self.invoker.invoke(event, &ctx).await?;
        format_response(result.as_ref())
    }
}

/// The shim's HTTP server.
pub struct ShimServer {
    /// Server configuration.
    config: ShimConfig,
    /// Shared pipeline.
    pipeline: Arc<Pipeline>,
}

impl ShimServer {
    /// Create a server for `handler`.
    pub fn new(config: ShimConfig, handler: impl Handler + 'static) -> Self {
        let contexts = ContextBuilder::new(config.hostname_var.clone());
        let pipeline = Arc::new(Pipeline::new(Arc::new(handler), contexts));
        Self { config, pipeline }
    }

    /// Create a server with configuration read from the environment.
    pub fn from_env(handler: impl Handler + 'static) -> Self {
        Self::new(ShimConfig::from_env(), handler)
    }

    /// Get the pipeline.
    pub fn pipeline(&self) -> Arc<Pipeline> {
        self.pipeline.clone()
    }

    /// Bind and serve until SIGTERM or Ctrl-C.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = self.config.bind_addr().parse()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve connections from `listener` until `shutdown` completes, then
    /// drain open connections for at most the configured shutdown timeout.
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()>,
    {
        info!("fnshim listening on {}", listener.local_addr()?);

        let graceful = GracefulShutdown::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, remote_addr) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!("Failed to accept connection: {}", e);
                            continue;
                        }
                    };
                    let io = TokioIo::new(stream);
                    let pipeline = self.pipeline.clone();

                    let service = service_fn(move |req| {
                        let pipeline = pipeline.clone();
                        async move { handle_request(req, pipeline, remote_addr).await }
                    });

                    let mut builder = http1::Builder::new();
                    builder.timer(TokioTimer::new());
                    if !self.config.read_timeout.is_zero() {
                        builder.header_read_timeout(self.config.read_timeout);
                    }
                    let conn = graceful.watch(builder.serve_connection(io, service));

                    tokio::spawn(async move {
                        if let Err(err) = conn.await {
                            error!("Error serving connection: {:?}", err);
                        }
                    });
                }
                _ = &mut shutdown => {
                    info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        drop(listener);

        tokio::select! {
            _ = graceful.shutdown() => info!("All connections closed"),
            _ = tokio::time::sleep(self.config.shutdown_timeout) => {
                warn!(
                    "Timed out after {:?} waiting for connections to close",
                    self.config.shutdown_timeout
                );
            }
        }

        Ok(())
    }
}

/// Handle an incoming HTTP request.
async fn handle_request(
    req: Request<Incoming>,
    pipeline: Arc<Pipeline>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let request_id = generate_request_id();
    let method = crate::http::Method::from(req.method());
    let path = req.uri().path().to_string();

    debug!(
        "Handling request: {} {} from {} [{}]",
        method, path, remote_addr, request_id
    );

    match pipeline.routes().find(&path, &method) {
        RouteMatch::Found(_) => {}
        RouteMatch::MethodNotAllowed => {
            return Ok(plain_response(StatusCode::METHOD_NOT_ALLOWED));
        }
        RouteMatch::NotFound => return Ok(plain_response(StatusCode::NOT_FOUND)),
    }

    let response = async {
        let event = Event::from_request(req).await?;
        let formatted = pipeline.process(event).await?;
        build_response(formatted)
    }
    .await;

    match response {
        Ok(response) => {
            debug!("{} {} -> {} [{}]", method, path, response.status(), request_id);
            Ok(response)
        }
        Err(e) => {
            error!("Invocation failed for {} {}: {} [{}]", method, path, e, request_id);
            Ok(plain_response(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

/// Write a formatted response onto the wire.
///
/// Structured bodies default to a JSON content type unless the handler set
/// one. Handler headers are appended in order, repeats included.
pub fn build_response(
    formatted: FormattedResponse,
) -> Result<Response<Full<Bytes>>, InvocationError> {
    let status = StatusCode::from_u16(formatted.status_code).map_err(|_| {
        InvocationError::InvalidResponse(format!("status code {}", formatted.status_code))
    })?;

    let mut response = Response::new(Full::new(Bytes::from(formatted.body)));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    if formatted.structured && !formatted.headers.iter().any(|(k, _)| is_content_type(k)) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    }

    for (name, value) in formatted.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| InvocationError::InvalidResponse(format!("header name {:?}", name)))?;
        let value = HeaderValue::from_str(&value)
            .map_err(|_| InvocationError::InvalidResponse(format!("header value {:?}", value)))?;
        headers.append(name, value);
    }

    Ok(response)
}

fn is_content_type(name: &str) -> bool {
    name.eq_ignore_ascii_case(CONTENT_TYPE.as_str())
}

/// A body-less response carrying only the status' canonical reason.
fn plain_response(status: StatusCode) -> Response<Full<Bytes>> {
    let reason = status.canonical_reason().unwrap_or_default();
    let mut response = Response::new(Full::new(Bytes::from(reason)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

/// Generate a unique request ID.
fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{:x}", timestamp)
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::function::{handler_fn, HandlerResult};
    use crate::http::Method;
    use tokio_test::assert_err;

    fn formatted(status_code: u16, headers: &[(&str, &str)], structured: bool) -> FormattedResponse {
        FormattedResponse {
            body: "{}".to_string(),
            status_code,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            structured,
        }
    }

    #[test]
    fn test_build_response_structured_default_content_type() {
        let response = build_response(formatted(201, &[("X-Test", "yes")], true)).unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], JSON_CONTENT_TYPE);
        assert_eq!(response.headers()["x-test"], "yes");
    }

    #[test]
    fn test_build_response_handler_content_type_wins() {
        let response =
            build_response(formatted(200, &[("content-type", "application/vnd.x+json")], true))
                .unwrap();
        let values: Vec<_> = response.headers().get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(values, vec!["application/vnd.x+json"]);
    }

    #[test]
    fn test_build_response_keeps_repeated_headers() {
        let response =
            build_response(formatted(200, &[("Set-Cookie", "a=1"), ("Set-Cookie", "b=2")], false))
                .unwrap();
        assert_eq!(response.headers().get_all("set-cookie").iter().count(), 2);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_build_response_rejects_invalid_protocol_values() {
        assert_err!(build_response(formatted(0, &[], false)));
        assert_err!(build_response(formatted(1000, &[], false)));
        assert_err!(build_response(formatted(200, &[("bad name", "x")], false)));
        assert_err!(build_response(formatted(200, &[("X-A", "line\nbreak")], false)));
    }

    #[tokio::test]
    async fn test_pipeline_process() {
        let handler = handler_fn(|event, ctx| {
            Ok(Some(
                HandlerResult::new()
                    .status(202)
                    .text(format!("{}:{}", event.path, ctx.hostname)),
            ))
        });
        let contexts = ContextBuilder::new("FNSHIM_SERVER_TEST_UNSET_HOSTNAME");
        let pipeline = Pipeline::new(Arc::new(handler), contexts);

        let response = pipeline.process(Event::new(Method::Get, "/x")).await.unwrap();
        assert_eq!(response.status_code, 202);
        assert_eq!(response.body, "/x:localhost");
    }

    #[tokio::test]
    async fn test_pipeline_propagates_handler_failure() {
        let handler = handler_fn(|_, _| Err(HandlerError::new("boom")));
        let pipeline = Pipeline::new(Arc::new(handler), ContextBuilder::default());
        let err = assert_err!(pipeline.process(Event::default()).await);
        assert!(matches!(err, InvocationError::Handler(_)));
    }

    #[test]
    fn test_request_ids_are_hex() {
        let id = generate_request_id();
        assert!(!id.is_empty());
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
