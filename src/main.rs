//! fnshim - example server
//!
//! Serves a JSON echo function: the reply describes the request it saw.

use fnshim::prelude::*;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

/// Echoes the request back as a structured body.
struct EchoFunction;

#[async_trait]
impl JsonHandler for EchoFunction {
    async fn handle(&self, event: Event, ctx: &Context) -> Result<Value, HandlerError> {
        let query: serde_json::Map<String, Value> = event
            .query
            .pairs()
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        Ok(json!({
            "statusCode": 200,
            "body": {
                "method": event.method.to_string(),
                "path": event.path,
                "query": query,
                "body": event.text(),
                "hostname": ctx.hostname,
            },
            "headers": {
                "X-Served-By": ctx.hostname,
            }
        }))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ShimConfig::from_env();
    tracing::info!("Starting fnshim on {}", config.bind_addr());
    tracing::info!("Try: curl -X POST -d 'test' 'http://localhost:{}/foo?x=1'", config.port);

    ShimServer::new(config, Json(EchoFunction)).run().await
}
