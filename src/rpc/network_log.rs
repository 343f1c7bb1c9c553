use std::time::Instant;

use http::Extensions;
use log::{debug, warn};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};

/// Log target for request/response lines written when network logging is on.
pub const NETWORK_LOG_TARGET: &str = "antelope_rpc::network";

/// Middleware that logs every request and the outcome of its exchange.
pub(crate) struct NetworkLogMiddleware;

#[async_trait::async_trait]
impl Middleware for NetworkLogMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let method = req.method().to_string();
        let url = req.url().to_string();
        let bytes = req.body().and_then(|b| b.as_bytes()).map_or(0, <[u8]>::len) as u64;
        debug!(
            target: NETWORK_LOG_TARGET,
            method = method.as_str(),
            url = url.as_str(),
            bytes = bytes;
            "--> request"
        );

        let start = Instant::now();
        let result = next.run(req, extensions).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => debug!(
                target: NETWORK_LOG_TARGET,
                url = url.as_str(),
                status = response.status().as_u16(),
                elapsed_ms = elapsed_ms;
                "<-- response"
            ),
            Err(e) => warn!(
                target: NETWORK_LOG_TARGET,
                url = url.as_str(),
                elapsed_ms = elapsed_ms,
                error:% = e;
                "<-- failed"
            ),
        }

        result
    }
}
