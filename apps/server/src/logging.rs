//! Tracing setup and request logging middleware with request IDs and timing.

use std::task::{Context, Poll};
use std::time::Instant;

use axum::http::{HeaderValue, Request, Response};
use tower::{Layer, Service};
use tracing::{debug, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

use crate::config::LogFormat;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "conductor=info,tower_http=info";

/// Installs the global subscriber. Logs go to stderr so `run` output stays clean.
pub fn init_tracing(format: LogFormat) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(fmt::layer().with_writer(std::io::stderr)).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init(),
    }
}

/// A `Layer` that adds logging with request IDs and timing to requests.
#[derive(Debug, Clone, Copy)]
pub struct RequestLoggerLayer;

impl<S> Layer<S> for RequestLoggerLayer {
    type Service = RequestLoggerService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RequestLoggerService { service }
    }
}

/// A `Service` that logs request information with request IDs and timing.
///
/// The request ID is taken from `x-request-id` or generated, then set on
/// both the request (for handlers) and the response.
#[derive(Debug, Clone)]
pub struct RequestLoggerService<S> {
    service: S,
}

impl<S, B, ResBody> Service<Request<B>> for RequestLoggerService<S>
where
    S: Service<Request<B>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map_or_else(|| Uuid::new_v4().to_string(), ToString::to_string);

        let header_value = HeaderValue::from_str(&request_id).ok();
        if let Some(value) = &header_value {
            request.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
        }

        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let start_time = Instant::now();

        info!(request_id = %request_id, method = %method, path = %path, "Received request");
        if let Some(length) = request.headers().get(axum::http::header::CONTENT_LENGTH) {
            debug!(request_id = %request_id, content_length = ?length, "Request body");
        }

        let future = self.service.call(request);
        Box::pin(async move {
            let result = future.await;
            let duration_ms = start_time.elapsed().as_millis();

            match result {
                Ok(mut response) => {
                    let status = response.status();
                    if let Some(value) = header_value {
                        response.headers_mut().insert(REQUEST_ID_HEADER, value);
                    }
                    if status.is_server_error() {
                        warn!(request_id = %request_id, method = %method, path = %path, status = status.as_u16(), duration_ms, "Request failed");
                    } else {
                        info!(request_id = %request_id, method = %method, path = %path, status = status.as_u16(), duration_ms, "Request completed");
                    }
                    Ok(response)
                }
                Err(error) => {
                    warn!(request_id = %request_id, method = %method, path = %path, duration_ms, "Request errored");
                    Err(error)
                }
            }
        })
    }
}
