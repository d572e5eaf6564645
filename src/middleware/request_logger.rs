//! Request logging middleware.
//!
//! One line per finished request with method, path, status and duration.
//! Only a short prefix of the API key is ever logged.

use std::future::{Ready, ready};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, error, info, warn};

use crate::config::API_KEY_HEADER;

/// Characters of the API key kept in logs.
const KEY_PREFIX_LEN: usize = 4;

/// Request logger middleware factory.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

pub struct RequestLoggerMiddleware<S> {
    service: S,
}

/// `abcd…` for a present key, `none` otherwise.
fn key_hint(value: Option<&str>) -> String {
    match value {
        Some(k) if !k.is_empty() => {
            let prefix: String = k.chars().take(KEY_PREFIX_LEN).collect();
            format!("{}…", prefix)
        }
        _ => "none".to_string(),
    }
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let api_key = key_hint(
            req.headers()
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok()),
        );

        debug!(target: "api", %method, %path, %api_key, "request started");

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            let status = res.status().as_u16();
            let duration_ms = start.elapsed().as_millis() as u64;

            if res.status().is_server_error() {
                error!(target: "api", %method, %path, status, duration_ms, %api_key, "request failed");
            } else if res.status().is_client_error() {
                warn!(target: "api", %method, %path, status, duration_ms, %api_key, "request rejected");
            } else {
                info!(target: "api", %method, %path, status, duration_ms, "request completed");
            }

            Ok(res)
        })
    }
}
