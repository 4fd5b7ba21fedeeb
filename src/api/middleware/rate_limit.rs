//! Per-client rate limiting for the redirect surface
//!
//! One fixed window per route pattern and client IP. Allowed responses
//! carry the remaining quota in headers; throttled requests get a 429
//! without touching the handler.

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{CONTENT_TYPE, HeaderName, HeaderValue},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::debug;

use crate::api::ErrorBody;
use crate::ratelimit::{FixedWindowLimiter, RateDecision};
use crate::utils::ip::extract_forwarded_ip;

const LIMIT_HEADER: &str = "X-RateLimit-Limit";
const REMAINING_HEADER: &str = "X-RateLimit-Remaining";

#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<FixedWindowLimiter>,
}

impl RateLimit {
    pub fn new(limiter: Arc<FixedWindowLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limiter: Arc::clone(&self.limiter),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limiter: Arc<FixedWindowLimiter>,
}

impl<S, B> RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    fn handle_throttled(
        req: ServiceRequest,
        decision: RateDecision,
    ) -> ServiceResponse<EitherBody<B>> {
        debug!("Rate limit exceeded for {}", req.path());
        req.into_response(
            HttpResponse::TooManyRequests()
                .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
                .insert_header((LIMIT_HEADER, decision.limit.to_string()))
                .insert_header((REMAINING_HEADER, "0"))
                .json(ErrorBody::new("Rate limit exceeded"))
                .map_into_right_body(),
        )
    }

    /// Route pattern (not the concrete path) keys the counter, so all
    /// codes share one bucket per client.
    fn route_key(req: &ServiceRequest) -> String {
        req.match_pattern()
            .unwrap_or_else(|| req.path().to_string())
    }

    fn client_key(req: &ServiceRequest) -> String {
        extract_forwarded_ip(req.headers())
            .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let limiter = Arc::clone(&self.limiter);

        Box::pin(async move {
            let route_key = Self::route_key(&req);
            let client_key = Self::client_key(&req);

            let decision = limiter.check(&route_key, &client_key).await;
            if !decision.allowed {
                return Ok(Self::handle_throttled(req, decision));
            }

            let mut response = srv.call(req).await?.map_into_left_body();
            let headers = response.headers_mut();
            if let Ok(value) = HeaderValue::from_str(&decision.limit.to_string()) {
                headers.insert(HeaderName::from_static("x-ratelimit-limit"), value);
            }
            if let Ok(value) = HeaderValue::from_str(&decision.remaining.to_string()) {
                headers.insert(HeaderName::from_static("x-ratelimit-remaining"), value);
            }
            Ok(response)
        })
    }
}
