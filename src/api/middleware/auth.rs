//! Owner identity middleware
//!
//! Trusts the `X-Owner-Id` header placed by the authenticating edge
//! proxy. Requests without it never reach the analytics handlers;
//! handlers downstream can rely on [`OwnerId`] being in the request
//! extensions.

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::CONTENT_TYPE,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::debug;

use crate::api::ErrorBody;

const OWNER_HEADER: &str = "X-Owner-Id";

/// Verified caller identity, inserted into request extensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnerId(pub String);

#[derive(Clone)]
pub struct VerifiedOwner;

impl<S, B> Transform<S, ServiceRequest> for VerifiedOwner
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = VerifiedOwnerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(VerifiedOwnerMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct VerifiedOwnerMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> VerifiedOwnerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    fn handle_unauthorized(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
        debug!("Analytics request rejected: missing owner identity");
        req.into_response(
            HttpResponse::Unauthorized()
                .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
                .json(ErrorBody::new("Missing owner identity"))
                .map_into_right_body(),
        )
    }

    fn extract_owner(req: &ServiceRequest) -> Option<String> {
        req.headers()
            .get(OWNER_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    }
}

impl<S, B> Service<ServiceRequest> for VerifiedOwnerMiddleware<S>
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

        Box::pin(async move {
            let Some(owner) = Self::extract_owner(&req) else {
                return Ok(Self::handle_unauthorized(req));
            };

            req.extensions_mut().insert(OwnerId(owner));
            let response = srv.call(req).await?.map_into_left_body();
            Ok(response)
        })
    }
}
