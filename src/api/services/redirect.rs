//! Public redirect endpoint

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use std::sync::Arc;
use tracing::{debug, error, trace};

use crate::api::ErrorBody;
use crate::errors::QrLinkError;
use crate::services::Resolver;
use crate::utils::ip::extract_client_ip;
use crate::utils::is_valid_short_code;

pub struct RedirectService {}

impl RedirectService {
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        resolver: web::Data<Arc<Resolver>>,
    ) -> impl Responder {
        let code = path.into_inner();

        if !is_valid_short_code(&code) {
            // Malformed codes never hit the database
            trace!("Invalid short code rejected: {}", &code);
            return Self::not_found_response();
        }

        let client_ip = extract_client_ip(&req);
        let user_agent = req
            .headers()
            .get("user-agent")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("");
        let referrer = req.headers().get("referer").and_then(|h| h.to_str().ok());

        match resolver
            .resolve(&code, &client_ip, user_agent, referrer)
            .await
        {
            Ok(destination) => HttpResponse::build(StatusCode::FOUND)
                .insert_header(("Location", destination))
                .finish(),
            Err(QrLinkError::NotFound(_)) => {
                debug!("Redirect target not found: {}", &code);
                Self::not_found_response()
            }
            Err(e) => {
                error!("Redirect lookup failed for {}: {}", &code, e);
                Self::error_response()
            }
        }
    }

    #[inline]
    fn not_found_response() -> HttpResponse {
        HttpResponse::build(StatusCode::NOT_FOUND)
            .insert_header(("Content-Type", "application/json; charset=utf-8"))
            .insert_header(("Cache-Control", "public, max-age=60"))
            .json(ErrorBody::new("Short link not found"))
    }

    #[inline]
    fn error_response() -> HttpResponse {
        HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
            .insert_header(("Content-Type", "application/json; charset=utf-8"))
            .json(ErrorBody::new("Internal server error"))
    }
}

pub fn redirect_routes() -> actix_web::Scope {
    web::scope("/r")
        .route("/{code}", web::get().to(RedirectService::handle_redirect))
        .route("/{code}", web::head().to(RedirectService::handle_redirect))
}
