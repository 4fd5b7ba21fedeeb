//! Owner analytics endpoints
//!
//! Per-link routes verify ownership before touching the event log, so
//! one owner can never read another's scan data even with a guessed
//! link id. Dashboard routes aggregate over everything the owner has.

use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, web};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

use crate::analytics::Aggregator;
use crate::api::ErrorBody;
use crate::api::middleware::OwnerId;
use crate::errors::QrLinkError;
use crate::storages::LinkStore;
use crate::utils::DateRange;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    /// Caps the number of time-series points returned
    pub limit: Option<usize>,
}

pub struct DashboardService {}

impl DashboardService {
    /// GET /api/analytics/{link_id}/summary
    pub async fn link_summary(
        req: HttpRequest,
        path: web::Path<String>,
        query: web::Query<RangeQuery>,
        aggregator: web::Data<Arc<Aggregator>>,
        links: web::Data<Arc<dyn LinkStore>>,
    ) -> impl Responder {
        let link_id = path.into_inner();
        let Some(owner) = owner_id(&req) else {
            return unauthorized();
        };

        let range = match DateRange::parse_query(query.from.as_deref(), query.to.as_deref()) {
            Ok(range) => range,
            Err(e) => return bad_request(e),
        };

        match verify_ownership(&links, &link_id, &owner).await {
            Ok(()) => {}
            Err(response) => return response,
        }

        match aggregator.summary(&owner, Some(&link_id), range).await {
            Ok(summary) => HttpResponse::Ok().json(summary),
            Err(e) => internal_error("link summary", &e),
        }
    }

    /// GET /api/analytics/{link_id}/timeseries
    pub async fn link_timeseries(
        req: HttpRequest,
        path: web::Path<String>,
        query: web::Query<RangeQuery>,
        aggregator: web::Data<Arc<Aggregator>>,
        links: web::Data<Arc<dyn LinkStore>>,
    ) -> impl Responder {
        let link_id = path.into_inner();
        let Some(owner) = owner_id(&req) else {
            return unauthorized();
        };

        let range = match DateRange::parse_query(query.from.as_deref(), query.to.as_deref()) {
            Ok(range) => range,
            Err(e) => return bad_request(e),
        };

        match verify_ownership(&links, &link_id, &owner).await {
            Ok(()) => {}
            Err(response) => return response,
        }

        match aggregator.time_series(&owner, Some(&link_id), range).await {
            Ok(mut points) => {
                if let Some(limit) = query.limit {
                    points.truncate(limit);
                }
                HttpResponse::Ok().json(points)
            }
            Err(e) => internal_error("link time series", &e),
        }
    }

    /// GET /api/analytics/dashboard
    ///
    /// All-time rollup across every link the owner has, for the landing
    /// dashboard. Explicit bounds narrow it.
    pub async fn dashboard_summary(
        req: HttpRequest,
        query: web::Query<RangeQuery>,
        aggregator: web::Data<Arc<Aggregator>>,
    ) -> impl Responder {
        let Some(owner) = owner_id(&req) else {
            return unauthorized();
        };

        let range = match dashboard_range(&query) {
            Ok(range) => range,
            Err(e) => return bad_request(e),
        };

        match aggregator.summary(&owner, None, range).await {
            Ok(summary) => HttpResponse::Ok().json(summary),
            Err(e) => internal_error("dashboard summary", &e),
        }
    }

    /// GET /api/analytics/dashboard/timeseries
    pub async fn dashboard_timeseries(
        req: HttpRequest,
        query: web::Query<RangeQuery>,
        aggregator: web::Data<Arc<Aggregator>>,
    ) -> impl Responder {
        let Some(owner) = owner_id(&req) else {
            return unauthorized();
        };

        let range = match DateRange::parse_query(query.from.as_deref(), query.to.as_deref()) {
            Ok(range) => range,
            Err(e) => return bad_request(e),
        };

        match aggregator.time_series(&owner, None, range).await {
            Ok(mut points) => {
                if let Some(limit) = query.limit {
                    points.truncate(limit);
                }
                HttpResponse::Ok().json(points)
            }
            Err(e) => internal_error("dashboard time series", &e),
        }
    }
}

fn owner_id(req: &HttpRequest) -> Option<String> {
    req.extensions().get::<OwnerId>().map(|o| o.0.clone())
}

fn dashboard_range(query: &RangeQuery) -> crate::errors::Result<DateRange> {
    if query.from.is_none() && query.to.is_none() {
        return Ok(DateRange::all_time());
    }
    DateRange::parse_query(query.from.as_deref(), query.to.as_deref())
}

/// 404 for links that don't exist or belong to someone else; the two
/// cases are indistinguishable in the response.
async fn verify_ownership(
    links: &Arc<dyn LinkStore>,
    link_id: &str,
    owner: &str,
) -> Result<(), HttpResponse> {
    match links.get_for_owner(link_id, owner).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(HttpResponse::NotFound().json(ErrorBody::new("Link not found"))),
        Err(e) => Err(internal_error("ownership lookup", &e)),
    }
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorBody::new("Missing owner identity"))
}

fn bad_request(e: QrLinkError) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorBody::new(e.to_string()))
}

fn internal_error(context: &str, e: &QrLinkError) -> HttpResponse {
    error!("Analytics {} failed: {}", context, e);
    HttpResponse::InternalServerError().json(ErrorBody::new("Internal server error"))
}

/// Analytics route tree. Dashboard routes are registered before the
/// `{link_id}` routes so "dashboard" never matches as a link id.
pub fn analytics_routes() -> actix_web::Scope {
    web::scope("/api/analytics")
        .route(
            "/dashboard",
            web::get().to(DashboardService::dashboard_summary),
        )
        .route(
            "/dashboard/timeseries",
            web::get().to(DashboardService::dashboard_timeseries),
        )
        .route(
            "/{link_id}/summary",
            web::get().to(DashboardService::link_summary),
        )
        .route(
            "/{link_id}/timeseries",
            web::get().to(DashboardService::link_timeseries),
        )
}
