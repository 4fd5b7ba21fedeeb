//! Health endpoints for probes

use actix_web::{HttpResponse, Responder, web};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, trace};

use crate::storages::SeaOrmStore;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
    response_time_ms: u32,
}

pub struct HealthService;

impl HealthService {
    pub async fn health_check(store: web::Data<Arc<SeaOrmStore>>) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let db = store.get_db();
        let db_ok = match tokio::time::timeout(
            Duration::from_secs(5),
            db.execute_unprepared("SELECT 1"),
        )
        .await
        {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                error!("Database health check failed: {}", e);
                false
            }
            Err(_) => {
                error!("Database health check timeout");
                false
            }
        };

        let body = HealthResponse {
            status: if db_ok { "healthy" } else { "unhealthy" }.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            response_time_ms: start_time.elapsed().as_millis() as u32,
        };

        if db_ok {
            HttpResponse::Ok().json(body)
        } else {
            HttpResponse::ServiceUnavailable().json(body)
        }
    }

    pub async fn liveness_check() -> impl Responder {
        HttpResponse::NoContent().finish()
    }
}

pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/live", web::get().to(HealthService::liveness_check))
}
