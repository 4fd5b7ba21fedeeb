use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use qrlink::analytics::{Aggregator, ScanEventStore};
use qrlink::api::middleware::{RateLimit, VerifiedOwner};
use qrlink::api::services::{analytics_routes, health_routes, redirect_routes};
use qrlink::config::AppConfig;
use qrlink::ratelimit::{CounterStore, FixedWindowLimiter, MemoryCounterStore, RedisCounterStore};
use qrlink::services::{Resolver, ScanRecorder, WorkerPoolRecorder};
use qrlink::storages::{LinkStore, SeaOrmStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration");

    let store = Arc::new(
        SeaOrmStore::new(&config.database)
            .await
            .expect("Failed to initialize storage"),
    );
    let link_store: Arc<dyn LinkStore> = store.clone();
    let event_store: Arc<dyn ScanEventStore> = store.clone();

    let recorder = Arc::new(WorkerPoolRecorder::new(
        event_store.clone(),
        &config.recorder,
    ));
    let resolver = Arc::new(Resolver::new(
        link_store.clone(),
        recorder.clone() as Arc<dyn ScanRecorder>,
    ));
    let aggregator = Arc::new(Aggregator::new(event_store));

    let counter_store: Box<dyn CounterStore> = match &config.redis.url {
        Some(url) => {
            info!("Rate limit counters backed by Redis");
            Box::new(
                RedisCounterStore::new(url, &config.redis.key_prefix)
                    .expect("Failed to create Redis client"),
            )
        }
        None => {
            info!("Rate limit counters in process memory");
            Box::new(MemoryCounterStore::new())
        }
    };
    let limiter = Arc::new(FixedWindowLimiter::new(counter_store, &config.rate_limit));

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server at http://{}", bind_address);

    HttpServer::new({
        let store = store.clone();
        let resolver = resolver.clone();
        let aggregator = aggregator.clone();
        let link_store = link_store.clone();
        let limiter = limiter.clone();
        move || {
            App::new()
                .app_data(web::Data::new(store.clone()))
                .app_data(web::Data::new(resolver.clone()))
                .app_data(web::Data::new(aggregator.clone()))
                .app_data(web::Data::new(link_store.clone()))
                .service(redirect_routes().wrap(RateLimit::new(limiter.clone())))
                .service(analytics_routes().wrap(VerifiedOwner))
                .service(health_routes())
        }
    })
    .bind(bind_address)?
    .run()
    .await?;

    // Drain queued scan events before exiting
    if !recorder.wait_idle(Duration::from_secs(5)).await {
        warn!(
            "Shutdown with {} scan events dropped during this run",
            recorder.dropped_count()
        );
    }

    Ok(())
}
