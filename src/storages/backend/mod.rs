//! SeaORM storage backend
//!
//! One backend serves both tables: links on the management/resolve
//! path, scan_events on the telemetry path. Supports SQLite,
//! MySQL/MariaDB, and PostgreSQL behind the same entity layer.

mod connection;
mod events;
mod links;

use sea_orm::{DatabaseConnection, DbBackend};
use sea_orm::sea_query::Expr;
use tracing::warn;

use crate::config::DatabaseConfig;
use crate::errors::{QrLinkError, Result};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use links::{link_to_active_model, model_to_link};

/// Infer the database flavor from the URL scheme.
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(QrLinkError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported schemes: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
    backend_name: String,
}

impl SeaOrmStore {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(QrLinkError::database_config(
                "Database URL is not set".to_string(),
            ));
        }

        let backend_name = infer_backend_from_url(&config.url)?;

        let db = if backend_name == "sqlite" {
            connect_sqlite(&config.url).await?
        } else {
            connect_generic(&config.url, &backend_name, config.pool_size).await?
        };

        let store = SeaOrmStore { db, backend_name };

        run_migrations(&store.db).await?;

        warn!("{} storage initialized", store.backend_name.to_uppercase());
        Ok(store)
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Day-bucket expression over `occurred_at`, yielding `YYYY-MM-DD`
    /// strings on every supported backend.
    fn day_bucket_expr(&self) -> Expr {
        match self.db.get_database_backend() {
            DbBackend::Sqlite => Expr::cust("strftime('%Y-%m-%d', occurred_at)"),
            DbBackend::MySql => Expr::cust("DATE_FORMAT(occurred_at, '%Y-%m-%d')"),
            _ => Expr::cust("TO_CHAR(occurred_at, 'YYYY-MM-DD')"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_backend_from_url_scheme() {
        assert_eq!(
            infer_backend_from_url("sqlite://data.db?mode=rwc").unwrap(),
            "sqlite"
        );
        assert_eq!(
            infer_backend_from_url("mysql://user:pw@localhost/qr").unwrap(),
            "mysql"
        );
        assert_eq!(
            infer_backend_from_url("postgres://user:pw@localhost/qr").unwrap(),
            "postgres"
        );
        assert!(infer_backend_from_url("mongodb://localhost").is_err());
    }
}
