pub mod dashboard;
pub mod health;
pub mod redirect;

pub use dashboard::{DashboardService, analytics_routes};
pub use health::{HealthService, health_routes};
pub use redirect::{RedirectService, redirect_routes};
