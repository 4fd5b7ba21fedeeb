pub mod auth;
pub mod rate_limit;

pub use auth::{OwnerId, VerifiedOwner};
pub use rate_limit::RateLimit;
