pub mod backend;
pub mod models;

pub use backend::SeaOrmStore;
pub use models::{Link, LinkKind};

use async_trait::async_trait;

use crate::errors::Result;

/// Durable link store. The backing unique index on `short_code` is the
/// only mutual exclusion on the creation path: concurrent inserts of
/// the same code are resolved by the store rejecting the second writer,
/// surfaced as `QrLinkError::DuplicateCode`.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Atomic insert. Fails with `DuplicateCode` if the short code is
    /// already taken, any other `Database*` error otherwise.
    async fn insert(&self, link: &Link) -> Result<()>;

    /// Public, unauthenticated point lookup by short code.
    async fn get_by_code(&self, code: &str) -> Result<Option<Link>>;

    /// Ownership-checked read used by dashboard queries.
    async fn get_for_owner(&self, id: &str, owner_id: &str) -> Result<Option<Link>>;

    /// External `active` toggle surface; the core itself never mutates
    /// links beyond this.
    async fn set_active(&self, code: &str, active: bool) -> Result<()>;
}
