//! Database migration support.
//!
//! Embeds and runs SQL migrations from `jet_core/migrations/`. Migrations are
//! additive, so running them on every boot is safe.

use sqlx::PgPool;

/// Run all embedded database migrations against the given pool.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
