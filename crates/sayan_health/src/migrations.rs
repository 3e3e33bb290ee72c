//! Schema migrations, applied from a directory of `<version>_<name>.sql` files.

use std::path::Path;

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use crate::SayanError;

/// Resolve the migrations in `dir` without touching the database.
pub async fn load(dir: &Path) -> Result<Migrator, SayanError> {
    Ok(Migrator::new(dir).await?)
}

/// Apply every pending migration in `dir`. Returns the number of migrations known.
pub async fn run(pool: &PgPool, dir: &Path) -> Result<usize, SayanError> {
    let migrator = load(dir).await?;
    let known = migrator.iter().count();
    info!(dir = %dir.display(), known, "applying migrations");
    migrator.run(pool).await?;
    info!(known, "migrations up to date");
    Ok(known)
}
