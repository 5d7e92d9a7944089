use sqlx::{PgPool, migrate::Migrator};

use crate::cache::CacheService;

/// Command stats and guild restriction tables, embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Postgres pool plus the cache guild restrictions are read through.
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
    cache: CacheService,
}

impl Database {
    pub fn with_cache(pool: PgPool, cache: CacheService) -> Self {
        Self { pool, cache }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn cache(&self) -> &CacheService {
        &self.cache
    }
}
