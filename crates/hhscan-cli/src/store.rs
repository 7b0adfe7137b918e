use hhscan_core::PlaceRow;
use hhscan_search::PlaceStore;
use sqlx::PgPool;

/// [`PlaceStore`] backed by the `places` table.
pub(crate) struct PgPlaceStore {
    pool: PgPool,
}

impl PgPlaceStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl PlaceStore for PgPlaceStore {
    type Error = sqlx::Error;

    async fn upsert_places(&self, rows: &[PlaceRow]) -> Result<u64, sqlx::Error> {
        let (new, updated) = hhscan_db::upsert_places(&self.pool, rows).await?;
        tracing::debug!(new, updated, "upserted place batch");
        Ok(new + updated)
    }
}
