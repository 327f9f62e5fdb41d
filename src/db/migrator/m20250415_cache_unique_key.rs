use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        // Keep the newest row per key before the unique index lands.
        conn.execute_unprepared(
            "DELETE FROM vendor_cache WHERE rowid NOT IN (
                SELECT MAX(rowid) FROM vendor_cache
                GROUP BY category, city, state, subcategory_key
            )",
        )
        .await?;

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_vendor_cache_key")
            .await?;

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_vendor_cache_key_unique
             ON vendor_cache(category, city, state, subcategory_key)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_vendor_cache_key_unique")
            .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_vendor_cache_key
             ON vendor_cache(category, city, state, subcategory_key)",
        )
        .await?;

        Ok(())
    }
}
