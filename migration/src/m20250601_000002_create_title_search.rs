use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// FTS5 virtual tables have no sea-query DDL model, so this one is raw SQL.
// Only `title` is tokenized; the remaining columns ride along for filtering
// and ranking at query time.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE VIRTUAL TABLE IF NOT EXISTS title_search USING fts5(
                    title,
                    search_id UNINDEXED,
                    title_id UNINDEXED,
                    premiered UNINDEXED,
                    ended UNINDEXED,
                    rating UNINDEXED,
                    votes UNINDEXED
                )",
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.get_connection().execute_unprepared("DROP TABLE IF EXISTS title_search").await?;
        Ok(())
    }
}
