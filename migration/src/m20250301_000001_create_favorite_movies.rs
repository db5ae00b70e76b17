use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FavoriteMovies::Table)
                    .if_not_exists()
                    .col(pk_auto(FavoriteMovies::Id))
                    .col(string_len_uniq(FavoriteMovies::ImdbId, 20))
                    .col(string_len(FavoriteMovies::Title, 255))
                    .col(string_len(FavoriteMovies::Year, 10))
                    .col(string_len(FavoriteMovies::Type, 20))
                    .col(text(FavoriteMovies::Poster))
                    .col(big_integer(FavoriteMovies::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_favorite_movies_created_at")
                    .table(FavoriteMovies::Table)
                    .col(FavoriteMovies::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(FavoriteMovies::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum FavoriteMovies {
    Table,
    Id,
    ImdbId,
    Title,
    Year,
    Type,
    Poster,
    CreatedAt,
}
