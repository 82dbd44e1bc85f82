use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TitleType::Table)
                    .if_not_exists()
                    .col(string(TitleType::Name).primary_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Title::Table)
                    .if_not_exists()
                    .col(string(Title::TitleId).primary_key())
                    .col(string(Title::TitleType))
                    .col(string(Title::PrimaryTitle))
                    .col(string(Title::OriginalTitle))
                    .col(boolean(Title::IsAdult))
                    .col(integer_null(Title::Premiered))
                    .col(integer_null(Title::Ended))
                    .col(integer_null(Title::RuntimeMinutes))
                    .col(string(Title::Genres))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_title_title_type")
                    .table(Title::Table)
                    .col(Title::TitleType)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Person::Table)
                    .if_not_exists()
                    .col(string(Person::PersonId).primary_key())
                    .col(string(Person::Name))
                    .col(integer_null(Person::Born))
                    .col(integer_null(Person::Died))
                    .col(string(Person::PrimaryProfessions))
                    .col(string(Person::KnownForTitles))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AkaType::Table)
                    .if_not_exists()
                    .col(string(AkaType::Name).primary_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AkaRegion::Table)
                    .if_not_exists()
                    .col(string(AkaRegion::Name).primary_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AkaLanguage::Table)
                    .if_not_exists()
                    .col(string(AkaLanguage::Name).primary_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Aka::Table)
                    .if_not_exists()
                    .col(pk_auto(Aka::Id))
                    .col(string(Aka::TitleId))
                    .col(integer(Aka::Ordering))
                    .col(string(Aka::Aka))
                    .col(string_null(Aka::Region))
                    .col(string_null(Aka::Language))
                    .col(string_null(Aka::AkaType))
                    .col(string(Aka::Attributes))
                    .col(boolean(Aka::IsOriginalTitle))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_aka_title_ordering")
                    .table(Aka::Table)
                    .col(Aka::TitleId)
                    .col(Aka::Ordering)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CrewCategory::Table)
                    .if_not_exists()
                    .col(string(CrewCategory::Name).primary_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Principal::Table)
                    .if_not_exists()
                    .col(pk_auto(Principal::Id))
                    .col(string(Principal::TitleId))
                    .col(integer(Principal::Ordering))
                    .col(string(Principal::PersonId))
                    .col(string(Principal::Category))
                    .col(string(Principal::Job))
                    .col(string(Principal::Characters))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_principal_title_ordering")
                    .table(Principal::Table)
                    .col(Principal::TitleId)
                    .col(Principal::Ordering)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Episode::Table)
                    .if_not_exists()
                    .col(pk_auto(Episode::Id))
                    .col(string(Episode::ShowTitleId))
                    .col(string(Episode::EpisodeTitleId))
                    .col(integer_null(Episode::SeasonNumber))
                    .col(integer_null(Episode::EpisodeNumber))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_episode_episode_title")
                    .table(Episode::Table)
                    .col(Episode::EpisodeTitleId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rating::Table)
                    .if_not_exists()
                    .col(string(Rating::TitleId).primary_key())
                    .col(double(Rating::Rating))
                    .col(integer(Rating::Votes))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Rating::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Episode::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Principal::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(CrewCategory::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Aka::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(AkaLanguage::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(AkaRegion::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(AkaType::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Person::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Title::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(TitleType::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum TitleType {
    Table,
    Name,
}

#[derive(DeriveIden)]
enum Title {
    Table,
    TitleId,
    TitleType,
    PrimaryTitle,
    OriginalTitle,
    IsAdult,
    Premiered,
    Ended,
    RuntimeMinutes,
    Genres,
}

#[derive(DeriveIden)]
enum Person {
    Table,
    PersonId,
    Name,
    Born,
    Died,
    PrimaryProfessions,
    KnownForTitles,
}

#[derive(DeriveIden)]
enum AkaType {
    Table,
    Name,
}

#[derive(DeriveIden)]
enum AkaRegion {
    Table,
    Name,
}

#[derive(DeriveIden)]
enum AkaLanguage {
    Table,
    Name,
}

#[derive(DeriveIden)]
enum Aka {
    Table,
    Id,
    TitleId,
    Ordering,
    Aka,
    Region,
    Language,
    AkaType,
    Attributes,
    IsOriginalTitle,
}

#[derive(DeriveIden)]
enum CrewCategory {
    Table,
    Name,
}

#[derive(DeriveIden)]
enum Principal {
    Table,
    Id,
    TitleId,
    Ordering,
    PersonId,
    Category,
    Job,
    Characters,
}

#[derive(DeriveIden)]
enum Episode {
    Table,
    Id,
    ShowTitleId,
    EpisodeTitleId,
    SeasonNumber,
    EpisodeNumber,
}

#[derive(DeriveIden)]
enum Rating {
    Table,
    TitleId,
    Rating,
    Votes,
}
