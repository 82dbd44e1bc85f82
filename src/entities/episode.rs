use sea_orm::entity::prelude::*;

/// One row of title.episode.tsv.gz. Not every show has season or episode
/// numbers.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "episode")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub show_title_id: String,
    pub episode_title_id: String,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
