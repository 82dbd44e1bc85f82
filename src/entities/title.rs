use sea_orm::entity::prelude::*;

/// One row of title.basics.tsv.gz. The unit everything else hangs off.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "title")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub title_id: String,
    pub title_type: String,
    pub primary_title: String,
    pub original_title: String,
    pub is_adult: bool,
    pub premiered: Option<i32>,
    pub ended: Option<i32>,
    pub runtime_minutes: Option<i32>,
    pub genres: String,
}

impl Model {
    pub fn imdb_url(&self) -> String {
        format!("https://www.imdb.com/title/{}/", self.title_id)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
