use sea_orm::entity::prelude::*;

/// One row of title.principals.tsv.gz: a person credited on a title.
/// Some categories of work carry a free-text job and/or characters played.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "principal")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title_id: String,
    pub ordering: i32,
    pub person_id: String,
    pub category: String,
    pub job: String,
    pub characters: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
