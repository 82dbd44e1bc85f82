use sea_orm::entity::prelude::*;

/// One row of title.akas.tsv.gz: an original or alternative title.
/// (title_id, ordering) is unique within a dataset drop.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "aka")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title_id: String,
    pub ordering: i32,
    pub aka: String,
    pub region: Option<String>,
    pub language: Option<String>,
    pub aka_type: Option<String>,
    pub attributes: String,
    pub is_original_title: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
