use sea_orm::entity::prelude::*;

/// One row of name.basics.tsv.gz. Not everyone has a name, and far from
/// everyone has birth/death years.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "person")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub person_id: String,
    pub name: String,
    pub born: Option<i32>,
    pub died: Option<i32>,
    pub primary_professions: String,
    pub known_for_titles: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
