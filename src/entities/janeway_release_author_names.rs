use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "janeway_release_author_names")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub release_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub name_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::janeway_releases::Entity",
        from = "Column::ReleaseId",
        to = "super::janeway_releases::Column::Id",
        on_delete = "Cascade"
    )]
    Releases,
    #[sea_orm(
        belongs_to = "super::janeway_names::Entity",
        from = "Column::NameId",
        to = "super::janeway_names::Column::Id",
        on_delete = "Cascade"
    )]
    Names,
}

impl ActiveModelBehavior for ActiveModel {}
