use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "production_author_nicks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub production_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub nick_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::productions::Entity",
        from = "Column::ProductionId",
        to = "super::productions::Column::Id",
        on_delete = "Cascade"
    )]
    Productions,
    #[sea_orm(
        belongs_to = "super::nicks::Entity",
        from = "Column::NickId",
        to = "super::nicks::Column::Id",
        on_delete = "Cascade"
    )]
    Nicks,
}

impl ActiveModelBehavior for ActiveModel {}
