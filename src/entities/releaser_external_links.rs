use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "releaser_external_links")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub releaser_id: i32,
    pub link_class: String,
    pub parameter: String,
    pub source: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::releasers::Entity",
        from = "Column::ReleaserId",
        to = "super::releasers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Releasers,
}

impl Related<super::releasers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Releasers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
