use sea_orm::entity::prelude::*;

/// Alternate spelling of a nick. `search_title` is always derived from
/// `name`; write through `ReleaserRepository` so the two never drift.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "nick_variants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub nick_id: i32,
    pub name: String,
    pub search_title: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::nicks::Entity",
        from = "Column::NickId",
        to = "super::nicks::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Nicks,
}

impl Related<super::nicks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Nicks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
