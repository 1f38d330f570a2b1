use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "nicks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub releaser_id: i32,
    pub name: String,
    pub is_primary_nick: bool,
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
    #[sea_orm(has_many = "super::nick_variants::Entity")]
    NickVariants,
}

impl Related<super::releasers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Releasers.def()
    }
}

impl Related<super::nick_variants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NickVariants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
