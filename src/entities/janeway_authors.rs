use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "janeway_authors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub janeway_id: i32,
    pub name: String,
    pub is_group: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::janeway_names::Entity")]
    Names,
}

impl Related<super::janeway_names::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Names.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
