use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "releasers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub is_group: bool,
    pub notes: String,
    pub created_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::nicks::Entity")]
    Nicks,
    #[sea_orm(has_many = "super::releaser_external_links::Entity")]
    ExternalLinks,
}

impl Related<super::nicks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Nicks.def()
    }
}

impl Related<super::releaser_external_links::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExternalLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
