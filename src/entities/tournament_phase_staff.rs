use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tournament_phase_staff")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub phase_id: i32,
    pub nick_id: Option<i32>,
    pub name: String,
    pub role: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tournament_phases::Entity",
        from = "Column::PhaseId",
        to = "super::tournament_phases::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Phases,
    #[sea_orm(
        belongs_to = "super::nicks::Entity",
        from = "Column::NickId",
        to = "super::nicks::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Nicks,
}

impl Related<super::tournament_phases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Phases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
