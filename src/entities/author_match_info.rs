use sea_orm::entity::prelude::*;

/// Last computed match counts for a releaser. Display cache only.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "author_match_info")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub releaser_id: i32,
    pub matched_production_count: i32,
    pub unmatched_demozoo_production_count: i32,
    pub unmatched_janeway_production_count: i32,
    pub updated_at: Option<String>,
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

impl ActiveModelBehavior for ActiveModel {}
