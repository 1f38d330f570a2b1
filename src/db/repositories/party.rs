use crate::entities::{parties, party_organisers, prelude::*};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

pub struct PartyRepository {
    conn: DatabaseConnection,
}

impl PartyRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, name: &str) -> Result<parties::Model> {
        Ok(parties::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?)
    }

    pub async fn get(&self, id: i32) -> Result<Option<parties::Model>> {
        Ok(Parties::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn has_organiser(&self, party_id: i32, releaser_id: i32) -> Result<bool> {
        let count = PartyOrganisers::find()
            .filter(party_organisers::Column::PartyId.eq(party_id))
            .filter(party_organisers::Column::ReleaserId.eq(releaser_id))
            .count(&self.conn)
            .await?;
        Ok(count > 0)
    }

    pub async fn add_organiser(
        &self,
        party_id: i32,
        releaser_id: i32,
        role: &str,
    ) -> Result<party_organisers::Model> {
        Ok(party_organisers::ActiveModel {
            party_id: Set(party_id),
            releaser_id: Set(releaser_id),
            role: Set(role.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?)
    }

    pub async fn organisers(&self, party_id: i32) -> Result<Vec<party_organisers::Model>> {
        Ok(PartyOrganisers::find()
            .filter(party_organisers::Column::PartyId.eq(party_id))
            .order_by_asc(party_organisers::Column::Id)
            .all(&self.conn)
            .await?)
    }
}
