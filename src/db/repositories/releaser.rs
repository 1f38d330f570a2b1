use crate::domain::LinkClass;
use crate::entities::{nick_variants, nicks, prelude::*, releaser_external_links, releasers};
use crate::parser::title::generate_search_title;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

pub struct ReleaserRepository {
    conn: DatabaseConnection,
}

impl ReleaserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Creates a releaser together with its primary nick.
    pub async fn create(
        &self,
        name: &str,
        is_group: bool,
        notes: &str,
    ) -> anyhow::Result<releasers::Model> {
        let releaser = releasers::ActiveModel {
            name: Set(name.to_string()),
            is_group: Set(is_group),
            notes: Set(notes.to_string()),
            created_at: Set(Some(chrono::Utc::now().to_rfc3339())),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        self.add_nick(releaser.id, name, true).await?;

        info!("Created releaser {} (ID: {})", releaser.name, releaser.id);
        Ok(releaser)
    }

    pub async fn get(&self, id: i32) -> anyhow::Result<Option<releasers::Model>> {
        Ok(Releasers::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> anyhow::Result<Vec<releasers::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(Releasers::find()
            .filter(releasers::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(releasers::Column::Id)
            .all(&self.conn)
            .await?)
    }

    /// Adds a nick and the variant carrying its own name.
    pub async fn add_nick(
        &self,
        releaser_id: i32,
        name: &str,
        is_primary_nick: bool,
    ) -> anyhow::Result<nicks::Model> {
        let nick = nicks::ActiveModel {
            releaser_id: Set(releaser_id),
            name: Set(name.to_string()),
            is_primary_nick: Set(is_primary_nick),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        self.add_nick_variant(nick.id, name).await?;
        Ok(nick)
    }

    pub async fn add_nick_variant(
        &self,
        nick_id: i32,
        name: &str,
    ) -> anyhow::Result<nick_variants::Model> {
        let variant = nick_variants::ActiveModel {
            nick_id: Set(nick_id),
            name: Set(name.to_string()),
            search_title: Set(generate_search_title(name)),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        Ok(variant)
    }

    /// Renames a nick, rewriting the variant that carried the old name so its
    /// search title stays derived from the name.
    pub async fn rename_nick(&self, nick_id: i32, new_name: &str) -> anyhow::Result<()> {
        let Some(nick) = Nicks::find_by_id(nick_id).one(&self.conn).await? else {
            anyhow::bail!("Nick {nick_id} not found");
        };

        let old_name = nick.name.clone();
        let mut active: nicks::ActiveModel = nick.into();
        active.name = Set(new_name.to_string());
        active.update(&self.conn).await?;

        let variants = NickVariants::find()
            .filter(nick_variants::Column::NickId.eq(nick_id))
            .filter(nick_variants::Column::Name.eq(old_name.as_str()))
            .all(&self.conn)
            .await?;

        if variants.is_empty() {
            self.add_nick_variant(nick_id, new_name).await?;
        }

        for variant in variants {
            let mut active: nick_variants::ActiveModel = variant.into();
            active.name = Set(new_name.to_string());
            active.search_title = Set(generate_search_title(new_name));
            active.update(&self.conn).await?;
        }

        debug!("Renamed nick {} from '{}' to '{}'", nick_id, old_name, new_name);
        Ok(())
    }

    pub async fn nick_ids(&self, releaser_id: i32) -> anyhow::Result<Vec<i32>> {
        let rows = Nicks::find()
            .filter(nicks::Column::ReleaserId.eq(releaser_id))
            .order_by_asc(nicks::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|n| n.id).collect())
    }

    pub async fn primary_nick(&self, releaser_id: i32) -> anyhow::Result<Option<nicks::Model>> {
        Ok(Nicks::find()
            .filter(nicks::Column::ReleaserId.eq(releaser_id))
            .filter(nicks::Column::IsPrimaryNick.eq(true))
            .one(&self.conn)
            .await?)
    }

    pub async fn nicks_with_variants(
        &self,
        releaser_id: i32,
    ) -> anyhow::Result<Vec<(nicks::Model, Vec<nick_variants::Model>)>> {
        Ok(Nicks::find()
            .filter(nicks::Column::ReleaserId.eq(releaser_id))
            .order_by_asc(nicks::Column::Id)
            .find_with_related(NickVariants)
            .all(&self.conn)
            .await?)
    }

    /// Maps each of the given nicks to the releaser owning it.
    pub async fn releaser_ids_for_nicks(
        &self,
        nick_ids: &[i32],
    ) -> anyhow::Result<HashMap<i32, i32>> {
        if nick_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Nicks::find()
            .filter(nicks::Column::Id.is_in(nick_ids.iter().copied()))
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|n| (n.id, n.releaser_id)).collect())
    }

    /// Releasers of the given kind owning a nick variant with any of the given
    /// search titles.
    pub async fn find_ids_by_search_titles(
        &self,
        is_group: bool,
        search_titles: &[String],
    ) -> anyhow::Result<Vec<i32>> {
        if search_titles.is_empty() {
            return Ok(Vec::new());
        }

        let variants = NickVariants::find()
            .filter(nick_variants::Column::SearchTitle.is_in(search_titles.iter().cloned()))
            .all(&self.conn)
            .await?;

        let nick_ids: Vec<i32> = variants.iter().map(|v| v.nick_id).collect();
        let releaser_ids: BTreeSet<i32> = self
            .releaser_ids_for_nicks(&nick_ids)
            .await?
            .into_values()
            .collect();

        if releaser_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = Releasers::find()
            .filter(releasers::Column::Id.is_in(releaser_ids))
            .filter(releasers::Column::IsGroup.eq(is_group))
            .order_by_asc(releasers::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|r| r.id).collect())
    }

    pub async fn add_external_link(
        &self,
        releaser_id: i32,
        link_class: LinkClass,
        parameter: &str,
        source: &str,
    ) -> anyhow::Result<releaser_external_links::Model> {
        let link = releaser_external_links::ActiveModel {
            releaser_id: Set(releaser_id),
            link_class: Set(link_class.as_str().to_string()),
            parameter: Set(parameter.to_string()),
            source: Set(source.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        Ok(link)
    }

    pub async fn external_link_parameters(
        &self,
        releaser_id: i32,
        link_class: LinkClass,
    ) -> anyhow::Result<Vec<String>> {
        let rows = ReleaserExternalLinks::find()
            .filter(releaser_external_links::Column::ReleaserId.eq(releaser_id))
            .filter(releaser_external_links::Column::LinkClass.eq(link_class.as_str()))
            .order_by_asc(releaser_external_links::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|l| l.parameter).collect())
    }

    /// External links of one class held by any of the given releasers.
    pub async fn external_links_for_releasers(
        &self,
        releaser_ids: &[i32],
        link_class: LinkClass,
    ) -> anyhow::Result<Vec<releaser_external_links::Model>> {
        if releaser_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(ReleaserExternalLinks::find()
            .filter(releaser_external_links::Column::ReleaserId.is_in(releaser_ids.iter().copied()))
            .filter(releaser_external_links::Column::LinkClass.eq(link_class.as_str()))
            .all(&self.conn)
            .await?)
    }

    /// Releasers holding a link of this class with exactly this parameter.
    pub async fn releaser_ids_linked_to(
        &self,
        link_class: LinkClass,
        parameter: &str,
    ) -> anyhow::Result<Vec<i32>> {
        let rows = ReleaserExternalLinks::find()
            .filter(releaser_external_links::Column::LinkClass.eq(link_class.as_str()))
            .filter(releaser_external_links::Column::Parameter.eq(parameter))
            .all(&self.conn)
            .await?;

        let ids: BTreeSet<i32> = rows.into_iter().map(|l| l.releaser_id).collect();
        Ok(ids.into_iter().collect())
    }

    /// Every releaser with at least one link of the given class, ascending.
    pub async fn ids_with_link_class(&self, link_class: LinkClass) -> anyhow::Result<Vec<i32>> {
        let rows = ReleaserExternalLinks::find()
            .filter(releaser_external_links::Column::LinkClass.eq(link_class.as_str()))
            .all(&self.conn)
            .await?;

        let ids: BTreeSet<i32> = rows.into_iter().map(|l| l.releaser_id).collect();
        Ok(ids.into_iter().collect())
    }
}
