use crate::domain::{LinkClass, Supertype};
use crate::entities::{
    edits, platforms, prelude::*, production_author_affiliation_nicks, production_author_nicks,
    production_links, production_platforms, production_type_assignments, production_types,
    productions,
};
use crate::parser::title::generate_search_title;
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Which local productions fall inside the Janeway archive's scope.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    /// A production on any platform whose name starts with this is in scope.
    pub platform_prefix: String,
    /// A platformless production carrying this type (by internal name) is in scope.
    pub tracked_music_type: String,
}

#[derive(Debug, Clone)]
pub struct NewProduction {
    pub title: String,
    pub supertype: Supertype,
    pub data_source: Option<String>,
    pub platform_ids: Vec<i32>,
    pub type_ids: Vec<i32>,
    pub author_nick_ids: Vec<i32>,
    pub affiliation_nick_ids: Vec<i32>,
}

impl NewProduction {
    #[must_use]
    pub fn new(title: impl Into<String>, supertype: Supertype) -> Self {
        Self {
            title: title.into(),
            supertype,
            data_source: None,
            platform_ids: Vec::new(),
            type_ids: Vec::new(),
            author_nick_ids: Vec::new(),
            affiliation_nick_ids: Vec::new(),
        }
    }
}

pub struct ProductionRepository {
    conn: DatabaseConnection,
}

impl ProductionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Creates a production with its credits. The stored supertype follows the
    /// assigned types when any of them is a music or graphics type.
    pub async fn create(&self, new: NewProduction) -> Result<productions::Model> {
        let supertype = self.derive_supertype(new.supertype, &new.type_ids).await?;

        let production = productions::ActiveModel {
            title: Set(new.title.clone()),
            supertype: Set(supertype.as_str().to_string()),
            search_title: Set(generate_search_title(&new.title)),
            data_source: Set(new.data_source),
            created_at: Set(Some(chrono::Utc::now().to_rfc3339())),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        for platform_id in new.platform_ids {
            self.add_platform(production.id, platform_id).await?;
        }
        for type_id in new.type_ids {
            self.add_type(production.id, type_id).await?;
        }
        for nick_id in new.author_nick_ids {
            self.add_author_nick(production.id, nick_id).await?;
        }
        for nick_id in new.affiliation_nick_ids {
            self.add_affiliation_nick(production.id, nick_id).await?;
        }

        debug!("Created production {} (ID: {})", production.title, production.id);
        Ok(production)
    }

    async fn derive_supertype(&self, requested: Supertype, type_ids: &[i32]) -> Result<Supertype> {
        if type_ids.is_empty() {
            return Ok(requested);
        }

        let type_supertypes: Vec<Supertype> = ProductionTypes::find()
            .filter(production_types::Column::Id.is_in(type_ids.iter().copied()))
            .all(&self.conn)
            .await?
            .iter()
            .filter_map(|t| t.supertype.parse().ok())
            .collect();

        Ok([Supertype::Music, Supertype::Graphics]
            .into_iter()
            .find(|s| type_supertypes.contains(s))
            .unwrap_or(requested))
    }

    pub async fn get(&self, id: i32) -> Result<Option<productions::Model>> {
        Ok(Productions::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<productions::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(Productions::find()
            .filter(productions::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(productions::Column::Title)
            .order_by_asc(productions::Column::Id)
            .all(&self.conn)
            .await?)
    }

    // ========== Credits ==========

    pub async fn add_author_nick(&self, production_id: i32, nick_id: i32) -> Result<()> {
        ProductionAuthorNicks::insert(production_author_nicks::ActiveModel {
            production_id: Set(production_id),
            nick_id: Set(nick_id),
        })
        .exec_without_returning(&self.conn)
        .await?;
        Ok(())
    }

    pub async fn add_affiliation_nick(&self, production_id: i32, nick_id: i32) -> Result<()> {
        ProductionAuthorAffiliationNicks::insert(production_author_affiliation_nicks::ActiveModel {
            production_id: Set(production_id),
            nick_id: Set(nick_id),
        })
        .exec_without_returning(&self.conn)
        .await?;
        Ok(())
    }

    /// Author and affiliation nicks credited on a production.
    pub async fn credited_nick_ids(&self, production_id: i32) -> Result<BTreeSet<i32>> {
        let mut ids: BTreeSet<i32> = ProductionAuthorNicks::find()
            .filter(production_author_nicks::Column::ProductionId.eq(production_id))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|row| row.nick_id)
            .collect();

        ids.extend(
            ProductionAuthorAffiliationNicks::find()
                .filter(production_author_affiliation_nicks::Column::ProductionId.eq(production_id))
                .all(&self.conn)
                .await?
                .into_iter()
                .map(|row| row.nick_id),
        );

        Ok(ids)
    }

    /// Productions crediting any of the nicks, as author or affiliation.
    async fn production_ids_for_nicks(&self, nick_ids: &[i32]) -> Result<BTreeSet<i32>> {
        if nick_ids.is_empty() {
            return Ok(BTreeSet::new());
        }

        let mut ids: BTreeSet<i32> = ProductionAuthorNicks::find()
            .filter(production_author_nicks::Column::NickId.is_in(nick_ids.iter().copied()))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|row| row.production_id)
            .collect();

        ids.extend(
            ProductionAuthorAffiliationNicks::find()
                .filter(
                    production_author_affiliation_nicks::Column::NickId
                        .is_in(nick_ids.iter().copied()),
                )
                .all(&self.conn)
                .await?
                .into_iter()
                .map(|row| row.production_id),
        );

        Ok(ids)
    }

    /// Of the given productions, how many credit neither an author nor an
    /// affiliation nick.
    pub async fn count_authorless(&self, production_ids: &[i32]) -> Result<usize> {
        let mut count = 0;
        for &production_id in production_ids {
            if self.credited_nick_ids(production_id).await?.is_empty() {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Of the given productions, how many were created from the given data source.
    pub async fn count_with_data_source(
        &self,
        production_ids: &[i32],
        data_source: &str,
    ) -> Result<usize> {
        let rows = self.get_by_ids(production_ids).await?;
        Ok(rows
            .iter()
            .filter(|p| p.data_source.as_deref() == Some(data_source))
            .count())
    }

    // ========== Candidate discovery ==========

    /// Productions credited to any of the nicks that pass the scope filter,
    /// ordered by title.
    pub async fn find_candidates_for_nicks(
        &self,
        nick_ids: &[i32],
        filter: &CandidateFilter,
    ) -> Result<Vec<productions::Model>> {
        let production_ids = self.production_ids_for_nicks(nick_ids).await?;
        if production_ids.is_empty() {
            return Ok(Vec::new());
        }

        let platform_rows = ProductionPlatforms::find()
            .filter(production_platforms::Column::ProductionId.is_in(production_ids.iter().copied()))
            .all(&self.conn)
            .await?;

        let platform_ids: BTreeSet<i32> = platform_rows.iter().map(|r| r.platform_id).collect();
        let in_scope_platforms: HashSet<i32> = if platform_ids.is_empty() {
            HashSet::new()
        } else {
            Platforms::find()
                .filter(platforms::Column::Id.is_in(platform_ids))
                .all(&self.conn)
                .await?
                .into_iter()
                .filter(|p| p.name.starts_with(&filter.platform_prefix))
                .map(|p| p.id)
                .collect()
        };

        let mut platforms_by_production: HashMap<i32, Vec<i32>> = HashMap::new();
        for row in &platform_rows {
            platforms_by_production
                .entry(row.production_id)
                .or_default()
                .push(row.platform_id);
        }

        let tracked_music: HashSet<i32> = match self
            .find_type_by_internal_name(&filter.tracked_music_type)
            .await?
        {
            Some(music_type) => ProductionTypeAssignments::find()
                .filter(
                    production_type_assignments::Column::ProductionId
                        .is_in(production_ids.iter().copied()),
                )
                .filter(production_type_assignments::Column::ProductionTypeId.eq(music_type.id))
                .all(&self.conn)
                .await?
                .into_iter()
                .map(|row| row.production_id)
                .collect(),
            None => HashSet::new(),
        };

        let candidate_ids: Vec<i32> = production_ids
            .into_iter()
            .filter(|id| match platforms_by_production.get(id) {
                Some(platform_ids) => platform_ids.iter().any(|p| in_scope_platforms.contains(p)),
                None => tracked_music.contains(id),
            })
            .collect();

        self.get_by_ids(&candidate_ids).await
    }

    // ========== Cross-links ==========

    /// Inserts a production link. Storage errors are returned untouched so
    /// callers can tell a unique violation apart from other failures.
    pub async fn create_link(
        &self,
        production_id: i32,
        link_class: LinkClass,
        parameter: &str,
        source: &str,
    ) -> Result<production_links::Model, DbErr> {
        production_links::ActiveModel {
            production_id: Set(production_id),
            link_class: Set(link_class.as_str().to_string()),
            parameter: Set(parameter.to_string()),
            is_download_link: Set(false),
            source: Set(source.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
    }

    pub async fn links_for_production(
        &self,
        production_id: i32,
        link_class: LinkClass,
    ) -> Result<Vec<production_links::Model>> {
        Ok(ProductionLinks::find()
            .filter(production_links::Column::ProductionId.eq(production_id))
            .filter(production_links::Column::LinkClass.eq(link_class.as_str()))
            .order_by_asc(production_links::Column::Id)
            .all(&self.conn)
            .await?)
    }

    /// Links of one class where either the production or the parameter is
    /// among the given ones.
    pub async fn links_touching(
        &self,
        link_class: LinkClass,
        production_ids: &[i32],
        parameters: &[String],
    ) -> Result<Vec<production_links::Model>> {
        if production_ids.is_empty() && parameters.is_empty() {
            return Ok(Vec::new());
        }

        let rows = ProductionLinks::find()
            .filter(production_links::Column::LinkClass.eq(link_class.as_str()))
            .filter(
                production_links::Column::ProductionId
                    .is_in(production_ids.iter().copied())
                    .or(production_links::Column::Parameter.is_in(parameters.iter().cloned())),
            )
            .order_by_asc(production_links::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    pub async fn all_links_of_class(
        &self,
        link_class: LinkClass,
    ) -> Result<Vec<production_links::Model>> {
        Ok(ProductionLinks::find()
            .filter(production_links::Column::LinkClass.eq(link_class.as_str()))
            .order_by_asc(production_links::Column::ProductionId)
            .order_by_asc(production_links::Column::Id)
            .all(&self.conn)
            .await?)
    }

    // ========== Platforms & types ==========

    pub async fn create_platform(&self, name: &str) -> Result<platforms::Model> {
        Ok(platforms::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?)
    }

    pub async fn find_platform_by_name(&self, name: &str) -> Result<Option<platforms::Model>> {
        Ok(Platforms::find()
            .filter(platforms::Column::Name.eq(name))
            .one(&self.conn)
            .await?)
    }

    pub async fn create_type(
        &self,
        name: &str,
        internal_name: &str,
        supertype: Supertype,
    ) -> Result<production_types::Model> {
        Ok(production_types::ActiveModel {
            name: Set(name.to_string()),
            internal_name: Set(internal_name.to_string()),
            supertype: Set(supertype.as_str().to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?)
    }

    pub async fn find_type_by_internal_name(
        &self,
        internal_name: &str,
    ) -> Result<Option<production_types::Model>> {
        Ok(ProductionTypes::find()
            .filter(production_types::Column::InternalName.eq(internal_name))
            .one(&self.conn)
            .await?)
    }

    pub async fn add_platform(&self, production_id: i32, platform_id: i32) -> Result<()> {
        ProductionPlatforms::insert(production_platforms::ActiveModel {
            production_id: Set(production_id),
            platform_id: Set(platform_id),
        })
        .exec_without_returning(&self.conn)
        .await?;
        Ok(())
    }

    pub async fn add_type(&self, production_id: i32, production_type_id: i32) -> Result<()> {
        ProductionTypeAssignments::insert(production_type_assignments::ActiveModel {
            production_id: Set(production_id),
            production_type_id: Set(production_type_id),
        })
        .exec_without_returning(&self.conn)
        .await?;
        Ok(())
    }

    // ========== Edit log ==========

    pub async fn record_edit(&self, action_type: &str, production_id: i32) -> Result<()> {
        edits::ActiveModel {
            action_type: Set(action_type.to_string()),
            focus_object_id: Set(production_id),
            created_at: Set(Some(chrono::Utc::now().to_rfc3339())),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;
        Ok(())
    }

    /// Of the given productions, those with at least one edit of this type.
    pub async fn ids_with_edit(
        &self,
        production_ids: &[i32],
        action_type: &str,
    ) -> Result<BTreeSet<i32>> {
        if production_ids.is_empty() {
            return Ok(BTreeSet::new());
        }

        Ok(Edits::find()
            .filter(edits::Column::ActionType.eq(action_type))
            .filter(edits::Column::FocusObjectId.is_in(production_ids.iter().copied()))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|e| e.focus_object_id)
            .collect())
    }
}
