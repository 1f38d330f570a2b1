use crate::domain::{JanewayId, Supertype};
use crate::entities::{
    janeway_authors, janeway_names, janeway_release_author_names, janeway_releases, prelude::*,
};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::{BTreeSet, HashMap};

/// One author name credited on a Janeway release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAuthorCredit {
    pub author_janeway_id: JanewayId,
    /// The name the author is credited under on this release.
    pub name: String,
    pub is_group: bool,
}

/// Read access to the mirrored Janeway tables. Writes exist only to seed the
/// mirror.
pub struct JanewayRepository {
    conn: DatabaseConnection,
}

impl JanewayRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Creates an author with a name row carrying the author's main name.
    pub async fn create_author(
        &self,
        janeway_id: JanewayId,
        name: &str,
        is_group: bool,
    ) -> Result<(janeway_authors::Model, janeway_names::Model)> {
        let author = janeway_authors::ActiveModel {
            janeway_id: Set(janeway_id.value()),
            name: Set(name.to_string()),
            is_group: Set(is_group),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        let primary_name = self.add_name(author.id, name).await?;
        Ok((author, primary_name))
    }

    pub async fn add_name(&self, author_id: i32, name: &str) -> Result<janeway_names::Model> {
        Ok(janeway_names::ActiveModel {
            author_id: Set(author_id),
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?)
    }

    pub async fn create_release(
        &self,
        janeway_id: JanewayId,
        title: &str,
        supertype: Supertype,
    ) -> Result<janeway_releases::Model> {
        Ok(janeway_releases::ActiveModel {
            janeway_id: Set(janeway_id.value()),
            title: Set(title.to_string()),
            supertype: Set(supertype.as_str().to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?)
    }

    /// Credits an author name on a release.
    pub async fn add_release_credit(&self, release_id: i32, name_id: i32) -> Result<()> {
        JanewayReleaseAuthorNames::insert(janeway_release_author_names::ActiveModel {
            release_id: Set(release_id),
            name_id: Set(name_id),
        })
        .exec_without_returning(&self.conn)
        .await?;
        Ok(())
    }

    pub async fn author_by_janeway_id(
        &self,
        janeway_id: JanewayId,
    ) -> Result<Option<janeway_authors::Model>> {
        Ok(JanewayAuthors::find()
            .filter(janeway_authors::Column::JanewayId.eq(janeway_id.value()))
            .one(&self.conn)
            .await?)
    }

    pub async fn names_for_author(&self, author_id: i32) -> Result<Vec<janeway_names::Model>> {
        Ok(JanewayNames::find()
            .filter(janeway_names::Column::AuthorId.eq(author_id))
            .order_by_asc(janeway_names::Column::Id)
            .all(&self.conn)
            .await?)
    }

    /// Releases credited to any of the given authors under any of their
    /// names. Each release appears once; ordered by title.
    pub async fn releases_by_author_janeway_ids(
        &self,
        author_ids: &[JanewayId],
    ) -> Result<Vec<janeway_releases::Model>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        let authors = JanewayAuthors::find()
            .filter(janeway_authors::Column::JanewayId.is_in(author_ids.iter().map(|id| id.value())))
            .all(&self.conn)
            .await?;
        if authors.is_empty() {
            return Ok(Vec::new());
        }

        let name_ids: Vec<i32> = JanewayNames::find()
            .filter(janeway_names::Column::AuthorId.is_in(authors.iter().map(|a| a.id)))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|n| n.id)
            .collect();
        if name_ids.is_empty() {
            return Ok(Vec::new());
        }

        let release_ids: BTreeSet<i32> = JanewayReleaseAuthorNames::find()
            .filter(janeway_release_author_names::Column::NameId.is_in(name_ids))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|credit| credit.release_id)
            .collect();
        if release_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(JanewayReleases::find()
            .filter(janeway_releases::Column::Id.is_in(release_ids))
            .order_by_asc(janeway_releases::Column::Title)
            .order_by_asc(janeway_releases::Column::Id)
            .all(&self.conn)
            .await?)
    }

    pub async fn releases_by_janeway_ids(
        &self,
        janeway_ids: &[JanewayId],
    ) -> Result<Vec<janeway_releases::Model>> {
        if janeway_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(JanewayReleases::find()
            .filter(
                janeway_releases::Column::JanewayId.is_in(janeway_ids.iter().map(|id| id.value())),
            )
            .order_by_asc(janeway_releases::Column::Title)
            .all(&self.conn)
            .await?)
    }

    /// Author credits on one release, ordered by credited name.
    pub async fn release_author_credits(&self, release_id: i32) -> Result<Vec<ReleaseAuthorCredit>> {
        let name_ids: Vec<i32> = JanewayReleaseAuthorNames::find()
            .filter(janeway_release_author_names::Column::ReleaseId.eq(release_id))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|credit| credit.name_id)
            .collect();
        if name_ids.is_empty() {
            return Ok(Vec::new());
        }

        let names = JanewayNames::find()
            .filter(janeway_names::Column::Id.is_in(name_ids))
            .order_by_asc(janeway_names::Column::Name)
            .all(&self.conn)
            .await?;

        let authors: HashMap<i32, janeway_authors::Model> = JanewayAuthors::find()
            .filter(janeway_authors::Column::Id.is_in(names.iter().map(|n| n.author_id)))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        Ok(names
            .into_iter()
            .filter_map(|name| {
                authors.get(&name.author_id).map(|author| ReleaseAuthorCredit {
                    author_janeway_id: JanewayId::new(author.janeway_id),
                    name: name.name,
                    is_group: author.is_group,
                })
            })
            .collect())
    }

    /// Janeway author IDs credited on the releases with the given Janeway IDs.
    pub async fn author_ids_for_releases(
        &self,
        release_janeway_ids: &[JanewayId],
    ) -> Result<BTreeSet<JanewayId>> {
        let mut author_ids = BTreeSet::new();
        for release in self.releases_by_janeway_ids(release_janeway_ids).await? {
            author_ids.extend(
                self.release_author_credits(release.id)
                    .await?
                    .into_iter()
                    .map(|credit| credit.author_janeway_id),
            );
        }
        Ok(author_ids)
    }
}
