use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Releasers)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Nicks)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(NickVariants)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ReleaserExternalLinks)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Platforms)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ProductionTypes)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Productions)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ProductionPlatforms)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ProductionTypeAssignments)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ProductionAuthorNicks)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ProductionAuthorAffiliationNicks)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ProductionLinks)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Edits)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(JanewayAuthors)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(JanewayNames)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(JanewayReleases)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(JanewayReleaseAuthorNames)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(AuthorMatchInfo)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Parties)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(PartyOrganisers)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Tournaments)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(TournamentPhases)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(TournamentEntries)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(TournamentPhaseStaff)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TournamentPhaseStaff).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TournamentEntries).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TournamentPhases).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tournaments).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PartyOrganisers).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Parties).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthorMatchInfo).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JanewayReleaseAuthorNames).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JanewayReleases).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JanewayNames).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JanewayAuthors).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Edits).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductionLinks).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductionAuthorAffiliationNicks).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductionAuthorNicks).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductionTypeAssignments).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductionPlatforms).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Productions).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductionTypes).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Platforms).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ReleaserExternalLinks).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NickVariants).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Nicks).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Releasers).if_exists().to_owned())
            .await?;

        Ok(())
    }
}
