pub use super::author_match_info::Entity as AuthorMatchInfo;
pub use super::edits::Entity as Edits;
pub use super::janeway_authors::Entity as JanewayAuthors;
pub use super::janeway_names::Entity as JanewayNames;
pub use super::janeway_release_author_names::Entity as JanewayReleaseAuthorNames;
pub use super::janeway_releases::Entity as JanewayReleases;
pub use super::nick_variants::Entity as NickVariants;
pub use super::nicks::Entity as Nicks;
pub use super::parties::Entity as Parties;
pub use super::party_organisers::Entity as PartyOrganisers;
pub use super::platforms::Entity as Platforms;
pub use super::production_author_affiliation_nicks::Entity as ProductionAuthorAffiliationNicks;
pub use super::production_author_nicks::Entity as ProductionAuthorNicks;
pub use super::production_links::Entity as ProductionLinks;
pub use super::production_platforms::Entity as ProductionPlatforms;
pub use super::production_type_assignments::Entity as ProductionTypeAssignments;
pub use super::production_types::Entity as ProductionTypes;
pub use super::productions::Entity as Productions;
pub use super::releaser_external_links::Entity as ReleaserExternalLinks;
pub use super::releasers::Entity as Releasers;
pub use super::tournament_entries::Entity as TournamentEntries;
pub use super::tournament_phase_staff::Entity as TournamentPhaseStaff;
pub use super::tournament_phases::Entity as TournamentPhases;
pub use super::tournaments::Entity as Tournaments;
