pub mod matching_service;
pub mod matching_service_impl;
pub use matching_service::{
    AutomatchResult, JanewayRelease, LocalProduction, MatchedPair, MatchingError,
    MatchingService, MissingAuthorsReport, ProductionMatchData,
};
pub use matching_service_impl::SeaOrmMatchingService;

pub mod release_importer;
pub use release_importer::{ReleaseImporter, StoreReleaseImporter};

pub mod screenshot;

pub mod tournament_service;
pub mod tournament_service_impl;
pub use tournament_service::{
    DirectoryImportSummary, ImportOutcome, TournamentError, TournamentFile,
    TournamentImportService,
};
pub use tournament_service_impl::SeaOrmTournamentService;
