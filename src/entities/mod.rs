pub mod prelude;

pub mod author_match_info;
pub mod edits;
pub mod janeway_authors;
pub mod janeway_names;
pub mod janeway_release_author_names;
pub mod janeway_releases;
pub mod nick_variants;
pub mod nicks;
pub mod parties;
pub mod party_organisers;
pub mod platforms;
pub mod production_author_affiliation_nicks;
pub mod production_author_nicks;
pub mod production_links;
pub mod production_platforms;
pub mod production_type_assignments;
pub mod production_types;
pub mod productions;
pub mod releaser_external_links;
pub mod releasers;
pub mod tournament_entries;
pub mod tournament_phase_staff;
pub mod tournament_phases;
pub mod tournaments;
