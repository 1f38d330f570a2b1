pub mod janeway;
pub mod match_info;
pub mod party;
pub mod production;
pub mod releaser;
pub mod tournament;
