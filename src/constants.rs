/// Music module / audio extensions recognised on Janeway music titles,
/// either as a `.ext` suffix or as an Amiga-style `ext.` prefix.
pub const MUSIC_EXTENSIONS: &[&str] = &[
    "mod", "xm", "s3m", "it", "med", "mmd0", "mmd1", "mmd2", "mmd3", "okt", "ahx", "thx", "sid",
    "mptm", "669", "mtm", "stm", "ult", "far", "dbm", "digi", "hvl", "bp", "fc", "tfmx", "mp3",
    "ogg", "wav", "flac",
];

pub mod link_source {

    pub const AUTOMATCH: &str = "janeway-automatch";

    pub const JANEWAY_IMPORT: &str = "janeway";
}

pub mod data_source {

    pub const JANEWAY: &str = "janeway";
}

pub mod edits {

    pub const EDIT_PRODUCTION_CORE_DETAILS: &str = "edit_production_core_details";
}

pub mod tournaments {

    /// Top-level staff job that earns a party organiser credit.
    pub const ORGANISER_JOB: &str = "Organizers";

    /// Phase staff job titles (lower-cased) mapped to stored role codes.
    pub const ROLES_LOOKUP: &[(&str, &str)] = &[
        ("commentator", "commentary"),
        ("commentators", "commentary"),
        ("dj set", "dj_set"),
        ("live music", "live_music"),
        ("live set", "live_music"),
    ];

    #[must_use]
    pub fn role_for_job(job: &str) -> Option<&'static str> {
        let job = job.trim().to_lowercase();
        ROLES_LOOKUP
            .iter()
            .find(|(title, _)| *title == job)
            .map(|(_, role)| *role)
    }
}

#[cfg(test)]
mod tests {
    use super::tournaments::role_for_job;

    #[test]
    fn role_lookup_is_case_insensitive() {
        assert_eq!(role_for_job("Commentators"), Some("commentary"));
        assert_eq!(role_for_job("DJ Set"), Some("dj_set"));
        assert_eq!(role_for_job("Live set"), Some("live_music"));
        assert_eq!(role_for_job("Juggler"), None);
    }
}
