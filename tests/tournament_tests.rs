use scenematch::db::Store;
use scenematch::services::screenshot::file_sha256;
use scenematch::services::{
    ImportOutcome, SeaOrmTournamentService, TournamentError, TournamentFile,
    TournamentImportService,
};
use serde_json::{Value, json};
use std::path::Path;

struct Fixture {
    store: Store,
    service: SeaOrmTournamentService,
    media: tempfile::TempDir,
    party_id: i32,
    alia: i32,
    alia_nick: i32,
}

async fn setup() -> Fixture {
    let store = Store::in_memory().await.expect("Failed to create store");
    let party_id = store.parties().create("Revision 2024").await.unwrap().id;

    let alia = store.releasers().create("Alia", false, "").await.unwrap().id;
    let alia_nick = store.releasers().primary_nick(alia).await.unwrap().unwrap().id;

    Fixture {
        service: SeaOrmTournamentService::new(store.clone()),
        store,
        media: tempfile::tempdir().unwrap(),
        party_id,
        alia,
        alia_nick,
    }
}

fn entry(releaser: Option<i32>, name: &str, rank: i64) -> Value {
    json!({
        "handle": {"demozoo_id": releaser, "name": name},
        "rank": rank,
        "points": null,
    })
}

fn results(party_id: i32, phases: Value) -> Value {
    json!({
        "title": "Revision 2024",
        "started": "2024-03-29",
        "demozoo_party_id": party_id,
        "type": "Shader Showdown",
        "phases": phases,
        "staffs": [],
    })
}

fn parse(value: Value) -> TournamentFile {
    serde_json::from_value(value).expect("valid tournament file")
}

fn three_entry_phase(alia: i32, ranks: [i64; 3]) -> Value {
    json!([{
        "title": "Final",
        "entries": [
            entry(Some(alia), "Alia", ranks[0]),
            entry(None, "Zed", ranks[1]),
            entry(None, "Nusan", ranks[2]),
        ],
        "staffs": [],
    }])
}

async fn only_tournament_phases(f: &Fixture, file: &str) -> Vec<scenematch::entities::tournament_phases::Model> {
    let tournament = f
        .store
        .tournaments()
        .find_by_source_file(file)
        .await
        .unwrap()
        .expect("tournament stored");
    f.store.tournaments().phases(tournament.id).await.unwrap()
}

#[tokio::test]
async fn test_import_creates_tournament() {
    let f = setup().await;
    let data = parse(results(f.party_id, three_entry_phase(f.alia, [1, 2, 3])));

    let outcome = f
        .service
        .import_tournament("revision2024.json", &data, f.media.path())
        .await
        .unwrap();
    assert_eq!(outcome, ImportOutcome::Created);

    let phases = only_tournament_phases(&f, "revision2024.json").await;
    assert_eq!(phases.len(), 1);
    assert_eq!(phases[0].name, "Final");
    assert_eq!(phases[0].position, 0);

    let entries = f.store.tournaments().entries(phases[0].id).await.unwrap();
    assert_eq!(entries.len(), 3);

    // Resolved handles keep only the nick; free-text handles only the name.
    assert_eq!(entries[0].nick_id, Some(f.alia_nick));
    assert_eq!(entries[0].name, "");
    assert_eq!(entries[1].nick_id, None);
    assert_eq!(entries[1].name, "Zed");
    assert_eq!(entries[2].ranking, "3");
    assert_eq!(entries[2].score, "");
    assert!(entries.iter().enumerate().all(|(i, e)| e.position == i as i32));
}

#[tokio::test]
async fn test_reimport_is_unchanged() {
    let f = setup().await;
    let data = parse(results(f.party_id, three_entry_phase(f.alia, [1, 2, 3])));

    f.service
        .import_tournament("revision2024.json", &data, f.media.path())
        .await
        .unwrap();
    let phases_before = only_tournament_phases(&f, "revision2024.json").await;
    let entries_before = f.store.tournaments().entries(phases_before[0].id).await.unwrap();

    let outcome = f
        .service
        .import_tournament("revision2024.json", &data, f.media.path())
        .await
        .unwrap();
    assert_eq!(outcome, ImportOutcome::Unchanged);

    let phases_after = only_tournament_phases(&f, "revision2024.json").await;
    assert_eq!(phases_after, phases_before);
    assert_eq!(
        f.store.tournaments().entries(phases_after[0].id).await.unwrap(),
        entries_before
    );
}

#[tokio::test]
async fn test_rank_change_rewrites_only_that_entry() {
    let f = setup().await;
    f.service
        .import_tournament(
            "revision2024.json",
            &parse(results(f.party_id, three_entry_phase(f.alia, [1, 2, 3]))),
            f.media.path(),
        )
        .await
        .unwrap();
    let phase_id = only_tournament_phases(&f, "revision2024.json").await[0].id;
    let before = f.store.tournaments().entries(phase_id).await.unwrap();

    let outcome = f
        .service
        .import_tournament(
            "revision2024.json",
            &parse(results(f.party_id, three_entry_phase(f.alia, [1, 4, 3]))),
            f.media.path(),
        )
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ImportOutcome::Updated {
            entries_written: 1,
            staff_rewritten: false,
            phases_recreated: false,
        }
    );

    let after = f.store.tournaments().entries(phase_id).await.unwrap();
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[2]);
    assert_eq!(after[1].id, before[1].id);
    assert_eq!(after[1].ranking, "4");
}

#[tokio::test]
async fn test_phase_change_recreates_with_contiguous_positions() {
    let f = setup().await;
    f.service
        .import_tournament(
            "revision2024.json",
            &parse(results(f.party_id, three_entry_phase(f.alia, [1, 2, 3]))),
            f.media.path(),
        )
        .await
        .unwrap();

    let phases = json!([
        {"title": "Quarter final", "entries": [entry(None, "Zed", 1), entry(None, "Nusan", 2)], "staffs": []},
        {"title": null, "entries": [entry(Some(f.alia), "alia", 1)], "staffs": []},
    ]);
    let outcome = f
        .service
        .import_tournament("revision2024.json", &parse(results(f.party_id, phases)), f.media.path())
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        ImportOutcome::Updated {
            phases_recreated: true,
            ..
        }
    ));

    let stored = only_tournament_phases(&f, "revision2024.json").await;
    let layout: Vec<(i32, &str)> = stored.iter().map(|p| (p.position, p.name.as_str())).collect();
    assert_eq!(layout, vec![(0, "Quarter final"), (1, "")]);

    let second = f.store.tournaments().entries(stored[1].id).await.unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].position, 0);
    assert_eq!(second[0].nick_id, Some(f.alia_nick));
}

#[tokio::test]
async fn test_unknown_job_aborts_without_writes() {
    let f = setup().await;
    let phases = json!([{
        "title": "Final",
        "entries": [entry(None, "Zed", 1)],
        "staffs": [{"handle": {"demozoo_id": null, "name": "Gargaj"}, "job": "Juggler"}],
    }]);

    let err = f
        .service
        .import_tournament("revision2024.json", &parse(results(f.party_id, phases)), f.media.path())
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::UnknownJob { ref job, .. } if job == "Juggler"));
    assert!(!err.is_fatal());

    assert!(
        f.store
            .tournaments()
            .find_by_source_file("revision2024.json")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_phase_staff_roles() {
    let f = setup().await;
    let phases = json!([{
        "title": "Final",
        "entries": [entry(None, "Zed", 1)],
        "staffs": [
            {"handle": {"demozoo_id": null, "name": "Gargaj"}, "job": "Commentators"},
            {"handle": {"demozoo_id": f.alia, "name": "ALIA"}, "job": "DJ set"},
        ],
    }]);
    let data = parse(results(f.party_id, phases));

    f.service
        .import_tournament("revision2024.json", &data, f.media.path())
        .await
        .unwrap();
    let phase_id = only_tournament_phases(&f, "revision2024.json").await[0].id;
    let mut staff = f.store.tournaments().staff(phase_id).await.unwrap();
    staff.sort();

    let roles: Vec<(Option<i32>, &str, &str)> = staff
        .iter()
        .map(|s| (s.nick_id, s.name.as_str(), s.role.as_str()))
        .collect();
    assert_eq!(
        roles,
        vec![
            (None, "Gargaj", "commentary"),
            (Some(f.alia_nick), "", "dj_set"),
        ]
    );

    let outcome = f
        .service
        .import_tournament("revision2024.json", &data, f.media.path())
        .await
        .unwrap();
    assert_eq!(outcome, ImportOutcome::Unchanged);
}

#[tokio::test]
async fn test_unresolved_party_is_skipped() {
    let f = setup().await;
    let mut file = results(f.party_id, three_entry_phase(f.alia, [1, 2, 3]));
    file["demozoo_party_id"] = json!(9999);

    let outcome = f
        .service
        .import_tournament("unknown.json", &parse(file), f.media.path())
        .await
        .unwrap();
    assert!(matches!(outcome, ImportOutcome::Skipped { ref reason } if reason.contains("Revision 2024")));
    assert!(
        f.store
            .tournaments()
            .find_by_source_file("unknown.json")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_same_tournament_from_other_file_is_rejected() {
    let f = setup().await;
    let data = parse(results(f.party_id, three_entry_phase(f.alia, [1, 2, 3])));

    f.service
        .import_tournament("revision2024.json", &data, f.media.path())
        .await
        .unwrap();
    let err = f
        .service
        .import_tournament("revision2024-copy.json", &data, f.media.path())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TournamentError::SourceFileMismatch { ref existing, ref file }
            if existing == "revision2024.json" && file == "revision2024-copy.json"
    ));
}

#[tokio::test]
async fn test_ambiguous_nick_is_fatal() {
    let f = setup().await;
    let zed = f.store.releasers().create("Zed", false, "").await.unwrap().id;
    let second_nick = f.store.releasers().add_nick(zed, "Zedd", false).await.unwrap();
    f.store
        .releasers()
        .add_nick_variant(second_nick.id, "ZED")
        .await
        .unwrap();

    let phases = json!([{"title": "Final", "entries": [entry(Some(zed), "zed", 1)], "staffs": []}]);
    let err = f
        .service
        .import_tournament("revision2024.json", &parse(results(f.party_id, phases)), f.media.path())
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::AmbiguousNick { releaser_id, .. } if releaser_id == zed));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_unknown_nick_falls_back_to_free_text() {
    let f = setup().await;
    let phases = json!([{
        "title": "Final",
        "entries": [entry(Some(f.alia), "Somebody Else", 1), entry(Some(424_242), "Ghost", 2)],
        "staffs": [],
    }]);

    f.service
        .import_tournament("revision2024.json", &parse(results(f.party_id, phases)), f.media.path())
        .await
        .unwrap();
    let phase_id = only_tournament_phases(&f, "revision2024.json").await[0].id;
    let entries = f.store.tournaments().entries(phase_id).await.unwrap();
    assert_eq!(entries[0].nick_id, None);
    assert_eq!(entries[0].name, "Somebody Else");
    assert_eq!(entries[1].nick_id, None);
    assert_eq!(entries[1].name, "Ghost");
}

#[tokio::test]
async fn test_organiser_credited_once() {
    let f = setup().await;
    let mut file = results(f.party_id, three_entry_phase(f.alia, [1, 2, 3]));
    file["staffs"] = json!([
        {"handle": {"demozoo_id": f.alia, "name": "Alia"}, "job": "Organizers"},
        {"handle": {"demozoo_id": f.alia, "name": "alia"}, "job": "Organizers"},
        {"handle": {"demozoo_id": null, "name": "Helper"}, "job": "Organizers"},
        {"handle": {"demozoo_id": f.alia, "name": "Alia"}, "job": "Hosts"},
    ]);
    let data = parse(file);

    let outcome = f
        .service
        .import_tournament("revision2024.json", &data, f.media.path())
        .await
        .unwrap();
    assert_eq!(outcome, ImportOutcome::Created);

    let organisers = f.store.parties().organisers(f.party_id).await.unwrap();
    assert_eq!(organisers.len(), 1);
    assert_eq!(organisers[0].releaser_id, f.alia);
    assert_eq!(organisers[0].role, "Shader Showdown");

    let outcome = f
        .service
        .import_tournament("revision2024.json", &data, f.media.path())
        .await
        .unwrap();
    assert_eq!(outcome, ImportOutcome::Unchanged);
    assert_eq!(f.store.parties().organisers(f.party_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_screenshots() {
    let f = setup().await;
    std::fs::write(f.media.path().join("alia.png"), b"first frame").unwrap();

    let phases = |image: &str| {
        json!([{
            "title": "Final",
            "entries": [
                {"handle": {"demozoo_id": f.alia, "name": "Alia"}, "rank": 1, "preview_image": image},
                {"handle": {"demozoo_id": null, "name": "Zed"}, "rank": 2, "preview_image": "missing.png"},
            ],
            "staffs": [],
        }])
    };

    let outcome = f
        .service
        .import_tournament(
            "revision2024.json",
            &parse(results(f.party_id, phases("alia.png"))),
            f.media.path(),
        )
        .await
        .unwrap();
    assert_eq!(outcome, ImportOutcome::Created);

    let phase_id = only_tournament_phases(&f, "revision2024.json").await[0].id;
    let entries = f.store.tournaments().entries(phase_id).await.unwrap();
    let first_digest = file_sha256(&f.media.path().join("alia.png")).await.unwrap();
    assert_eq!(entries[0].original_image_sha256, first_digest);
    assert!(entries[0].screenshot_path.as_deref().is_some_and(|p| p.ends_with("alia.png")));
    assert_eq!(entries[1].screenshot_path, None);
    assert_eq!(entries[1].original_image_sha256, "");

    // Same bytes, nothing to do.
    let outcome = f
        .service
        .import_tournament(
            "revision2024.json",
            &parse(results(f.party_id, phases("alia.png"))),
            f.media.path(),
        )
        .await
        .unwrap();
    assert_eq!(outcome, ImportOutcome::Unchanged);

    std::fs::write(f.media.path().join("alia.png"), b"second frame").unwrap();
    let outcome = f
        .service
        .import_tournament(
            "revision2024.json",
            &parse(results(f.party_id, phases("alia.png"))),
            f.media.path(),
        )
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ImportOutcome::Updated {
            entries_written: 1,
            staff_rewritten: false,
            phases_recreated: false,
        }
    );

    let entries = f.store.tournaments().entries(phase_id).await.unwrap();
    assert_ne!(entries[0].original_image_sha256, first_digest);
    assert_eq!(
        entries[0].original_image_sha256,
        file_sha256(&f.media.path().join("alia.png")).await.unwrap()
    );
}

fn write_json(dir: &Path, name: &str, value: &Value) {
    std::fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

#[tokio::test]
async fn test_directory_import() {
    let f = setup().await;
    let second_party = f.store.parties().create("Evoke 2024").await.unwrap().id;
    let dir = tempfile::tempdir().unwrap();

    write_json(
        dir.path(),
        "a-revision.json",
        &results(f.party_id, three_entry_phase(f.alia, [1, 2, 3])),
    );
    let mut evoke = results(second_party, three_entry_phase(f.alia, [3, 2, 1]));
    evoke["type"] = json!("Live Coding");
    write_json(dir.path(), "b-evoke.json", &evoke);
    write_json(dir.path(), "c-nowhere.json", &results(9999, json!([])));
    std::fs::write(dir.path().join("d-broken.json"), "{ not json").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let summary = f
        .service
        .import_tournament_dir(dir.path(), f.media.path())
        .await
        .unwrap();
    assert_eq!(summary.created, 2);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.unchanged, 0);
    assert_eq!(summary.skipped.len(), 1);
    assert!(summary.skipped[0].0.ends_with("c-nowhere.json"));
    assert_eq!(summary.failed.len(), 1);
    assert!(summary.failed[0].0.ends_with("d-broken.json"));

    let summary = f
        .service
        .import_tournament_dir(dir.path(), f.media.path())
        .await
        .unwrap();
    assert_eq!(summary.created, 0);
    assert_eq!(summary.unchanged, 2);

    let outcome = f
        .service
        .import_tournament_file(&dir.path().join("b-evoke.json"), f.media.path())
        .await
        .unwrap();
    assert_eq!(outcome, ImportOutcome::Unchanged);
}

#[tokio::test]
async fn test_staff_change_rewrites_staff() {
    let f = setup().await;
    let phases = |commentator: &str| {
        json!([{
            "title": "Final",
            "entries": [entry(None, "Zed", 1)],
            "staffs": [{"handle": {"demozoo_id": null, "name": commentator}, "job": "Commentator"}],
        }])
    };

    f.service
        .import_tournament("revision2024.json", &parse(results(f.party_id, phases("Gargaj"))), f.media.path())
        .await
        .unwrap();
    let phase_id = only_tournament_phases(&f, "revision2024.json").await[0].id;
    let entries_before = f.store.tournaments().entries(phase_id).await.unwrap();

    let outcome = f
        .service
        .import_tournament("revision2024.json", &parse(results(f.party_id, phases("Havoc"))), f.media.path())
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ImportOutcome::Updated {
            entries_written: 0,
            staff_rewritten: true,
            phases_recreated: false,
        }
    );

    assert_eq!(only_tournament_phases(&f, "revision2024.json").await[0].id, phase_id);
    assert_eq!(f.store.tournaments().entries(phase_id).await.unwrap(), entries_before);

    let staff = f.store.tournaments().staff(phase_id).await.unwrap();
    assert_eq!(staff.len(), 1);
    assert_eq!(staff[0].name, "Havoc");
    assert_eq!(staff[0].role, "commentary");
}

#[tokio::test]
async fn test_entry_count_change_recreates_entries() {
    let f = setup().await;
    let two = json!([{
        "title": "Final",
        "entries": [entry(Some(f.alia), "Alia", 1), entry(None, "Zed", 2)],
        "staffs": [],
    }]);

    f.service
        .import_tournament("revision2024.json", &parse(results(f.party_id, two)), f.media.path())
        .await
        .unwrap();
    let phase_id = only_tournament_phases(&f, "revision2024.json").await[0].id;

    let outcome = f
        .service
        .import_tournament(
            "revision2024.json",
            &parse(results(f.party_id, three_entry_phase(f.alia, [1, 2, 3]))),
            f.media.path(),
        )
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ImportOutcome::Updated {
            entries_written: 3,
            staff_rewritten: false,
            phases_recreated: false,
        }
    );

    assert_eq!(only_tournament_phases(&f, "revision2024.json").await[0].id, phase_id);
    let entries = f.store.tournaments().entries(phase_id).await.unwrap();
    let positions: Vec<i32> = entries.iter().map(|e| e.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
    assert_eq!(entries[2].name, "Nusan");
}

#[tokio::test]
async fn test_type_change_renames_tournament() {
    let f = setup().await;
    let data = results(f.party_id, three_entry_phase(f.alia, [1, 2, 3]));
    f.service
        .import_tournament("revision2024.json", &parse(data.clone()), f.media.path())
        .await
        .unwrap();
    let before = f
        .store
        .tournaments()
        .find_by_source_file("revision2024.json")
        .await
        .unwrap()
        .unwrap();

    let mut renamed = data;
    renamed["type"] = json!("Live Coding");
    let outcome = f
        .service
        .import_tournament("revision2024.json", &parse(renamed), f.media.path())
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ImportOutcome::Updated {
            entries_written: 0,
            staff_rewritten: false,
            phases_recreated: false,
        }
    );

    let after = f
        .store
        .tournaments()
        .find_by_source_file("revision2024.json")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.name, "Live Coding");
    assert!(
        f.store
            .tournaments()
            .find_by_party_and_name(f.party_id, "Shader Showdown")
            .await
            .unwrap()
            .is_none()
    );
}
