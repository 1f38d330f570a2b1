use scenematch::config::Config;
use scenematch::db::{NewProduction, Store};
use scenematch::domain::{JanewayId, LinkClass, ProductionId, ReleaserId, Supertype};
use scenematch::services::{
    MatchingError, MatchingService, SeaOrmMatchingService, StoreReleaseImporter,
};
use std::sync::Arc;
use tokio::sync::RwLock;

struct Fixture {
    store: Store,
    service: SeaOrmMatchingService,
    amiga: i32,
    windows: i32,
    tracked_music: i32,
}

async fn setup() -> Fixture {
    let store = Store::in_memory().await.expect("Failed to create store");
    let config = Arc::new(RwLock::new(Config::default()));

    let amiga = store
        .productions()
        .create_platform("Amiga OCS/ECS")
        .await
        .unwrap()
        .id;
    let windows = store.productions().create_platform("Windows").await.unwrap().id;
    let tracked_music = store
        .productions()
        .create_type("Tracked Music", "tracked-music", Supertype::Music)
        .await
        .unwrap()
        .id;

    let importer = Arc::new(StoreReleaseImporter::new(store.clone(), config.clone()));
    let service = SeaOrmMatchingService::new(store.clone(), config, importer);

    Fixture {
        store,
        service,
        amiga,
        windows,
        tracked_music,
    }
}

/// A local scener linked to a Janeway author of the same name. Returns the
/// releaser, its primary nick and the author's name row.
async fn linked_scener(store: &Store, name: &str, janeway_id: i32) -> (ReleaserId, i32, i32) {
    let releaser = store.releasers().create(name, false, "").await.unwrap();
    let nick = store.releasers().primary_nick(releaser.id).await.unwrap().unwrap();
    store
        .releasers()
        .add_external_link(
            releaser.id,
            LinkClass::KestraBitworldAuthor,
            &janeway_id.to_string(),
            "manual",
        )
        .await
        .unwrap();

    let (_, author_name) = store
        .janeway()
        .create_author(JanewayId::new(janeway_id), name, false)
        .await
        .unwrap();

    (ReleaserId::new(releaser.id), nick.id, author_name.id)
}

async fn local_production(
    store: &Store,
    title: &str,
    supertype: Supertype,
    platform_ids: Vec<i32>,
    type_ids: Vec<i32>,
    nick_id: i32,
) -> i32 {
    let mut new = NewProduction::new(title, supertype);
    new.platform_ids = platform_ids;
    new.type_ids = type_ids;
    new.author_nick_ids = vec![nick_id];
    store.productions().create(new).await.unwrap().id
}

async fn janeway_release(
    store: &Store,
    janeway_id: i32,
    title: &str,
    supertype: Supertype,
    name_ids: &[i32],
) {
    let release = store
        .janeway()
        .create_release(JanewayId::new(janeway_id), title, supertype)
        .await
        .unwrap();
    for name_id in name_ids {
        store
            .janeway()
            .add_release_credit(release.id, *name_id)
            .await
            .unwrap();
    }
}

async fn release_link_count(store: &Store, production_id: i32) -> usize {
    store
        .productions()
        .links_for_production(production_id, LinkClass::KestraBitworldRelease)
        .await
        .unwrap()
        .len()
}

#[tokio::test]
async fn test_pondlife_pairs_tracked_music_with_module_title() {
    let f = setup().await;
    let (releaser, nick, name) = linked_scener(&f.store, "Jester", 100).await;

    let pondlife = local_production(
        &f.store,
        "Pondlife",
        Supertype::Production,
        vec![],
        vec![f.tracked_music],
        nick,
    )
    .await;
    janeway_release(&f.store, 900, "Pondlife.mod", Supertype::Music, &[name]).await;

    let data = f.service.get_production_match_data(releaser).await.unwrap();
    assert!(data.matched.is_empty());
    assert_eq!(data.unmatched_local.len(), 1);
    assert_eq!(data.unmatched_local[0].supertype, Supertype::Music);
    assert_eq!(data.unmatched_janeway.len(), 1);

    let result = f.service.automatch_productions(releaser).await.unwrap();
    assert_eq!(
        result.linked,
        vec![(ProductionId::new(pondlife), JanewayId::new(900))]
    );
    assert!(result.imported.is_empty());
    assert_eq!(result.counts.matched, 1);
    assert_eq!(result.counts.unmatched_local, 0);
    assert_eq!(result.counts.unmatched_janeway, 0);

    let links = f
        .store
        .productions()
        .links_for_production(pondlife, LinkClass::KestraBitworldRelease)
        .await
        .unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].parameter, "900");
    assert_eq!(links[0].source, "janeway-automatch");
    assert!(!links[0].is_download_link);

    let cached = f.store.get_match_counts(releaser).await.unwrap().unwrap();
    assert_eq!(cached, result.counts);
}

#[tokio::test]
async fn test_matched_pair_details() {
    let f = setup().await;
    let (releaser, nick, name) = linked_scener(&f.store, "Jester", 100).await;

    let pondlife = local_production(
        &f.store,
        "Pondlife",
        Supertype::Production,
        vec![],
        vec![f.tracked_music],
        nick,
    )
    .await;
    janeway_release(&f.store, 900, "Pondlife.mod", Supertype::Music, &[name]).await;
    f.service.automatch_productions(releaser).await.unwrap();

    let data = f.service.get_production_match_data(releaser).await.unwrap();
    assert_eq!(data.matched.len(), 1);
    assert!(data.unmatched_local.is_empty());
    assert!(data.unmatched_janeway.is_empty());

    let pair = &data.matched[0];
    assert_eq!(pair.local.url, format!("/productions/{pondlife}/"));
    assert_eq!(pair.janeway.title, "Pondlife.mod");
    assert_eq!(
        pair.janeway.url,
        "http://janeway.exotica.org.uk/release.php?id=900"
    );
}

#[tokio::test]
async fn test_link_to_unmirrored_release_uses_placeholder_title() {
    let f = setup().await;
    let (releaser, nick, _) = linked_scener(&f.store, "Jester", 100).await;

    let production = local_production(
        &f.store,
        "Elekfunk",
        Supertype::Production,
        vec![f.amiga],
        vec![],
        nick,
    )
    .await;
    f.store
        .productions()
        .create_link(production, LinkClass::KestraBitworldRelease, "4242", "manual")
        .await
        .unwrap();

    let data = f.service.get_production_match_data(releaser).await.unwrap();
    assert_eq!(data.matched.len(), 1);
    assert_eq!(data.matched[0].janeway.title, "(Janeway release #4242)");
}

#[tokio::test]
async fn test_candidates_respect_platform_scope() {
    let f = setup().await;
    let (releaser, nick, _) = linked_scener(&f.store, "Jester", 100).await;

    local_production(&f.store, "Amiga Demo", Supertype::Production, vec![f.amiga], vec![], nick)
        .await;
    local_production(&f.store, "PC Demo", Supertype::Production, vec![f.windows], vec![], nick)
        .await;
    local_production(&f.store, "Loose Demo", Supertype::Production, vec![], vec![], nick).await;

    let group = f.store.releasers().create("Cryptoburners", true, "").await.unwrap();
    let group_nick = f.store.releasers().primary_nick(group.id).await.unwrap().unwrap();
    let mut affiliated = NewProduction::new("Group Tune", Supertype::Music);
    affiliated.type_ids = vec![f.tracked_music];
    affiliated.author_nick_ids = vec![group_nick.id];
    affiliated.affiliation_nick_ids = vec![nick];
    f.store.productions().create(affiliated).await.unwrap();

    let data = f.service.get_production_match_data(releaser).await.unwrap();
    let titles: Vec<&str> = data
        .unmatched_local
        .iter()
        .map(|p| p.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Amiga Demo", "Group Tune"]);
}

#[tokio::test]
async fn test_no_import_while_local_production_unmatched() {
    let f = setup().await;
    let (releaser, nick, name) = linked_scener(&f.store, "Jester", 100).await;

    local_production(&f.store, "Enigma", Supertype::Production, vec![f.amiga], vec![], nick).await;
    janeway_release(&f.store, 901, "Hardwired", Supertype::Production, &[name]).await;
    janeway_release(&f.store, 902, "Desert Dream", Supertype::Production, &[name]).await;

    let result = f.service.automatch_productions(releaser).await.unwrap();
    assert!(result.linked.is_empty());
    assert!(result.imported.is_empty());
    assert_eq!(result.counts.matched, 0);
    assert_eq!(result.counts.unmatched_local, 1);
    assert_eq!(result.counts.unmatched_janeway, 2);

    let data = f.service.get_production_match_data(releaser).await.unwrap();
    assert_eq!(data.unmatched_local.len(), 1);
    assert_eq!(data.unmatched_janeway.len(), 2);
}

#[tokio::test]
async fn test_ambiguous_titles_are_not_linked() {
    let f = setup().await;
    let (releaser, nick, name) = linked_scener(&f.store, "Jester", 100).await;

    let first =
        local_production(&f.store, "Enigma", Supertype::Production, vec![f.amiga], vec![], nick)
            .await;
    let second =
        local_production(&f.store, "ENIGMA!", Supertype::Production, vec![f.amiga], vec![], nick)
            .await;
    janeway_release(&f.store, 901, "Enigma", Supertype::Production, &[name]).await;

    let result = f.service.automatch_productions(releaser).await.unwrap();
    assert!(result.linked.is_empty());
    assert!(result.imported.is_empty());
    assert_eq!(release_link_count(&f.store, first).await, 0);
    assert_eq!(release_link_count(&f.store, second).await, 0);
}

#[tokio::test]
async fn test_imports_remaining_releases_once_all_local_matched() {
    let f = setup().await;
    let (releaser, nick, name) = linked_scener(&f.store, "Jester", 100).await;

    local_production(&f.store, "Enigma", Supertype::Production, vec![f.amiga], vec![], nick).await;
    janeway_release(&f.store, 901, "Enigma", Supertype::Production, &[name]).await;
    janeway_release(&f.store, 902, "Jesus on E's", Supertype::Production, &[name]).await;

    let result = f.service.automatch_productions(releaser).await.unwrap();
    assert_eq!(result.linked.len(), 1);
    assert_eq!(result.imported.len(), 1);
    assert_eq!(result.counts.matched, 2);
    assert_eq!(result.counts.unmatched_local, 0);
    assert_eq!(result.counts.unmatched_janeway, 0);

    let imported = result.imported[0].value();
    let production = f.store.productions().get(imported).await.unwrap().unwrap();
    assert_eq!(production.title, "Jesus on E's");
    assert_eq!(production.data_source.as_deref(), Some("janeway"));
    assert_eq!(
        f.store.productions().credited_nick_ids(imported).await.unwrap(),
        [nick].into_iter().collect()
    );

    let links = f
        .store
        .productions()
        .links_for_production(imported, LinkClass::KestraBitworldRelease)
        .await
        .unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].parameter, "902");
    assert_eq!(links[0].source, "janeway");

    // The imported production is on the import platform, so it now shows up
    // as a matched candidate.
    let data = f.service.get_production_match_data(releaser).await.unwrap();
    assert_eq!(data.matched.len(), 2);
}

#[tokio::test]
async fn test_automatch_is_idempotent() {
    let f = setup().await;
    let (releaser, nick, name) = linked_scener(&f.store, "Jester", 100).await;

    let enigma =
        local_production(&f.store, "Enigma", Supertype::Production, vec![f.amiga], vec![], nick)
            .await;
    let pondlife = local_production(
        &f.store,
        "Pondlife",
        Supertype::Music,
        vec![],
        vec![f.tracked_music],
        nick,
    )
    .await;
    janeway_release(&f.store, 901, "Enigma", Supertype::Production, &[name]).await;
    janeway_release(&f.store, 903, "mod.pondlife", Supertype::Music, &[name]).await;
    janeway_release(&f.store, 904, "Extension Tune", Supertype::Music, &[name]).await;

    let first = f.service.automatch_productions(releaser).await.unwrap();
    assert_eq!(first.linked.len(), 2);
    assert_eq!(first.imported.len(), 1);

    let second = f.service.automatch_productions(releaser).await.unwrap();
    assert!(second.linked.is_empty());
    assert!(second.imported.is_empty());
    assert_eq!(second.counts, first.counts);

    let imported = first.imported[0].value();
    for production_id in [enigma, pondlife, imported] {
        assert_eq!(release_link_count(&f.store, production_id).await, 1);
    }
}

#[tokio::test]
async fn test_automatch_all_visits_linked_releasers() {
    let f = setup().await;
    let (jester, jester_nick, jester_name) = linked_scener(&f.store, "Jester", 100).await;
    let (lizard, lizard_nick, lizard_name) = linked_scener(&f.store, "Lizardking", 101).await;
    f.store.releasers().create("Unlinked", false, "").await.unwrap();

    local_production(
        &f.store,
        "Stardust Memories",
        Supertype::Production,
        vec![f.amiga],
        vec![],
        jester_nick,
    )
    .await;
    local_production(
        &f.store,
        "Doskpop",
        Supertype::Music,
        vec![],
        vec![f.tracked_music],
        lizard_nick,
    )
    .await;
    janeway_release(&f.store, 910, "Stardust Memories", Supertype::Production, &[jester_name])
        .await;
    janeway_release(&f.store, 911, "doskpop.mod", Supertype::Music, &[lizard_name]).await;

    let results = f.service.automatch_all().await.unwrap();
    let visited: Vec<ReleaserId> = results.iter().map(|r| r.releaser_id).collect();
    assert_eq!(visited, vec![jester, lizard]);
    assert!(results.iter().all(|r| r.linked.len() == 1));
}

#[tokio::test]
async fn test_refresh_and_invalidate_match_info() {
    let f = setup().await;
    let (releaser, nick, name) = linked_scener(&f.store, "Jester", 100).await;

    local_production(&f.store, "Enigma", Supertype::Production, vec![f.amiga], vec![], nick).await;
    janeway_release(&f.store, 901, "Hardwired", Supertype::Production, &[name]).await;

    assert!(f.store.get_match_counts(releaser).await.unwrap().is_none());

    let counts = f.service.refresh_match_info(releaser).await.unwrap();
    assert_eq!(counts.matched, 0);
    assert_eq!(counts.unmatched_local, 1);
    assert_eq!(counts.unmatched_janeway, 1);
    assert_eq!(f.store.get_match_counts(releaser).await.unwrap(), Some(counts));

    // Refreshing never writes links.
    let data = f.service.get_production_match_data(releaser).await.unwrap();
    assert!(data.matched.is_empty());

    assert!(f.service.invalidate_match_info(releaser).await.unwrap());
    assert!(!f.service.invalidate_match_info(releaser).await.unwrap());
    assert!(f.store.get_match_counts(releaser).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unknown_releaser() {
    let f = setup().await;
    let err = f
        .service
        .get_production_match_data(ReleaserId::new(999))
        .await
        .unwrap_err();
    assert!(matches!(err, MatchingError::ReleaserNotFound(id) if id.value() == 999));
}

#[tokio::test]
async fn test_missing_authors_flags_omissions_only() {
    let f = setup().await;
    let (_, jester_nick, jester_name) = linked_scener(&f.store, "Jester", 100).await;
    let (_, _, vinnie_name) = linked_scener(&f.store, "Vinnie", 200).await;
    let (_, lizard_nick, _) = linked_scener(&f.store, "Lizardking", 300).await;

    // Janeway credits Jester and Vinnie, the local entry only Jester.
    let missing = local_production(
        &f.store,
        "Duet",
        Supertype::Production,
        vec![f.amiga],
        vec![],
        jester_nick,
    )
    .await;
    janeway_release(&f.store, 920, "Duet", Supertype::Production, &[jester_name, vinnie_name])
        .await;
    f.store
        .productions()
        .create_link(missing, LinkClass::KestraBitworldRelease, "920", "manual")
        .await
        .unwrap();

    // The local entry credits an extra author that Janeway doesn't.
    let extra = local_production(
        &f.store,
        "Solo",
        Supertype::Production,
        vec![f.amiga],
        vec![],
        jester_nick,
    )
    .await;
    f.store
        .productions()
        .add_affiliation_nick(extra, lizard_nick)
        .await
        .unwrap();
    janeway_release(&f.store, 921, "Solo", Supertype::Production, &[jester_name]).await;
    f.store
        .productions()
        .create_link(extra, LinkClass::KestraBitworldRelease, "921", "manual")
        .await
        .unwrap();

    let report = f
        .service
        .productions_with_missing_janeway_authors()
        .await
        .unwrap();
    assert_eq!(report.production_ids, vec![ProductionId::new(missing)]);
    assert_eq!(
        report.missing_author_ids,
        [JanewayId::new(200)].into_iter().collect()
    );
}

#[tokio::test]
async fn test_author_match_candidates() {
    let f = setup().await;
    let (author, name) = f
        .store
        .janeway()
        .create_author(JanewayId::new(300), "Tip", false)
        .await
        .unwrap();
    f.store.janeway().add_name(author.id, "T.I.P.").await.unwrap();
    assert_eq!(name.name, "Tip");

    let by_name = f.store.releasers().create("tip", false, "").await.unwrap();

    let by_variant = f.store.releasers().create("Thomas", false, "").await.unwrap();
    let thomas_nick = f
        .store
        .releasers()
        .primary_nick(by_variant.id)
        .await
        .unwrap()
        .unwrap();
    f.store
        .releasers()
        .add_nick_variant(thomas_nick.id, "TIP")
        .await
        .unwrap();

    // Wrong kind.
    f.store.releasers().create("Tip", true, "").await.unwrap();

    let already_linked = f.store.releasers().create("Tip", false, "").await.unwrap();
    f.store
        .releasers()
        .add_external_link(
            already_linked.id,
            LinkClass::KestraBitworldAuthor,
            "300",
            "manual",
        )
        .await
        .unwrap();

    let candidates = f
        .service
        .author_match_candidates(JanewayId::new(300))
        .await
        .unwrap();
    assert_eq!(
        candidates,
        vec![ReleaserId::new(by_name.id), ReleaserId::new(by_variant.id)]
    );

    let err = f
        .service
        .author_match_candidates(JanewayId::new(301))
        .await
        .unwrap_err();
    assert!(matches!(err, MatchingError::JanewayAuthorNotFound(_)));
}

#[tokio::test]
async fn test_duplicate_link_is_rejected_by_storage() {
    let f = setup().await;
    let (_, nick, _) = linked_scener(&f.store, "Jester", 100).await;
    let production =
        local_production(&f.store, "Enigma", Supertype::Production, vec![f.amiga], vec![], nick)
            .await;

    f.store
        .productions()
        .create_link(production, LinkClass::KestraBitworldRelease, "901", "manual")
        .await
        .unwrap();
    let err = f
        .store
        .productions()
        .create_link(production, LinkClass::KestraBitworldRelease, "901", "manual")
        .await
        .unwrap_err();
    assert!(matches!(
        err.sql_err(),
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    ));

    let fatal = MatchingError::DuplicateCrossLink {
        production_id: ProductionId::new(production),
        parameter: "901".to_string(),
    };
    assert!(fatal.is_fatal());
    assert!(fatal.to_string().contains(&production.to_string()));
}

#[tokio::test]
async fn test_non_numeric_release_link_is_rejected() {
    let f = setup().await;
    let (releaser, nick, _) = linked_scener(&f.store, "Jester", 100).await;

    let production =
        local_production(&f.store, "Enigma", Supertype::Production, vec![f.amiga], vec![], nick)
            .await;
    f.store
        .productions()
        .create_link(production, LinkClass::KestraBitworldRelease, "abc", "manual")
        .await
        .unwrap();

    let err = f
        .service
        .get_production_match_data(releaser)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MatchingError::InvalidLinkParameter { production_id, ref parameter }
            if production_id == ProductionId::new(production) && parameter == "abc"
    ));
    assert!(err.is_fatal());

    // Automatch refuses to run on top of it.
    assert!(f.service.automatch_productions(releaser).await.is_err());
    assert!(f.store.get_match_counts(releaser).await.unwrap().is_none());
}

#[tokio::test]
async fn test_affiliation_covers_janeway_author() {
    let f = setup().await;
    let (_, jester_nick, jester_name) = linked_scener(&f.store, "Jester", 100).await;

    let group = f.store.releasers().create("Cryptoburners", true, "").await.unwrap();
    let group_nick = f.store.releasers().primary_nick(group.id).await.unwrap().unwrap();
    f.store
        .releasers()
        .add_external_link(group.id, LinkClass::KestraBitworldAuthor, "500", "manual")
        .await
        .unwrap();
    let (_, group_name) = f
        .store
        .janeway()
        .create_author(JanewayId::new(500), "Cryptoburners", true)
        .await
        .unwrap();

    // The group is credited locally through the affiliation only.
    let covered = local_production(
        &f.store,
        "Jesterday",
        Supertype::Production,
        vec![f.amiga],
        vec![],
        jester_nick,
    )
    .await;
    f.store
        .productions()
        .add_affiliation_nick(covered, group_nick.id)
        .await
        .unwrap();
    janeway_release(&f.store, 930, "Jesterday", Supertype::Production, &[jester_name, group_name.id])
        .await;
    f.store
        .productions()
        .create_link(covered, LinkClass::KestraBitworldRelease, "930", "manual")
        .await
        .unwrap();

    let uncovered = local_production(
        &f.store,
        "Hoi",
        Supertype::Production,
        vec![f.amiga],
        vec![],
        jester_nick,
    )
    .await;
    janeway_release(&f.store, 931, "Hoi", Supertype::Production, &[jester_name, group_name.id]).await;
    f.store
        .productions()
        .create_link(uncovered, LinkClass::KestraBitworldRelease, "931", "manual")
        .await
        .unwrap();

    let report = f
        .service
        .productions_with_missing_janeway_authors()
        .await
        .unwrap();
    assert_eq!(report.production_ids, vec![ProductionId::new(uncovered)]);
    assert_eq!(
        report.missing_author_ids,
        [JanewayId::new(500)].into_iter().collect()
    );
}

#[tokio::test]
async fn test_import_credits_nick_by_variant() {
    let f = setup().await;
    let (releaser, nick, jester_name) = linked_scener(&f.store, "Jester", 100).await;

    let other_nick = f
        .store
        .releasers()
        .add_nick(releaser.value(), "Yester", false)
        .await
        .unwrap();
    f.store
        .releasers()
        .add_nick_variant(other_nick.id, "Jes")
        .await
        .unwrap();

    let author = f
        .store
        .janeway()
        .author_by_janeway_id(JanewayId::new(100))
        .await
        .unwrap()
        .unwrap();
    let jes_name = f.store.janeway().add_name(author.id, "JES").await.unwrap();

    local_production(&f.store, "Enigma", Supertype::Production, vec![f.amiga], vec![], nick).await;
    janeway_release(&f.store, 901, "Enigma", Supertype::Production, &[jester_name]).await;
    janeway_release(&f.store, 902, "Jesus on E's", Supertype::Production, &[jes_name.id]).await;

    let result = f.service.automatch_productions(releaser).await.unwrap();
    assert_eq!(result.imported.len(), 1);
    assert_eq!(
        f.store
            .productions()
            .credited_nick_ids(result.imported[0].value())
            .await
            .unwrap(),
        [other_nick.id].into_iter().collect()
    );
}
