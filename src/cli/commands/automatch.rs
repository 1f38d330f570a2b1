use super::{matching_service, open_store};
use crate::config::Config;
use crate::domain::ReleaserId;
use crate::services::{AutomatchResult, MatchingService};

fn print_result(result: &AutomatchResult) {
    println!(
        "Releaser {}: {} linked, {} imported | matched {}, unmatched local {}, unmatched Janeway {}",
        result.releaser_id,
        result.linked.len(),
        result.imported.len(),
        result.counts.matched,
        result.counts.unmatched_local,
        result.counts.unmatched_janeway
    );
    for (production_id, janeway_id) in &result.linked {
        println!("  linked production {production_id} -> Janeway release {janeway_id}");
    }
    for production_id in &result.imported {
        println!("  imported production {production_id}");
    }
}

pub async fn cmd_automatch(config: &Config, releaser_id: i32) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let service = matching_service(&store, config);

    let result = service
        .automatch_productions(ReleaserId::new(releaser_id))
        .await?;
    print_result(&result);

    Ok(())
}

pub async fn cmd_automatch_all(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let service = matching_service(&store, config);

    let results = service.automatch_all().await?;
    if results.is_empty() {
        println!("No releasers are linked to Janeway authors.");
        return Ok(());
    }

    for result in &results {
        print_result(result);
    }

    let linked: usize = results.iter().map(|r| r.linked.len()).sum();
    let imported: usize = results.iter().map(|r| r.imported.len()).sum();
    println!("{:-<70}", "");
    println!(
        "{} releasers processed, {} links created, {} productions imported",
        results.len(),
        linked,
        imported
    );

    Ok(())
}
