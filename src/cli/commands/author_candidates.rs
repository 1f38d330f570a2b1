use super::{matching_service, open_store};
use crate::config::Config;
use crate::domain::JanewayId;
use crate::services::MatchingService;

pub async fn cmd_author_candidates(config: &Config, janeway_id: i32) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let service = matching_service(&store, config);

    let candidates = service
        .author_match_candidates(JanewayId::new(janeway_id))
        .await?;

    if candidates.is_empty() {
        println!("No unlinked releasers match Janeway author {janeway_id}.");
        return Ok(());
    }

    let ids: Vec<i32> = candidates.iter().map(|id| id.value()).collect();
    let releasers = store.releasers().get_by_ids(&ids).await?;

    println!(
        "Candidates for Janeway author {janeway_id} ({}):",
        config.janeway.author_url(janeway_id)
    );
    for releaser in releasers {
        let kind = if releaser.is_group { "group" } else { "scener" };
        println!("• {} - {} ({})", releaser.id, releaser.name, kind);
    }

    Ok(())
}
