use super::{matching_service, open_store};
use crate::config::Config;
use crate::domain::ReleaserId;
use crate::services::MatchingService;

pub async fn cmd_match_info(config: &Config, releaser_id: i32) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let service = matching_service(&store, config);
    let releaser_id = ReleaserId::new(releaser_id);

    let data = service.get_production_match_data(releaser_id).await?;

    println!("Matched ({}):", data.matched.len());
    println!("{:-<70}", "");
    for pair in &data.matched {
        println!(
            "• [{}] {} ({}) <-> {} ({})",
            pair.local.supertype, pair.local.title, pair.local.url, pair.janeway.title, pair.janeway.url
        );
    }

    println!();
    println!("Unmatched local productions ({}):", data.unmatched_local.len());
    println!("{:-<70}", "");
    for production in &data.unmatched_local {
        println!(
            "• [{}] {} ({})",
            production.supertype, production.title, production.url
        );
    }

    println!();
    println!("Unmatched Janeway releases ({}):", data.unmatched_janeway.len());
    println!("{:-<70}", "");
    for release in &data.unmatched_janeway {
        println!("• [{}] {} ({})", release.supertype, release.title, release.url);
    }

    if let Some(cached) = store.get_match_counts(releaser_id).await? {
        println!();
        println!(
            "Cached counts: matched {}, unmatched local {}, unmatched Janeway {}",
            cached.matched, cached.unmatched_local, cached.unmatched_janeway
        );
    }

    Ok(())
}
