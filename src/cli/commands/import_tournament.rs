use super::open_store;
use anyhow::Context;
use crate::config::Config;
use crate::services::{ImportOutcome, SeaOrmTournamentService, TournamentImportService};
use std::path::{Path, PathBuf};

pub async fn cmd_import_tournament(
    config: &Config,
    path: &str,
    media: Option<&str>,
) -> anyhow::Result<()> {
    let import_path = Path::new(path);

    if !import_path.exists() {
        anyhow::bail!("Path does not exist: {path}");
    }

    let media_path =
        PathBuf::from(media.unwrap_or(config.tournaments.media_path.as_str()));

    let store = open_store(config).await?;
    let service = SeaOrmTournamentService::new(store);

    if import_path.is_file() {
        let outcome = service
            .import_tournament_file(import_path, &media_path)
            .await
            .with_context(|| format!("{path}: import failed"))?;
        print_outcome(path, &outcome);
        return Ok(());
    }

    let summary = service
        .import_tournament_dir(import_path, &media_path)
        .await?;

    for (file, reason) in &summary.skipped {
        println!("{file}: skipped - {reason}");
    }
    for (file, error) in &summary.failed {
        println!("{file}: failed - {error}");
    }

    println!("{:-<70}", "");
    println!(
        "{} created, {} updated, {} unchanged, {} skipped, {} failed",
        summary.created,
        summary.updated,
        summary.unchanged,
        summary.skipped.len(),
        summary.failed.len()
    );

    if !summary.failed.is_empty() {
        anyhow::bail!("{} of the files in {path} failed to import", summary.failed.len());
    }

    Ok(())
}

fn print_outcome(path: &str, outcome: &ImportOutcome) {
    match outcome {
        ImportOutcome::Created => println!("{path}: created"),
        ImportOutcome::Updated {
            entries_written,
            staff_rewritten,
            phases_recreated,
        } => println!(
            "{path}: updated ({entries_written} entries written, staff rewritten: {staff_rewritten}, phases recreated: {phases_recreated})"
        ),
        ImportOutcome::Unchanged => println!("{path}: unchanged"),
        ImportOutcome::Skipped { reason } => println!("{path}: skipped - {reason}"),
    }
}
