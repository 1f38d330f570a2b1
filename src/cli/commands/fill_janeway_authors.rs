//! Report on productions whose Janeway release credits authors that the local
//! entry is missing. Read only; the report drives manual curation.

use super::{matching_service, open_store};
use crate::config::Config;
use crate::constants::{data_source, edits};
use crate::db::Store;
use crate::domain::{JanewayId, LinkClass};
use crate::services::{MatchingService, MissingAuthorsReport};

#[derive(Debug, Default, PartialEq, Eq)]
struct CreditLine {
    name: String,
    linked_releasers: usize,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ProductionLines {
    id: i32,
    title: String,
    edited: bool,
    credits: Vec<CreditLine>,
}

#[derive(Debug, Default)]
struct FillAuthorsSummary {
    production_count: usize,
    author_count: usize,
    from_janeway: usize,
    edited: usize,
    authorless: usize,
    productions: Vec<ProductionLines>,
}

async fn build_summary(
    store: &Store,
    report: &MissingAuthorsReport,
) -> anyhow::Result<FillAuthorsSummary> {
    let ids: Vec<i32> = report.production_ids.iter().map(|id| id.value()).collect();
    let productions = store.productions();

    let edited_ids = productions
        .ids_with_edit(&ids, edits::EDIT_PRODUCTION_CORE_DETAILS)
        .await?;

    let mut summary = FillAuthorsSummary {
        production_count: ids.len(),
        author_count: report.missing_author_ids.len(),
        from_janeway: productions
            .count_with_data_source(&ids, data_source::JANEWAY)
            .await?,
        edited: edited_ids.len(),
        authorless: productions.count_authorless(&ids).await?,
        productions: Vec::new(),
    };

    for production in productions.get_by_ids(&ids).await? {
        let mut lines = ProductionLines {
            id: production.id,
            title: production.title.clone(),
            edited: edited_ids.contains(&production.id),
            credits: Vec::new(),
        };

        if !lines.edited {
            let release_ids: Vec<JanewayId> = productions
                .links_for_production(production.id, LinkClass::KestraBitworldRelease)
                .await?
                .iter()
                .filter_map(|link| JanewayId::from_parameter(&link.parameter))
                .collect();

            for release in store.janeway().releases_by_janeway_ids(&release_ids).await? {
                for credit in store.janeway().release_author_credits(release.id).await? {
                    let linked = store
                        .releasers()
                        .releaser_ids_linked_to(
                            LinkClass::KestraBitworldAuthor,
                            &credit.author_janeway_id.to_parameter(),
                        )
                        .await?;
                    lines.credits.push(CreditLine {
                        name: credit.name,
                        linked_releasers: linked.len(),
                    });
                }
            }
        }

        summary.productions.push(lines);
    }

    Ok(summary)
}

pub async fn cmd_fill_janeway_authors(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let service = matching_service(&store, config);

    let report = service.productions_with_missing_janeway_authors().await?;
    let summary = build_summary(&store, &report).await?;

    println!(
        "{} prods with missing authors known from Janeway",
        summary.production_count
    );
    println!("{} different authors among them", summary.author_count);
    println!("{} originated from Janeway", summary.from_janeway);
    println!("{} have had edits", summary.edited);
    println!("{} have no local authors", summary.authorless);

    for production in &summary.productions {
        println!("Checking prod {}: {}", production.id, production.title);
        if production.edited {
            println!("Has had edits - skipping");
            continue;
        }
        for credit in &production.credits {
            println!(
                "\t{} - {} local releasers",
                credit.name, credit.linked_releasers
            );
        }
    }

    Ok(())
}
