pub mod cli;
pub mod config;
pub mod constants;
pub mod db;
pub mod domain;
pub mod entities;
pub mod parser;
pub mod services;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
pub use config::Config;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Some(Commands::Init)) {
        if Config::create_default_if_missing()? {
            println!("✓ Config file created. Edit config.toml and run again.");
        } else {
            println!("config.toml already exists.");
        }
        return Ok(());
    }

    let config = Config::load()?;
    config.validate()?;

    let loki = init_tracing(&config)?;

    let result = match cli.command {
        Some(command) => dispatch(&config, command).await,
        None => {
            use clap::CommandFactory;
            Cli::command().print_help().map_err(Into::into)
        }
    };
    if let Err(e) = &result {
        error!("{:#}", e);
    }

    // Queued log events are sent before exiting, including the error above.
    if let Some(loki) = loki {
        loki.flush().await;
    }

    result
}

async fn dispatch(config: &Config, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Automatch { all: true, .. } => cli::cmd_automatch_all(config).await,
        Commands::Automatch {
            releaser_id: Some(id),
            ..
        } => cli::cmd_automatch(config, id).await,
        Commands::Automatch { .. } => {
            println!("Usage: scenematch automatch <releaser_id> | --all");
            Ok(())
        }
        Commands::MatchInfo { releaser_id } => cli::cmd_match_info(config, releaser_id).await,
        Commands::AuthorCandidates { janeway_id } => {
            cli::cmd_author_candidates(config, janeway_id).await
        }
        Commands::FillJanewayAuthors => cli::cmd_fill_janeway_authors(config).await,
        Commands::ImportTournament { path, media } => {
            cli::cmd_import_tournament(config, &path, media.as_deref()).await
        }
        Commands::InvalidateMatchInfo { releaser_id } => {
            cli::cmd_invalidate_match_info(config, releaser_id).await
        }
        Commands::Init => Ok(()),
    }
}

/// Background Loki sender of a batch run.
struct LokiShipper {
    controller: tracing_loki::BackgroundTaskController,
    task: tokio::task::JoinHandle<()>,
}

impl LokiShipper {
    async fn flush(self) {
        self.controller.shutdown().await;
        if let Err(e) = self.task.await {
            eprintln!("Loki log shipping stopped abnormally: {e}");
        }
    }
}

fn init_tracing(config: &Config) -> anyhow::Result<Option<LokiShipper>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if !config.observability.loki_enabled {
        registry.init();
        return Ok(None);
    }

    let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

    let mut builder = tracing_loki::builder();
    for (key, value) in &config.observability.loki_labels {
        builder = builder.label(key.as_str(), value.as_str())?;
    }
    let (layer, controller, task) = builder.build_controller_url(url)?;
    let task = tokio::spawn(task);

    registry.with(layer).init();
    info!(
        "Loki logging initialized at {}",
        config.observability.loki_url
    );

    Ok(Some(LokiShipper { controller, task }))
}
