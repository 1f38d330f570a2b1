//! CLI module - Command-line interface for scenematch
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// scenematch - reconciles a demoscene archive with Janeway and tournament results
#[derive(Parser)]
#[command(name = "scenematch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Link and import Janeway releases for a releaser
    #[command(alias = "am")]
    Automatch {
        /// Releaser ID
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        releaser_id: Option<i32>,
        /// Run for every releaser linked to a Janeway author
        #[arg(long)]
        all: bool,
    },

    /// Show matched and unmatched productions for a releaser
    #[command(alias = "mi")]
    MatchInfo {
        /// Releaser ID
        releaser_id: i32,
    },

    /// List local releasers that look like a Janeway author
    AuthorCandidates {
        /// Janeway author ID
        janeway_id: i32,
    },

    /// Report productions missing authors known from Janeway
    FillJanewayAuthors,

    /// Import a tournament results file or a directory of them
    #[command(alias = "it")]
    ImportTournament {
        /// Results file or directory
        path: String,
        /// Directory holding preview images
        #[arg(long)]
        media: Option<String>,
    },

    /// Drop the cached match counts for a releaser
    InvalidateMatchInfo {
        /// Releaser ID
        releaser_id: i32,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
