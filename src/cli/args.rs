//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

/// Rebuild complete, contiguous clustering hierarchies from sparse path-style node ids
#[derive(Parser, Debug)]
#[command(name = "hierfix")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Use this config file instead of the layered lookup
    #[arg(short = 'c', long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the complete hierarchy of an instance file
    Build {
        /// Delimited instance file (one instance per line, node id first)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        #[command(flatten)]
        flags: BuildFlags,

        /// Output layout
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Tree)]
        format: OutputFormat,

        /// Write to this file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Build and verify the hierarchy invariants
    Check {
        /// Delimited instance file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        #[command(flatten)]
        flags: BuildFlags,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Switches shared by commands that build a hierarchy.
#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct BuildFlags {
    /// Also fill missing siblings so children are numbered from zero
    #[arg(short, long)]
    pub breadth: bool,

    /// Centroids include all descendant instances
    #[arg(short, long)]
    pub subtree: bool,

    /// Fail instead of creating more than N siblings under one node
    #[arg(long, value_name = "N")]
    pub max_gap: Option<usize>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented tree
    Tree,
    /// One node per line, sorted by id
    List,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show {
        /// Directory whose local config is merged in
        #[arg(value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
    },

    /// Show config paths
    Path,
}
