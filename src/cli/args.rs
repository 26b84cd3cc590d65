//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::NonLargestPick;

/// Gift-exchange circle allocation: fair country interleaving, overflow rejects and cross re-homing
#[derive(Parser, Debug)]
#[command(name = "giftcircle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Tube to draw from when the largest country would repeat (overrides config)
    #[arg(long, value_enum, global = true)]
    pub pick: Option<PickArg>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickArg {
    SecondLargest,
    FirstAvailable,
}

impl From<PickArg> for NonLargestPick {
    fn from(value: PickArg) -> Self {
        match value {
            PickArg::SecondLargest => NonLargestPick::SecondLargest,
            PickArg::FirstAvailable => NonLargestPick::FirstAvailable,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Allocate a roster to gift circles
    Allocate {
        /// Roster file (.toml or `id, country, I|D` lines; default: config `roster`)
        #[arg(value_hint = ValueHint::FilePath)]
        roster: Option<PathBuf>,
        /// Render circles as a tree
        #[arg(long)]
        tree: bool,
        /// Omit circles without links
        #[arg(long)]
        hide_empty: bool,
    },

    /// Allocate the built-in sample roster
    Demo {
        /// Render circles as a tree
        #[arg(long)]
        tree: bool,
    },

    /// Interleave the characters of a string, keyed by character
    Interleave {
        /// Items, e.g. aXaaaaa
        items: String,
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

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Print config template
    Template,

    /// Create global config from template
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}
