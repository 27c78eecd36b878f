//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Composite order calculator: delivery, tax and discount over nested boxes of goods
#[derive(Parser, Debug)]
#[command(name = "cartcalc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Local config file (default: ./.cartcalc.toml if present)
    #[arg(short, long, global = true, env = "CARTCALC_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the calculations over an order file
    Calc {
        /// Order description (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        order: PathBuf,
        /// Only run these visitors (delivery, tax, discount)
        #[arg(short, long, value_delimiter = ',')]
        only: Vec<String>,
    },

    /// Show an order as a tree with its totals
    Tree {
        /// Order description (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        order: PathBuf,
    },

    /// Run the calculations over the built-in sample order
    Demo {
        /// Only run these visitors (delivery, tax, discount)
        #[arg(short, long, value_delimiter = ',')]
        only: Vec<String>,
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

    /// Create config template
    Init {
        /// Create global config instead of ./.cartcalc.toml
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
