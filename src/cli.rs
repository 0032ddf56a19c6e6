use crate::models::CareKind;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "plantcare", version, about = "Houseplant care tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the plant data file
    #[arg(short, long)]
    pub data_file: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Bind address, overrides config
        #[arg(long)]
        host: Option<String>,
        /// Port, overrides config
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show every tracked plant
    List,
    /// Check which plants are due and notify the owner
    Due {
        #[arg(value_enum)]
        kind: CareTarget,
        /// Evaluate as of YYYY-MM-DD instead of today
        #[arg(long)]
        date: Option<String>,
    },
    /// Start tracking a plant
    Add {
        name: String,
        /// Days between waterings
        #[arg(long)]
        water_every: Option<u32>,
        /// Days between fertilizing
        #[arg(long)]
        fertilize_every: Option<u32>,
    },
    /// Record a watering
    Water {
        name: String,
        /// Date watered (YYYY-MM-DD), defaults to today
        #[arg(long)]
        on: Option<String>,
    },
    /// Record a fertilizing
    Fertilize {
        name: String,
        /// Date fertilized (YYYY-MM-DD), defaults to today
        #[arg(long)]
        on: Option<String>,
    },
    /// Interactive setup
    Init,
    /// Validate config and test the mail connection
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CareTarget {
    Water,
    Fertilizer,
}

impl From<CareTarget> for CareKind {
    fn from(target: CareTarget) -> Self {
        match target {
            CareTarget::Water => CareKind::Water,
            CareTarget::Fertilizer => CareKind::Fertilize,
        }
    }
}
