//! Command-line interface.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

pub mod colors;
pub mod commands;
pub mod output;

pub use output::OutputFormat;

/// vibery - manage the template and kit catalog
#[derive(Parser, Debug)]
#[command(name = "vibery", version, about, propagate_version = true)]
pub struct Cli {
    /// Report what would change without writing files or running external tools
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Explicit config file
    #[arg(long, global = true, env = "VIBERY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    #[must_use]
    pub const fn output_format(&self) -> OutputFormat {
        if self.robot {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pull, scaffold and list templates
    Template(commands::template::TemplateArgs),

    /// Create and edit kits
    Kit(commands::kit::KitArgs),

    /// Regenerate registries, kit zips and website data
    Sync(commands::sync::SyncArgs),

    /// Push templates and deploy the website
    Publish(commands::publish::PublishArgs),

    /// Sync, then publish
    Deploy(commands::publish::PublishArgs),

    /// Check kit manifests against their files
    Validate(commands::validate::ValidateArgs),

    /// Build release tarballs and dist/registry.json
    Release(commands::release::ReleaseArgs),
}
