//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

pub mod kit;
pub mod publish;
pub mod release;
pub mod sync;
pub mod template;
pub mod validate;

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Template(args) => template::run(ctx, args),
        Commands::Kit(args) => kit::run(ctx, args),
        Commands::Sync(args) => sync::run(ctx, args),
        Commands::Publish(args) => publish::run(ctx, args),
        Commands::Deploy(args) => publish::run_deploy(ctx, args),
        Commands::Validate(args) => validate::run(ctx, args),
        Commands::Release(args) => release::run(ctx, args),
    }
}
