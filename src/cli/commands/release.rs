//! vibery release - build tarballs and dist/registry.json

use clap::Args;
use serde_json::Value;

use crate::app::AppContext;
use crate::bundler::ReleaseBuilder;
use crate::cli::colors::Tone;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::error::Result;
use crate::utils::{format_size, read_optional};

const FALLBACK_VERSION: &str = "0.0.0";

#[derive(Args, Debug, Default)]
pub struct ReleaseArgs {
    /// Registry version; defaults to the CLI package.json version
    #[arg(long = "release-version", value_name = "VERSION")]
    pub release_version: Option<String>,
}

pub fn run(ctx: &AppContext, args: &ReleaseArgs) -> Result<()> {
    let version = match &args.release_version {
        Some(version) => version.clone(),
        None => package_version(ctx)?,
    };
    let builder = ReleaseBuilder {
        templates_dir: ctx.paths.templates.clone(),
        skills_dir: ctx.paths.skills.clone(),
        dist_dir: ctx.paths.dist.clone(),
        template_types: ctx.config.publish.template_types.clone(),
        version,
        base_url: ctx.config.sync.release_base_url.clone(),
    };
    let registry = builder.build(ctx.dry_run)?;

    if ctx.is_robot() {
        return emit_json(&robot_ok(&registry, ctx.dry_run));
    }

    let mut layout = HumanLayout::new();
    layout.title("Release assets");
    for entry in &registry.templates {
        layout.bullet(&format!("{} ({})", entry.archive, format_size(entry.size)));
    }
    layout.status(
        Tone::Success,
        &format!(
            "registry.json v{} with {} templates in {}",
            registry.version,
            registry.templates.len(),
            ctx.paths.relative(&ctx.paths.dist)
        ),
    );
    layout.dry_run_banner(ctx.dry_run);
    emit_human(layout);
    Ok(())
}

/// `version` from `<cli>/package.json`.
fn package_version(ctx: &AppContext) -> Result<String> {
    let Some(raw) = read_optional(ctx.paths.cli.join("package.json"))? else {
        return Ok(FALLBACK_VERSION.to_string());
    };
    let package: Value = serde_json::from_str(&raw)?;
    Ok(package
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or(FALLBACK_VERSION)
        .to_string())
}
