//! vibery sync - regenerate registries, kit zips and website data

use clap::Args;

use crate::app::AppContext;
use crate::cli::colors::Tone;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::error::Result;
use crate::registry::{RegistryGenerator, SyncReport};

#[derive(Args, Debug, Default)]
pub struct SyncArgs {}

pub fn run(ctx: &AppContext, _args: &SyncArgs) -> Result<()> {
    let report = sync(ctx)?;
    if ctx.is_robot() {
        return emit_json(&robot_ok(&report, ctx.dry_run));
    }
    emit_human(report_layout(&report));
    Ok(())
}

/// Run every registry pass with the context's settings.
pub fn sync(ctx: &AppContext) -> Result<SyncReport> {
    RegistryGenerator::new(&ctx.paths, ctx.config.sync.download_base.clone())
        .with_dry_run(ctx.dry_run)
        .sync()
}

pub(crate) fn report_layout(report: &SyncReport) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout.title("Sync");
    layout.kv("Templates", &report.templates.len().to_string());
    layout.kv("Kits", &format!("{} ({} items)", report.kits.len(), report.kit_items));
    layout.kv("ZIPs", &report.zips.len().to_string());
    layout.kv("Website kits", &report.website_kits.to_string());
    layout.status(
        Tone::Success,
        &format!("sync complete: {} items updated", report.total()),
    );

    layout.section("Generated files");
    for path in &report.generated {
        layout.bullet(path);
    }
    layout.status(
        Tone::Warning,
        "website templates.json is owned by a separate sync script; run it separately",
    );
    layout.section("Next steps");
    layout.hint("vibery publish");
    layout.dry_run_banner(report.dry_run);
    layout
}
