//! vibery kit - create, edit and inspect kits

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::app::AppContext;
use crate::cli::colors::Tone;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::core::catalog::parse_batch_definitions;
use crate::core::{ContentKind, KitManifest, MatchMode};
use crate::error::{Result, VbError};

#[derive(Args, Debug)]
pub struct KitArgs {
    #[command(subcommand)]
    pub action: KitCommand,
}

#[derive(Subcommand, Debug)]
pub enum KitCommand {
    /// Scaffold an empty kit
    Create {
        /// Kit id (lowercase letters, digits, dashes)
        id: String,
    },

    /// Copy a skill or template into a kit
    Add { kit: String, item: String },

    /// Remove matching items from a kit
    Remove {
        kit: String,
        item: String,

        /// Match the full reference or its stem instead of any substring
        #[arg(long)]
        exact: bool,
    },

    /// List kits, or show one kit in full
    List { id: Option<String> },

    /// Create kits from a YAML or JSON definitions file
    Batch { file: PathBuf },
}

pub fn run(ctx: &AppContext, args: &KitArgs) -> Result<()> {
    match &args.action {
        KitCommand::Create { id } => create(ctx, id),
        KitCommand::Add { kit, item } => add(ctx, kit, item),
        KitCommand::Remove { kit, item, exact } => {
            let mode = if *exact {
                MatchMode::Exact
            } else {
                MatchMode::Substring
            };
            remove(ctx, kit, item, mode)
        }
        KitCommand::List { id: None } => list(ctx),
        KitCommand::List { id: Some(id) } => show(ctx, id),
        KitCommand::Batch { file } => batch(ctx, file),
    }
}

fn create(ctx: &AppContext, id: &str) -> Result<()> {
    let report = ctx.catalog().create(id)?;
    if ctx.is_robot() {
        return emit_json(&robot_ok(&report, ctx.dry_run));
    }

    let mut layout = HumanLayout::new();
    layout.status(
        Tone::Success,
        &format!("created kit {}", ctx.paths.relative(&report.path)),
    );
    layout.section("Next steps");
    layout.hint(&format!("vibery kit add {id} <template>"));
    layout.hint(&format!("edit {}/kit.json", ctx.paths.relative(&report.path)));
    layout.dry_run_banner(ctx.dry_run);
    emit_human(layout);
    Ok(())
}

fn add(ctx: &AppContext, kit: &str, item: &str) -> Result<()> {
    let report = ctx.catalog().add(kit, item)?;
    if ctx.is_robot() {
        return emit_json(&robot_ok(&report, ctx.dry_run));
    }

    let mut layout = HumanLayout::new();
    layout.status(
        Tone::Success,
        &format!("added {}: {} to {kit}", report.kind.singular(), report.reference),
    );
    if !report.newly_listed {
        layout.status(Tone::Info, "already listed; copy refreshed");
    }
    layout.dry_run_banner(ctx.dry_run);
    emit_human(layout);
    Ok(())
}

fn remove(ctx: &AppContext, kit: &str, item: &str, mode: MatchMode) -> Result<()> {
    let report = ctx.catalog().remove(kit, item, mode)?;
    if ctx.is_robot() {
        return emit_json(&robot_ok(&report, ctx.dry_run));
    }

    let mut layout = HumanLayout::new();
    if report.is_empty() {
        layout.status(Tone::Warning, &format!("{item} not found in {kit}"));
    }
    for removed in &report.removed {
        layout.status(
            Tone::Success,
            &format!("removed {}: {}", removed.kind.singular(), removed.reference),
        );
    }
    layout.dry_run_banner(ctx.dry_run);
    emit_human(layout);
    Ok(())
}

fn list(ctx: &AppContext) -> Result<()> {
    let kits = ctx.catalog().list()?;
    if ctx.is_robot() {
        return emit_json(&robot_ok(&kits, ctx.dry_run));
    }

    let mut layout = HumanLayout::new();
    layout.title("Kits");
    if kits.is_empty() {
        layout.status(Tone::Warning, "no kits found");
        layout.hint("vibery kit create <name>");
    }
    for kit in &kits {
        layout.push_line(format!("{} v{} ({} items)", kit.id, kit.version, kit.items));
        if !kit.description.is_empty() {
            layout.push_line(format!("    {}", crate::utils::truncate_string(&kit.description, 60)));
        }
    }
    emit_human(layout);
    Ok(())
}

fn show(ctx: &AppContext, id: &str) -> Result<()> {
    let manifest = ctx.catalog().show(id)?;
    if ctx.is_robot() {
        return emit_json(&robot_ok(&manifest, ctx.dry_run));
    }
    emit_human(manifest_layout(&manifest));
    Ok(())
}

fn manifest_layout(manifest: &KitManifest) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout.title(&format!("{} ({})", manifest.name, manifest.id));
    layout.kv("Version", &manifest.version);
    layout.kv("Category", &manifest.category);
    layout.kv("Description", &manifest.description);
    if !manifest.tags.is_empty() {
        layout.kv("Tags", &manifest.tags.join(", "));
    }
    if !manifest.composable.is_empty() {
        layout.kv("Composable", &manifest.composable.join(", "));
    }
    layout.section("Contents");
    for kind in ContentKind::ALL {
        let items = manifest.contents.get(kind);
        if items.is_empty() {
            continue;
        }
        layout.push_line(format!("  {kind} ({})", items.len()));
        for item in items {
            layout.bullet(item);
        }
    }
    if manifest.contents.is_empty() {
        layout.bullet("(empty)");
    }
    layout
}

fn batch(ctx: &AppContext, file: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .map_err(|err| VbError::SourceNotFound(format!("{}: {err}", file.display())))?;
    let definitions = parse_batch_definitions(&raw)?;
    let outcomes = ctx.catalog().batch(&definitions)?;

    if ctx.is_robot() {
        return emit_json(&robot_ok(&outcomes, ctx.dry_run));
    }

    let mut layout = HumanLayout::new();
    layout.title("Batch create");
    for outcome in &outcomes {
        if outcome.created {
            layout.status(
                Tone::Success,
                &format!("{}: {} items", outcome.id, outcome.items),
            );
        } else {
            layout.status(Tone::Warning, &format!("{}: exists, skipped", outcome.id));
        }
        if !outcome.missing.is_empty() {
            layout.bullet(&format!("missing: {}", outcome.missing.join(", ")));
        }
    }
    let created = outcomes.iter().filter(|o| o.created).count();
    layout.section(&format!("Created {created} kits"));
    layout.dry_run_banner(ctx.dry_run);
    emit_human(layout);
    Ok(())
}
