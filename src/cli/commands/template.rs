//! vibery template - pull, scaffold and list templates

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::colors::Tone;
use crate::cli::output::{HumanLayout, emit_human, emit_json, preview, robot_ok};
use crate::core::asset::{file_name, file_stem};
use crate::error::{Result, VbError};
use crate::import::{ImportedAsset, Importer, Source};

const PULL_PREVIEW: usize = 5;
const LIST_PREVIEW: usize = 10;

#[derive(Args, Debug)]
pub struct TemplateArgs {
    #[command(subcommand)]
    pub action: TemplateCommand,
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    /// Import templates and skills from a git URL or local directory
    Pull {
        /// `https://…`, `git@…`, or a local path
        source: String,
    },

    /// Scaffold a new agent, command, hook, mcp or skill
    Create {
        /// agent, command, skill, hook or mcp
        #[arg(value_name = "TYPE")]
        kind: String,
        name: String,
    },

    /// List templates by kind
    List {
        /// Only this kind directory (agents, skills, …)
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<String>,
    },
}

pub fn run(ctx: &AppContext, args: &TemplateArgs) -> Result<()> {
    match &args.action {
        TemplateCommand::Pull { source } => pull(ctx, source),
        TemplateCommand::Create { kind, name } => create(ctx, kind, name),
        TemplateCommand::List { kind } => list(ctx, kind.as_deref()),
    }
}

fn pull(ctx: &AppContext, raw: &str) -> Result<()> {
    let source = Source::parse(raw)?;
    let store = ctx.store();
    let imported = Importer::new(&store, &ctx.runner)
        .with_dry_run(ctx.dry_run)
        .pull(&source)?;

    if ctx.is_robot() {
        return emit_json(&robot_ok(&imported, ctx.dry_run));
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!("Pull {raw}"));
    if imported.is_empty() {
        layout.status(Tone::Warning, "no templates found in source");
    } else {
        layout.status(Tone::Success, &format!("pulled {} items", imported.len()));
        let lines: Vec<String> = imported.iter().map(describe).collect();
        for line in preview(lines.iter().map(String::as_str), PULL_PREVIEW) {
            layout.bullet(&line);
        }
        layout.section("Next steps");
        layout.hint("vibery template list");
        layout.hint("vibery kit add <kit> <template>");
        layout.hint("vibery sync");
    }
    layout.dry_run_banner(ctx.dry_run);
    emit_human(layout);
    Ok(())
}

fn describe(asset: &ImportedAsset) -> String {
    format!("{}: {}", asset.kind, asset.name)
}

#[derive(Serialize)]
struct CreateOutput {
    kind: String,
    name: String,
    path: String,
}

fn create(ctx: &AppContext, kind: &str, name: &str) -> Result<()> {
    let path = ctx.store().create_scaffold(kind, name, ctx.dry_run)?;
    let output = CreateOutput {
        kind: kind.to_string(),
        name: name.to_string(),
        path: ctx.paths.relative(&path),
    };

    if ctx.is_robot() {
        return emit_json(&robot_ok(&output, ctx.dry_run));
    }

    let mut layout = HumanLayout::new();
    layout.status(Tone::Success, &format!("created {kind}: {}", output.path));
    layout.section("Next steps");
    layout.hint("edit the template to add content");
    layout.hint(&format!("vibery kit add <kit> {name}"));
    layout.dry_run_banner(ctx.dry_run);
    emit_human(layout);
    Ok(())
}

#[derive(Serialize)]
struct KindListing {
    kind: String,
    items: Vec<String>,
}

#[derive(Serialize)]
struct ListOutput {
    kinds: Vec<KindListing>,
    total: usize,
}

fn list(ctx: &AppContext, filter: Option<&str>) -> Result<()> {
    let store = ctx.store();
    let wanted = |kind: &str| filter.is_none_or(|f| f == kind);

    let mut kinds = Vec::new();
    for group in store.template_groups()? {
        if wanted(&group.dir_name) {
            kinds.push(KindListing {
                items: group.files.iter().map(|f| file_stem(f)).collect(),
                kind: group.dir_name,
            });
        }
    }
    if wanted("skills") {
        kinds.push(KindListing {
            kind: "skills".to_string(),
            items: store.skills()?.iter().map(|dir| file_name(dir)).collect(),
        });
    }
    if let (Some(kind), true) = (filter, kinds.is_empty()) {
        return Err(VbError::TemplateNotFound(format!("no templates of type {kind}")));
    }
    let total = kinds.iter().map(|k| k.items.len()).sum();
    let output = ListOutput { kinds, total };

    if ctx.is_robot() {
        return emit_json(&robot_ok(&output, ctx.dry_run));
    }

    let mut layout = HumanLayout::new();
    layout.title("Templates");
    for listing in output.kinds.iter().filter(|k| !k.items.is_empty()) {
        layout.section(&format!("{}/ ({})", listing.kind, listing.items.len()));
        for line in preview(listing.items.iter().map(String::as_str), LIST_PREVIEW) {
            layout.bullet(&line);
        }
    }
    layout.section(&format!("Total: {} templates", output.total));
    emit_human(layout);
    Ok(())
}
