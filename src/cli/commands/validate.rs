//! vibery validate - check kit manifests against their files

use clap::Args;

use crate::app::AppContext;
use crate::cli::colors::Tone;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::core::{KitValidation, ValidationSummary, validate_all, validate_kit};
use crate::error::{Result, VbError};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Only this kit
    pub kit: Option<String>,
}

pub fn run(ctx: &AppContext, args: &ValidateArgs) -> Result<()> {
    let summary = match &args.kit {
        Some(id) => {
            let kit = ctx.catalog().kit_dir(id);
            if !kit.root.is_dir() {
                return Err(VbError::KitNotFound(id.clone()));
            }
            ValidationSummary {
                kits: vec![validate_kit(&kit)],
            }
        }
        None => validate_all(&ctx.paths.stacks)?,
    };

    if ctx.is_robot() {
        emit_json(&robot_ok(&summary, ctx.dry_run))?;
    } else {
        emit_human(summary_layout(&summary));
    }

    if summary.all_valid() {
        Ok(())
    } else {
        let invalid = summary.kits.len() - summary.total_valid();
        Err(VbError::ValidationFailed(format!("{invalid} invalid kit(s)")))
    }
}

fn summary_layout(summary: &ValidationSummary) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout.title("Validating kits");
    for kit in &summary.kits {
        kit_lines(&mut layout, kit);
    }

    layout.section("Summary");
    layout.kv(
        "Valid",
        &format!("{}/{}", summary.total_valid(), summary.kits.len()),
    );
    layout.kv("Items", &summary.total_items().to_string());
    if summary.all_valid() {
        layout.status(Tone::Success, "all kits valid");
    }
    layout
}

fn kit_lines(layout: &mut HumanLayout, kit: &KitValidation) {
    if kit.valid {
        layout.status(Tone::Success, &format!("{} ({} items)", kit.id, kit.items));
    } else {
        layout.status(Tone::Error, &kit.id);
    }
    for error in &kit.errors {
        layout.bullet(&format!("error: {error}"));
    }
    for warning in &kit.warnings {
        layout.bullet(&format!("warning: {warning}"));
    }
}
