//! vibery publish / deploy - push templates and deploy the website

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::colors::Tone;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok, robot_partial};
use crate::error::Result;
use crate::publish::{PublishReport, Publisher};
use crate::registry::SyncReport;

#[derive(Args, Debug, Default)]
pub struct PublishArgs {
    /// Also publish the CLI package to npm
    #[arg(long)]
    pub npm: bool,
}

pub fn run(ctx: &AppContext, args: &PublishArgs) -> Result<()> {
    let report = publish(ctx, args);
    if ctx.is_robot() {
        return emit_report(ctx, &report, &report);
    }
    emit_human(report_layout(&report));
    Ok(())
}

#[derive(Serialize)]
struct DeployOutput<'a> {
    sync: &'a SyncReport,
    publish: &'a PublishReport,
}

/// `sync` then `publish`. A failed sync stops before anything is published.
pub fn run_deploy(ctx: &AppContext, args: &PublishArgs) -> Result<()> {
    let synced = super::sync::sync(ctx)?;
    let published = publish(ctx, args);

    if ctx.is_robot() {
        let output = DeployOutput {
            sync: &synced,
            publish: &published,
        };
        return emit_report(ctx, &output, &published);
    }
    emit_human(super::sync::report_layout(&synced));
    emit_human(report_layout(&published));
    Ok(())
}

fn publish(ctx: &AppContext, args: &PublishArgs) -> PublishReport {
    Publisher::new(&ctx.paths, &ctx.config.publish, &ctx.runner)
        .with_dry_run(ctx.dry_run)
        .publish(args.npm)
}

fn emit_report<T: Serialize>(ctx: &AppContext, data: &T, report: &PublishReport) -> Result<()> {
    let failed = report.failed().len();
    if failed == 0 {
        emit_json(&robot_ok(data, ctx.dry_run))
    } else {
        let completed = report.steps.len() - failed;
        emit_json(&robot_partial(data, ctx.dry_run, completed, failed))
    }
}

fn report_layout(report: &PublishReport) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout.title("Publish");
    for step in &report.steps {
        let tone = if step.ok { Tone::Success } else { Tone::Error };
        layout.status(tone, &format!("{}: {}", step.name, step.detail));
        if let Some(hint) = &step.hint {
            layout.hint(hint);
        }
    }

    layout.blank();
    if report.all_ok() {
        layout.status(Tone::Success, "publish complete");
    } else {
        layout.status(
            Tone::Warning,
            &format!("partial publish: {} failed", report.failed().join(", ")),
        );
    }
    layout.dry_run_banner(report.dry_run);
    layout
}
