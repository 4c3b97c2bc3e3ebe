//! Publishing (`publish`, the second half of `deploy`).
//!
//! Steps run in a fixed order and each succeeds or fails on its own:
//!
//! 1. mirror the templates tree into the templates repository checkout,
//!    then commit and push when `git status` shows changes
//! 2. build the website and deploy it with wrangler
//! 3. optionally publish the CLI package to npm
//!
//! A failed step never stops the next one. Nothing is retried.

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::PublishConfig;
use crate::core::CatalogPaths;
use crate::error::VbError;
use crate::utils::process::{CommandOutput, CommandRunner};
use crate::utils::replace_dir;

const REPUBLISH_MARKER: &str = "cannot publish over the previously published";

/// Result of one publish step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub name: String,
    pub ok: bool,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PublishReport {
    pub dry_run: bool,
    pub steps: Vec<StepReport>,
}

impl PublishReport {
    #[must_use]
    pub fn all_ok(&self) -> bool {
        self.steps.iter().all(|step| step.ok)
    }

    #[must_use]
    pub fn failed(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|step| !step.ok)
            .map(|step| step.name.as_str())
            .collect()
    }
}

/// Why a step failed, plus what the operator can do about it.
#[derive(Debug)]
struct StepFailure {
    message: String,
    hint: Option<String>,
}

impl StepFailure {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            hint: None,
        }
    }

    fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<VbError> for StepFailure {
    fn from(err: VbError) -> Self {
        let hint = match &err {
            VbError::AuthenticationRequired { hint, .. } => Some(hint.clone()),
            _ => None,
        };
        Self {
            message: err.to_string(),
            hint,
        }
    }
}

type StepResult = std::result::Result<String, StepFailure>;

pub struct Publisher<'a, R: CommandRunner> {
    paths: &'a CatalogPaths,
    config: &'a PublishConfig,
    runner: &'a R,
    dry_run: bool,
}

impl<'a, R: CommandRunner> Publisher<'a, R> {
    pub const fn new(paths: &'a CatalogPaths, config: &'a PublishConfig, runner: &'a R) -> Self {
        Self {
            paths,
            config,
            runner,
            dry_run: false,
        }
    }

    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Templates repository then website, plus npm when `include_npm`.
    pub fn publish(&self, include_npm: bool) -> PublishReport {
        let mut steps = vec![
            finish("templates-repo", self.push_templates()),
            finish("website", self.deploy_website()),
        ];
        if include_npm {
            steps.push(finish("npm", self.publish_cli()));
        }
        let report = PublishReport {
            dry_run: self.dry_run,
            steps,
        };
        if report.all_ok() {
            info!(dry_run = self.dry_run, "publish complete");
        } else {
            warn!(failed = ?report.failed(), "partial publish");
        }
        report
    }

    fn run(
        &self,
        tool: &str,
        program: &str,
        args: &[&str],
        cwd: &Path,
    ) -> std::result::Result<CommandOutput, StepFailure> {
        Ok(self.runner.run(program, args, Some(cwd))?.check(tool)?)
    }

    /// Step 1: mirror and push the templates repository.
    fn push_templates(&self) -> StepResult {
        let repo = &self.paths.templates_repo;
        if !repo.is_dir() {
            return Err(StepFailure::new(format!("{} not found", self.paths.relative(repo)))
                .hint("git clone <templates repository> templates-repo"));
        }
        if !repo.join(".git").exists() {
            return Err(StepFailure::new(format!(
                "{} is not a git repository",
                self.paths.relative(repo)
            )));
        }

        let mut mirrored = Vec::new();
        for kind in &self.config.template_types {
            let source = self.paths.templates.join(kind);
            if !source.is_dir() {
                continue;
            }
            if !self.dry_run {
                replace_dir(&source, &repo.join(kind))?;
            }
            mirrored.push(kind.as_str());
        }

        if self.dry_run {
            return Ok(format!(
                "would mirror {} and commit + push to origin/{}",
                mirrored.join(", "),
                self.config.branch
            ));
        }

        let status = self.run("git", "git", &["status", "--porcelain"], repo)?;
        if status.stdout.trim().is_empty() {
            return Ok("no changes to push".to_string());
        }
        self.run("git", "git", &["add", "-A"], repo)?;
        self.run("git", "git", &["commit", "-m", self.config.commit_message.as_str()], repo)?;
        self.run("git", "git", &["push", "origin", self.config.branch.as_str()], repo)?;
        Ok(format!("pushed {} to origin/{}", mirrored.join(", "), self.config.branch))
    }

    /// Step 2: build the website and deploy it to Pages.
    fn deploy_website(&self) -> StepResult {
        let site = &self.paths.website;
        if !site.join("package.json").is_file() {
            return Err(StepFailure::new(format!(
                "no package.json in {}",
                self.paths.relative(site)
            )));
        }

        let project = format!("--project-name={}", self.config.pages_project);
        if self.dry_run {
            return Ok(format!(
                "would run npm run build and wrangler pages deploy {} {project}",
                self.config.build_dir
            ));
        }

        if !site.join("node_modules").exists() {
            self.run("npm install", "npm", &["install"], site)?;
        }
        self.run("npm run build", "npm", &["run", "build"], site)?;

        let deploy = self.runner.run(
            "npx",
            &[
                "wrangler",
                "pages",
                "deploy",
                self.config.build_dir.as_str(),
                project.as_str(),
            ],
            Some(site),
        )?;
        if deploy.success() {
            return Ok(format!("deployed to Pages project {}", self.config.pages_project));
        }
        if deploy.mentions_auth_failure() {
            return Err(VbError::AuthenticationRequired {
                tool: "wrangler".to_string(),
                hint: "npx wrangler login".to_string(),
            }
            .into());
        }
        Err(VbError::ExternalProcess {
            tool: "wrangler".to_string(),
            code: deploy.exit_code,
            message: deploy.stderr_excerpt(),
        }
        .into())
    }

    /// Optional step: publish the CLI package to npm.
    fn publish_cli(&self) -> StepResult {
        let cli = &self.paths.cli;
        if !cli.join("package.json").is_file() {
            return Err(StepFailure::new(format!(
                "no package.json in {}",
                self.paths.relative(cli)
            )));
        }
        if self.dry_run {
            return Ok("would run npm publish --access public".to_string());
        }

        let whoami = self.runner.run("npm", &["whoami"], Some(cli))?;
        if !whoami.success() {
            return Err(VbError::AuthenticationRequired {
                tool: "npm".to_string(),
                hint: "npm login".to_string(),
            }
            .into());
        }

        let publish = self
            .runner
            .run("npm", &["publish", "--access", "public"], Some(cli))?;
        if publish.success() {
            return Ok(format!("published as {}", whoami.stdout.trim()));
        }
        if publish.stderr.to_lowercase().contains(REPUBLISH_MARKER) {
            return Err(StepFailure::new("version already published")
                .hint(format!("bump the version in {}/package.json", self.paths.relative(cli))));
        }
        Err(VbError::ExternalProcess {
            tool: "npm publish".to_string(),
            code: publish.exit_code,
            message: publish.stderr_excerpt(),
        }
        .into())
    }
}

fn finish(name: &str, result: StepResult) -> StepReport {
    match result {
        Ok(detail) => StepReport {
            name: name.to_string(),
            ok: true,
            detail,
            hint: None,
        },
        Err(failure) => {
            warn!(step = name, error = %failure.message, "publish step failed");
            StepReport {
                name: name.to_string(),
                ok: false,
                detail: failure.message,
                hint: failure.hint,
            }
        }
    }
}
