use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::config::{CONFIG_FILE, Config};
use crate::core::{AssetStore, Catalog, CatalogPaths};
use crate::error::Result;
use crate::utils::process::SystemRunner;

pub struct AppContext {
    pub root: PathBuf,
    pub config: Config,
    pub paths: CatalogPaths,
    pub dry_run: bool,
    pub output_format: OutputFormat,
    pub runner: SystemRunner,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let root = Self::find_root()?;
        let config = Config::load(cli.config.as_deref(), &root)?;
        let paths = CatalogPaths::resolve(&root, &config);

        Ok(Self {
            root,
            config,
            paths,
            dry_run: cli.dry_run,
            output_format: cli.output_format(),
            runner: SystemRunner,
        })
    }

    /// `VIBERY_ROOT`, else the nearest ancestor holding `vibery.toml`, else the cwd.
    fn find_root() -> Result<PathBuf> {
        if let Some(root) = std::env::var_os("VIBERY_ROOT") {
            return Ok(PathBuf::from(root));
        }
        let cwd = std::env::current_dir()?;
        Ok(find_upwards(&cwd, CONFIG_FILE).unwrap_or(cwd))
    }

    #[must_use]
    pub fn store(&self) -> AssetStore {
        AssetStore::new(&self.paths.templates, &self.paths.skills)
    }

    #[must_use]
    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.store(), &self.paths.stacks).with_dry_run(self.dry_run)
    }

    #[must_use]
    pub fn is_robot(&self) -> bool {
        self.output_format == OutputFormat::Json
    }
}

fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(name).is_file())
        .map(Path::to_path_buf)
}
