//! Layered settings.
//!
//! Sources, lowest priority first: built-in defaults, an optional TOML file,
//! `DOCWATCH_*` environment variables (nested keys separated by `__`, e.g.
//! `DOCWATCH_MESSAGE__BODY`), then command-line overrides.
//!
//! ```toml
//! file = "docs/CLAUDE.md"
//! interval = "2s"
//! git = "/usr/bin/git"
//! push_hint = "git push origin main"
//!
//! [message]
//! body = "Auto-generated commit for {file} changes"
//! trailers = ["Co-Authored-By: Docs Bot <bot@example.com>"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::action::{GitCli, MessageTemplate, DEFAULT_BODY, DEFAULT_TRAILER};
use crate::app::{WatchOptions, DEFAULT_PUSH_HINT};
use crate::watch::interval::parse_interval;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DOCWATCH";

/// Fully resolved settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// File to watch.
    pub file: PathBuf,
    /// Polling interval, e.g. "1s".
    pub interval: String,
    /// Git program to run.
    pub git: String,
    /// Directory git runs in. Defaults to the watched file's directory.
    pub workdir: Option<PathBuf>,
    /// Suggested push command logged after each commit; empty to disable.
    pub push_hint: String,
    /// Commit message shape.
    #[serde(default)]
    pub message: MessageTemplate,
}

/// Values given on the command line. `None` leaves lower layers in charge.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub file: Option<PathBuf>,
    pub interval: Option<String>,
    pub git: Option<String>,
    pub workdir: Option<PathBuf>,
    pub no_push_hint: bool,
}

impl Settings {
    /// Load settings from the given config file (if any), the environment,
    /// and `overrides`.
    pub fn load(config_path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("file", "CLAUDE.md")?
            .set_default("interval", "1s")?
            .set_default("git", "git")?
            .set_default("push_hint", DEFAULT_PUSH_HINT)?
            .set_default("message.body", DEFAULT_BODY)?
            .set_default("message.trailers", vec![DEFAULT_TRAILER.to_string()])?;

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        builder = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("message.trailers")
                    .try_parsing(true),
            )
            .set_override_option("file", path_string(&overrides.file))?
            .set_override_option("interval", overrides.interval.clone())?
            .set_override_option("git", overrides.git.clone())?
            .set_override_option("workdir", path_string(&overrides.workdir))?;

        if overrides.no_push_hint {
            builder = builder.set_override("push_hint", "")?;
        }

        let settings = builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize::<Settings>()
            .context("Invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        parse_interval(&self.interval).context("Invalid interval")?;
        if self.file.as_os_str().is_empty() {
            anyhow::bail!("No file to watch was configured");
        }
        Ok(())
    }

    /// Build the git runner. Without a work dir, git runs in the file's
    /// directory; with one, the file must live inside it.
    pub fn git_cli(&self) -> Result<GitCli> {
        match &self.workdir {
            None => Ok(GitCli::for_file(&self.git, &self.file)),
            Some(workdir) => GitCli::in_workdir(&self.git, workdir, &self.file),
        }
    }

    /// Convert to loop options.
    pub fn watch_options(&self) -> Result<WatchOptions> {
        let push_hint = Some(self.push_hint.trim())
            .filter(|h| !h.is_empty())
            .map(str::to_string);
        Ok(WatchOptions {
            interval: parse_interval(&self.interval)?,
            template: self.message.clone(),
            push_hint,
        })
    }
}

fn path_string(path: &Option<PathBuf>) -> Option<String> {
    path.as_ref().map(|p| p.to_string_lossy().into_owned())
}
