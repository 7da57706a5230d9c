//! Git command-line implementation of [`VersionControl`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{VcsError, VersionControl};

/// Runs the `git` binary against one file.
///
/// Commands run with the working directory set to the repository directory
/// and name the file by its path relative to it, so the watcher behaves the
/// same wherever it was launched from.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: OsString,
    workdir: PathBuf,
    pathspec: PathBuf,
    description: String,
}

impl GitCli {
    /// Watch `file` using the git `program`, running commands in the file's
    /// parent directory.
    pub fn for_file<S: Into<OsString>, P: AsRef<Path>>(program: S, file: P) -> Self {
        let file = file.as_ref();
        let workdir = match file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let pathspec = file.file_name().map(PathBuf::from).unwrap_or_else(|| file.to_path_buf());
        Self::new(program, workdir, pathspec)
    }

    /// Run commands in `workdir`, addressing `file` relative to it.
    ///
    /// Fails if `file` does not live under `workdir`; git would reject such a
    /// pathspec on every change.
    pub fn in_workdir<S: Into<OsString>, W: AsRef<Path>, P: AsRef<Path>>(
        program: S,
        workdir: W,
        file: P,
    ) -> Result<Self> {
        let workdir = workdir.as_ref();
        let file = file.as_ref();
        let workdir_abs = std::path::absolute(workdir)
            .with_context(|| format!("Cannot resolve work dir {}", workdir.display()))?;
        let file_abs = std::path::absolute(file)
            .with_context(|| format!("Cannot resolve {}", file.display()))?;

        let pathspec = match file_abs.strip_prefix(&workdir_abs) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative.to_path_buf(),
            _ => bail!(
                "{} is outside the work dir {}",
                file.display(),
                workdir.display()
            ),
        };
        Ok(Self::new(program, workdir, pathspec))
    }

    /// Run commands in `workdir` and address the file as `pathspec`, which
    /// must be valid relative to `workdir`.
    pub fn new<S: Into<OsString>, W: Into<PathBuf>, P: Into<PathBuf>>(
        program: S,
        workdir: W,
        pathspec: P,
    ) -> Self {
        let program = program.into();
        let workdir = workdir.into();
        let pathspec = pathspec.into();
        let description = format!(
            "{}: {} in {}",
            Path::new(&program).display(),
            pathspec.display(),
            workdir.display()
        );
        Self {
            program,
            workdir,
            pathspec,
            description,
        }
    }

    /// Returns the directory commands run in.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Returns the file as passed to git.
    pub fn pathspec(&self) -> &Path {
        &self.pathspec
    }

    fn command(&self, args: &[&str]) -> (Command, String) {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&self.workdir).args(args).arg("--").arg(&self.pathspec);
        // Never block on an editor or a credential prompt.
        cmd.env("GIT_TERMINAL_PROMPT", "0").env("GIT_EDITOR", "true");
        let shown = format!("git {}", args.first().copied().unwrap_or_default());
        (cmd, shown)
    }

    /// Run a command, returning its exit code and trimmed stdout and stderr.
    async fn run(&self, args: &[&str]) -> Result<(Option<i32>, String, String), VcsError> {
        let (mut cmd, shown) = self.command(args);
        debug!("Running {} for {}", shown, self.pathspec.display());

        let output = cmd.output().await.map_err(|source| VcsError::Spawn {
            command: shown,
            source,
        })?;
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Ok((output.status.code(), stdout, stderr))
    }

    fn exit_error(args: &[&str], code: Option<i32>, stdout: String, stderr: String) -> VcsError {
        VcsError::Exit {
            command: format!("git {}", args.first().copied().unwrap_or_default()),
            code,
            detail: if stderr.is_empty() { stdout } else { stderr },
        }
    }
}

#[async_trait]
impl VersionControl for GitCli {
    async fn stage(&self) -> Result<(), VcsError> {
        let args = ["add"];
        match self.run(&args).await? {
            (Some(0), _, _) => Ok(()),
            (code, stdout, stderr) => Err(Self::exit_error(&args, code, stdout, stderr)),
        }
    }

    async fn has_staged_changes(&self) -> Result<bool, VcsError> {
        // `--quiet` exits 1 when there are differences and 0 when there are none.
        let args = ["diff", "--cached", "--quiet"];
        match self.run(&args).await? {
            (Some(0), _, _) => Ok(false),
            (Some(1), _, _) => Ok(true),
            (code, stdout, stderr) => Err(Self::exit_error(&args, code, stdout, stderr)),
        }
    }

    async fn commit(&self, message: &str) -> Result<String, VcsError> {
        let args = ["commit", "-m", message];
        match self.run(&args).await? {
            (Some(0), stdout, _) => Ok(stdout.lines().next().unwrap_or_default().to_string()),
            (code, stdout, stderr) => Err(Self::exit_error(&args, code, stdout, stderr)),
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}
