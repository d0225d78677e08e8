use log::{debug, warn};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{Git, GitError};

/// [`Git`] implementation backed by the `git` command line tool.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific git executable instead of the one on `PATH`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run git with `args`, optionally inside `dir`, and return trimmed stdout.
    fn run<S: AsRef<OsStr>>(&self, dir: Option<&Path>, args: &[S]) -> Result<String, GitError> {
        let command = format!(
            "git {}",
            args.iter()
                .map(|a| a.as_ref().to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        debug!("Running `{}` in {:?}", command, dir);

        let mut cmd = Command::new(&self.program);
        cmd.args(args).env("GIT_TERMINAL_PROMPT", "0");
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|source| GitError::Spawn {
            command: command.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(GitError::Failed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Split git's line-oriented output, dropping blank lines.
fn parse_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

impl Git for GitCli {
    #[tracing::instrument(skip(self))]
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        let args: [&OsStr; 5] = [
            "clone".as_ref(),
            "--quiet".as_ref(),
            "--".as_ref(),
            url.as_ref(),
            dest.as_os_str(),
        ];
        self.run(None, &args)?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn fetch(&self, dir: &Path) -> Result<(), GitError> {
        self.run(Some(dir), &["fetch", "--quiet", "--tags", "--force", "origin"])?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn checkout(&self, dir: &Path, reference: &str) -> Result<(), GitError> {
        self.run(Some(dir), &["checkout", "--quiet", "--detach", reference])?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn tags(&self, dir: &Path) -> Result<Vec<String>, GitError> {
        let output = self.run(Some(dir), &["tag", "--list"])?;
        Ok(parse_lines(&output))
    }

    #[tracing::instrument(skip(self))]
    fn head_commit(&self, dir: &Path) -> Result<String, GitError> {
        self.run(Some(dir), &["rev-parse", "HEAD"])
    }

    #[tracing::instrument(skip(self))]
    fn default_branch_commit(&self, dir: &Path) -> Result<String, GitError> {
        match self.run(
            Some(dir),
            &["rev-parse", "--verify", "--quiet", "refs/remotes/origin/HEAD"],
        ) {
            Ok(hash) => Ok(hash),
            Err(e) => {
                warn!(
                    "No remote default branch in {:?} ({}), using HEAD instead",
                    dir, e
                );
                self.head_commit(dir)
            }
        }
    }

    #[tracing::instrument(skip(self))]
    fn describe_tag(&self, dir: &Path) -> Result<String, GitError> {
        self.run(Some(dir), &["describe", "--tags", "--abbrev=0"])
    }
}
