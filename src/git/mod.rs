//! Version-control abstraction.
//!
//! The repository manager never talks to git directly; it goes through the
//! [`Git`] trait so the state machine can be exercised with mocks. The real
//! implementation, [`GitCli`], shells out to the `git` executable.

mod cli;

use std::path::Path;
use std::sync::Arc;

pub use cli::GitCli;

/// Failure of a single git invocation.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    /// The git executable could not be started at all.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// git ran but exited with a non-zero status.
    #[error("`{command}` failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Operations the repository manager needs from a version-control tool.
///
/// Every operation except [`Git::clone_repo`] works inside an existing
/// working directory.
#[cfg_attr(test, mockall::automock)]
pub trait Git: Send + Sync {
    /// Clone `url` into `dest`. `dest` must not exist yet.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError>;

    /// Update remote-tracking refs and tags without touching the working tree.
    fn fetch(&self, dir: &Path) -> Result<(), GitError>;

    /// Move the working tree to a tag name or commit hash (detached HEAD).
    fn checkout(&self, dir: &Path, reference: &str) -> Result<(), GitError>;

    /// All tag names in the repository.
    fn tags(&self, dir: &Path) -> Result<Vec<String>, GitError>;

    /// Full hash of the checked-out commit.
    fn head_commit(&self, dir: &Path) -> Result<String, GitError>;

    /// Full hash of the latest commit on the remote default branch.
    fn default_branch_commit(&self, dir: &Path) -> Result<String, GitError>;

    /// Name of the nearest tag reachable from the checked-out commit.
    fn describe_tag(&self, dir: &Path) -> Result<String, GitError>;
}

impl<T: Git + ?Sized> Git for Arc<T> {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        (**self).clone_repo(url, dest)
    }

    fn fetch(&self, dir: &Path) -> Result<(), GitError> {
        (**self).fetch(dir)
    }

    fn checkout(&self, dir: &Path, reference: &str) -> Result<(), GitError> {
        (**self).checkout(dir, reference)
    }

    fn tags(&self, dir: &Path) -> Result<Vec<String>, GitError> {
        (**self).tags(dir)
    }

    fn head_commit(&self, dir: &Path) -> Result<String, GitError> {
        (**self).head_commit(dir)
    }

    fn default_branch_commit(&self, dir: &Path) -> Result<String, GitError> {
        (**self).default_branch_commit(dir)
    }

    fn describe_tag(&self, dir: &Path) -> Result<String, GitError> {
        (**self).describe_tag(dir)
    }
}
