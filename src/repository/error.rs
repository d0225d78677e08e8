use std::path::PathBuf;

use crate::git::GitError;

use super::RepositoryType;

/// Everything that can go wrong while managing a repository.
///
/// Precondition violations each have their own variant so callers can show
/// a specific message. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// An operation that needs a clone ran before `clone()`.
    #[error("repository is not cloned at {}", .path.display())]
    NotCloned { path: PathBuf },

    /// `clone()` ran on a repository that is already cloned.
    #[error("repository is already cloned at {}", .path.display())]
    AlreadyCloned { path: PathBuf },

    /// git could not clone the remote (network, auth, missing repository).
    #[error("failed to clone {url} into {}", .path.display())]
    CloneFailed {
        url: String,
        path: PathBuf,
        #[source]
        source: GitError,
    },

    /// An operation that needs an installation ran before `install()`.
    #[error("repository is not installed at {}", .path.display())]
    NotInstalled { path: PathBuf },

    /// `install()` ran while the install link already exists.
    #[error("repository is already installed at {}", .path.display())]
    AlreadyInstalled { path: PathBuf },

    /// The clone does not hold exactly one component directory.
    #[error(
        "invalid repository structure: expected exactly one directory in {}, found {found}",
        .path.display()
    )]
    InvalidStructure { path: PathBuf, found: usize },

    /// No tag is reachable from the checked-out commit.
    #[error("no tag is reachable from the checked-out commit in {}", .path.display())]
    Describe {
        path: PathBuf,
        #[source]
        source: GitError,
    },

    /// The URL has no usable final path segment.
    #[error("cannot derive a repository name from URL {url:?}")]
    InvalidUrl { url: String },

    #[error("{operation} is not supported for {repo_type} repositories")]
    Unsupported {
        repo_type: RepositoryType,
        operation: &'static str,
    },

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Filesystem(#[from] anyhow::Error),
}

/// Friendly result alias
pub type Result<T, E = RepositoryError> = std::result::Result<T, E>;
