//! First-time setup of a repository: clone, pick the latest version, check it
//! out and install it.
//!
//! A failed setup never leaves a partial clone behind. Once the clone
//! succeeded, any later failure removes it again before the error is
//! returned.

use log::{debug, info, warn};
use std::fmt;

use crate::repository::RepositoryError;

use super::RepositoryOperations;

/// Stable categories of setup failure, each with a machine key and a
/// human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupErrorKind {
    InvalidStructure,
    CloneFailed,
    InstallFailed,
    AlreadyConfigured,
    Unknown,
}

impl SetupErrorKind {
    pub fn key(&self) -> &'static str {
        match self {
            SetupErrorKind::InvalidStructure => "invalid_structure",
            SetupErrorKind::CloneFailed => "clone_failed",
            SetupErrorKind::InstallFailed => "install_failed",
            SetupErrorKind::AlreadyConfigured => "already_configured",
            SetupErrorKind::Unknown => "unknown",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            SetupErrorKind::InvalidStructure => "invalid repository structure",
            SetupErrorKind::CloneFailed => "cannot clone repository",
            SetupErrorKind::InstallFailed => "installation failed",
            SetupErrorKind::AlreadyConfigured => "repository is already configured",
            SetupErrorKind::Unknown => "unknown error",
        }
    }
}

impl fmt::Display for SetupErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A failed setup: the category shown to the user plus the underlying cause.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct SetupError {
    kind: SetupErrorKind,
    #[source]
    source: Option<RepositoryError>,
}

impl SetupError {
    pub fn new(kind: SetupErrorKind, source: Option<RepositoryError>) -> Self {
        Self { kind, source }
    }

    /// The repository is already known under the given identifier.
    pub fn already_configured() -> Self {
        Self::new(SetupErrorKind::AlreadyConfigured, None)
    }

    pub fn kind(&self) -> SetupErrorKind {
        self.kind
    }

    pub fn key(&self) -> &'static str {
        self.kind.key()
    }

    pub fn message(&self) -> &'static str {
        self.kind.message()
    }

    pub fn repository_error(&self) -> Option<&RepositoryError> {
        self.source.as_ref()
    }
}

/// Result of a successful setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupOutcome {
    /// Version that was checked out and installed.
    pub version: String,
}

/// Setup steps, used to pick the error category.
#[derive(Debug, Clone, Copy)]
enum Step {
    Clone,
    Resolve,
    Install,
}

/// Initial install wizard over any [`RepositoryOperations`].
pub struct SetupFlow<'a, O: RepositoryOperations + ?Sized> {
    ops: &'a O,
}

impl<'a, O: RepositoryOperations + ?Sized> SetupFlow<'a, O> {
    pub fn new(ops: &'a O) -> Self {
        Self { ops }
    }

    /// Clone, check out the latest version and install.
    pub async fn run(&self) -> Result<SetupOutcome, SetupError> {
        let slug = self.ops.slug();

        info!("Cloning {}", slug);
        self.ops
            .clone_repo()
            .await
            .map_err(|e| Self::map_error(Step::Clone, e))?;

        match self.checkout_and_install().await {
            Ok(outcome) => {
                info!("Installed {} {}", slug, outcome.version);
                Ok(outcome)
            }
            Err((step, e)) => {
                warn!("Setup of {} failed: {}", slug, e);
                if let Err(cleanup) = self.ops.remove().await {
                    warn!("Failed to clean up {} after setup error: {}", slug, cleanup);
                }
                Err(Self::map_error(step, e))
            }
        }
    }

    async fn checkout_and_install(&self) -> Result<SetupOutcome, (Step, RepositoryError)> {
        let version = self
            .ops
            .latest_version()
            .await
            .map_err(|e| (Step::Resolve, e))?;
        debug!("Latest version of {} is {}", self.ops.slug(), version);

        self.ops
            .checkout(version.clone())
            .await
            .map_err(|e| (Step::Resolve, e))?;

        self.ops.install().await.map_err(|e| (Step::Install, e))?;

        Ok(SetupOutcome { version })
    }

    fn map_error(step: Step, error: RepositoryError) -> SetupError {
        let kind = match (&error, step) {
            (RepositoryError::InvalidStructure { .. }, _) => SetupErrorKind::InvalidStructure,
            (RepositoryError::AlreadyCloned { .. }, _) => SetupErrorKind::AlreadyConfigured,
            (_, Step::Clone) => SetupErrorKind::CloneFailed,
            (_, Step::Install) => SetupErrorKind::InstallFailed,
            (_, Step::Resolve) => SetupErrorKind::Unknown,
        };
        SetupError::new(kind, Some(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::MockRepositoryOperations;
    use crate::git::GitError;
    use crate::repository::RepositoryType;
    use mockall::Sequence;
    use mockall::predicate::eq;
    use std::path::PathBuf;

    fn ops() -> MockRepositoryOperations {
        let mut ops = MockRepositoryOperations::new();
        ops.expect_slug()
            .returning(|| "awesome-component".to_string());
        ops
    }

    fn git_failure() -> GitError {
        GitError::Failed {
            command: "git clone".into(),
            status: "exit status: 128".into(),
            stderr: "fatal: repository not found".into(),
        }
    }

    #[test]
    fn test_kind_keys_and_messages() {
        let cases = [
            (SetupErrorKind::InvalidStructure, "invalid_structure", "invalid repository structure"),
            (SetupErrorKind::CloneFailed, "clone_failed", "cannot clone repository"),
            (SetupErrorKind::InstallFailed, "install_failed", "installation failed"),
            (SetupErrorKind::AlreadyConfigured, "already_configured", "repository is already configured"),
            (SetupErrorKind::Unknown, "unknown", "unknown error"),
        ];
        for (kind, key, message) in cases {
            assert_eq!(kind.key(), key);
            assert_eq!(kind.message(), message);
            assert_eq!(SetupError::new(kind, None).to_string(), message);
        }
    }

    #[tokio::test]
    async fn test_success_runs_steps_in_order() {
        let mut ops = ops();
        let mut seq = Sequence::new();
        ops.expect_clone_repo()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        ops.expect_latest_version()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok("v1.0.0".to_string()));
        ops.expect_checkout()
            .with(eq("v1.0.0".to_string()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        ops.expect_install()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));
        ops.expect_remove().never();

        let outcome = SetupFlow::new(&ops).run().await.unwrap();
        assert_eq!(outcome.version, "v1.0.0");
    }

    #[tokio::test]
    async fn test_clone_failure_does_not_remove() {
        let mut ops = ops();
        ops.expect_clone_repo().returning(|| {
            Err(RepositoryError::CloneFailed {
                url: "https://github.com/user/awesome-component".into(),
                path: PathBuf::from("/config/gpm/awesome-component"),
                source: git_failure(),
            })
        });
        ops.expect_remove().never();
        ops.expect_install().never();

        let err = SetupFlow::new(&ops).run().await.unwrap_err();
        assert_eq!(err.key(), "clone_failed");
        assert!(matches!(
            err.repository_error(),
            Some(RepositoryError::CloneFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_existing_clone_is_already_configured() {
        let mut ops = ops();
        ops.expect_clone_repo().returning(|| {
            Err(RepositoryError::AlreadyCloned {
                path: PathBuf::from("/config/gpm/awesome-component"),
            })
        });
        ops.expect_remove().never();

        let err = SetupFlow::new(&ops).run().await.unwrap_err();
        assert_eq!(err.kind(), SetupErrorKind::AlreadyConfigured);
    }

    #[test_log::test(tokio::test)]
    async fn test_invalid_structure_removes_clone() {
        let mut ops = ops();
        ops.expect_clone_repo().returning(|| Ok(()));
        ops.expect_latest_version()
            .returning(|| Ok("v1.0.0".to_string()));
        ops.expect_checkout().returning(|_| Ok(()));
        ops.expect_install().returning(|| {
            Err(RepositoryError::InvalidStructure {
                path: PathBuf::from("/config/gpm/awesome-component/custom_components"),
                found: 2,
            })
        });
        ops.expect_remove().times(1).returning(|| Ok(()));

        let err = SetupFlow::new(&ops).run().await.unwrap_err();
        assert_eq!(err.key(), "invalid_structure");
        assert_eq!(err.to_string(), "invalid repository structure");
    }

    #[tokio::test]
    async fn test_install_failure_removes_clone() {
        let mut ops = ops();
        ops.expect_clone_repo().returning(|| Ok(()));
        ops.expect_latest_version()
            .returning(|| Ok("v1.0.0".to_string()));
        ops.expect_checkout().returning(|_| Ok(()));
        ops.expect_install().returning(|| {
            Err(RepositoryError::Unsupported {
                repo_type: RepositoryType::Resource,
                operation: "install",
            })
        });
        ops.expect_remove().times(1).returning(|| Ok(()));

        let err = SetupFlow::new(&ops).run().await.unwrap_err();
        assert_eq!(err.kind(), SetupErrorKind::InstallFailed);
    }

    #[tokio::test]
    async fn test_checkout_failure_is_unknown_and_removes_clone() {
        let mut ops = ops();
        ops.expect_clone_repo().returning(|| Ok(()));
        ops.expect_latest_version()
            .returning(|| Ok("v9.9.9".to_string()));
        ops.expect_checkout()
            .returning(|_| Err(RepositoryError::Git(git_failure())));
        ops.expect_install().never();
        ops.expect_remove().times(1).returning(|| Ok(()));

        let err = SetupFlow::new(&ops).run().await.unwrap_err();
        assert_eq!(err.kind(), SetupErrorKind::Unknown);
        assert_eq!(err.message(), "unknown error");
    }

    #[tokio::test]
    async fn test_cleanup_failure_keeps_original_error() {
        let mut ops = ops();
        ops.expect_clone_repo().returning(|| Ok(()));
        ops.expect_latest_version()
            .returning(|| Ok("v1.0.0".to_string()));
        ops.expect_checkout().returning(|_| Ok(()));
        ops.expect_install().returning(|| {
            Err(RepositoryError::InvalidStructure {
                path: PathBuf::from("/config/gpm/awesome-component/custom_components"),
                found: 0,
            })
        });
        ops.expect_remove()
            .times(1)
            .returning(|| Err(RepositoryError::Filesystem(anyhow::anyhow!("busy"))));

        let err = SetupFlow::new(&ops).run().await.unwrap_err();
        assert_eq!(err.kind(), SetupErrorKind::InvalidStructure);
    }
}
