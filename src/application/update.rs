//! Installed/latest version reporting and version switching for an already
//! set-up repository.
//!
//! Unlike [`SetupFlow`](super::SetupFlow), a failed update never removes
//! anything: the previous installation stays in place.

use log::{debug, info};

use crate::repository::{RepositoryError, UpdateStrategy};

use super::RepositoryOperations;

/// Length of a commit hash as shown to the user.
pub const SHORT_HASH_LEN: usize = 7;

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// The requested version is the one already checked out.
    #[error("version {version} is already installed")]
    AlreadyInstalled { version: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Installed and latest versions in display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatus {
    pub installed: String,
    pub latest: String,
    pub update_available: bool,
}

/// Returned by a successful [`UpdateEntity::install`]: the host must restart
/// before the new version is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartRequired {
    pub component: String,
    pub version: String,
}

/// Update entity for one repository.
pub struct UpdateEntity<O: RepositoryOperations> {
    ops: O,
}

impl<O: RepositoryOperations> UpdateEntity<O> {
    pub fn new(ops: O) -> Self {
        Self { ops }
    }

    /// Version currently checked out, shortened under `latest_commit`.
    pub async fn installed_version(&self) -> Result<String, UpdateError> {
        let strategy = self.ops.update_strategy().await?;
        let version = self.ops.current_version().await?;
        Ok(display_version(&version, strategy))
    }

    /// Latest available version, shortened under `latest_commit`.
    pub async fn latest_version(&self) -> Result<String, UpdateError> {
        let strategy = self.ops.update_strategy().await?;
        let version = self.ops.latest_version().await?;
        Ok(display_version(&version, strategy))
    }

    /// Fetch from the remote, then compare installed and latest versions.
    pub async fn check(&self) -> Result<UpdateStatus, UpdateError> {
        self.ops.fetch().await?;

        let installed = self.installed_version().await?;
        let latest = self.latest_version().await?;
        let update_available = installed != latest;
        debug!(
            "{}: installed {}, latest {}",
            self.ops.slug(),
            installed,
            latest
        );

        Ok(UpdateStatus {
            installed,
            latest,
            update_available,
        })
    }

    /// Check out `target` (or the latest version when `None`).
    ///
    /// # Errors
    ///
    /// - [`UpdateError::AlreadyInstalled`] if `target` is the installed version.
    /// - [`UpdateError::Repository`] if resolving or checking out fails.
    pub async fn install(
        &self,
        target: Option<String>,
        backup: bool,
    ) -> Result<RestartRequired, UpdateError> {
        let strategy = self.ops.update_strategy().await?;
        let target = match target {
            Some(target) => target,
            None => self.ops.latest_version().await?,
        };
        let version = display_version(&target, strategy);

        let installed = self.installed_version().await?;
        if version == installed {
            return Err(UpdateError::AlreadyInstalled { version });
        }

        let component = match self.ops.component_name().await {
            Ok(name) => name,
            Err(_) => self.ops.slug(),
        };
        if backup {
            info!(
                "Backup of {} requested; it is taken by the host before restarting",
                component
            );
        }

        info!("Updating {} from {} to {}", component, installed, version);
        self.ops.checkout(target).await?;

        Ok(RestartRequired { component, version })
    }
}

/// Version as shown to the user: commit hashes are cut to [`SHORT_HASH_LEN`].
pub fn display_version(version: &str, strategy: UpdateStrategy) -> String {
    match strategy {
        UpdateStrategy::LatestCommit => version.chars().take(SHORT_HASH_LEN).collect(),
        _ => version.to_string(),
    }
}
