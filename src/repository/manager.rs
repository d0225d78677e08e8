//! Repository lifecycle: clone, resolve, checkout, install, uninstall, remove.
//!
//! The manager keeps no state flags of its own. Whether a repository is
//! cloned or installed is read from disk on every call, so a manager rebuilt
//! after a restart (or after someone tampered with the directories) always
//! sees the truth:
//!
//! - cloned    <=> `<clone_base_dir>/<slug>/.git` exists
//! - installed <=> `<install_base_dir>/<component_name>` is a symlink into the working directory
//!
//! Anything else at the install path (another package's link, a directory the
//! user placed there) belongs to someone else and is never touched.

use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::git::Git;
use crate::runtime::Runtime;
use crate::version::{UpdateStrategy, VersionResolver};

use super::error::{RepositoryError, Result};
use super::url::{is_usable_slug, slug};
use super::RepositoryType;

/// Conventional directory inside a repository holding the installable component.
pub const COMPONENTS_DIR: &str = "custom_components";

/// Manages one remote repository and its installation.
///
/// Operations take `&self` and check their preconditions against the
/// filesystem before any side effect. They are not safe to interleave from
/// several threads; wrap the manager in
/// [`SharedRepositoryManager`](crate::application::SharedRepositoryManager)
/// for that.
#[derive(Debug)]
pub struct RepositoryManager<R: Runtime, G: Git> {
    runtime: R,
    git: G,
    url: String,
    repo_type: RepositoryType,
    update_strategy: UpdateStrategy,
    clone_base_dir: PathBuf,
    install_base_dir: PathBuf,
    slug: String,
}

impl<R: Runtime, G: Git> RepositoryManager<R, G> {
    /// Create a manager. Nothing is touched on disk.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::InvalidUrl`] if no directory name can be derived from `url`.
    pub fn new(
        runtime: R,
        git: G,
        url: impl Into<String>,
        repo_type: RepositoryType,
        clone_base_dir: impl Into<PathBuf>,
        install_base_dir: impl Into<PathBuf>,
        update_strategy: UpdateStrategy,
    ) -> Result<Self> {
        let url = url.into();
        let slug = slug(&url);
        if !is_usable_slug(&slug) {
            return Err(RepositoryError::InvalidUrl { url });
        }

        Ok(Self {
            runtime,
            git,
            url,
            repo_type,
            update_strategy,
            clone_base_dir: clone_base_dir.into(),
            install_base_dir: install_base_dir.into(),
            slug,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn repo_type(&self) -> RepositoryType {
        self.repo_type
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn update_strategy(&self) -> UpdateStrategy {
        self.update_strategy
    }

    /// Change the strategy used by later version queries.
    pub fn set_update_strategy(&mut self, strategy: UpdateStrategy) {
        debug!(
            "Update strategy for {} changed from {} to {}",
            self.slug, self.update_strategy, strategy
        );
        self.update_strategy = strategy;
    }

    pub fn clone_base_dir(&self) -> &Path {
        &self.clone_base_dir
    }

    pub fn install_base_dir(&self) -> &Path {
        &self.install_base_dir
    }

    /// `<clone_base_dir>/<slug>`
    pub fn working_dir(&self) -> PathBuf {
        self.clone_base_dir.join(&self.slug)
    }

    pub fn is_cloned(&self) -> bool {
        self.runtime.exists(&self.working_dir().join(".git"))
    }

    pub fn is_installed(&self) -> bool {
        match self.install_symlink() {
            Ok(link) => self.owns_link(&link),
            Err(_) => false,
        }
    }

    /// The single directory under `<working_dir>/custom_components`.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::NotCloned`] before `clone()`.
    /// - [`RepositoryError::InvalidStructure`] unless there is exactly one directory.
    pub fn component_dir(&self) -> Result<PathBuf> {
        self.ensure_cloned()?;

        let components = self.working_dir().join(COMPONENTS_DIR);
        let mut dirs = if self.runtime.is_dir(&components) {
            self.runtime
                .read_dir(&components)?
                .into_iter()
                .filter(|entry| self.runtime.is_dir(entry))
                .collect()
        } else {
            Vec::new()
        };

        if dirs.len() != 1 {
            return Err(RepositoryError::InvalidStructure {
                path: components,
                found: dirs.len(),
            });
        }
        Ok(dirs.remove(0))
    }

    /// Directory name of [`component_dir`](Self::component_dir).
    pub fn component_name(&self) -> Result<String> {
        let dir = self.component_dir()?;
        dir.file_name()
            .and_then(|name| name.to_str())
            .map(String::from)
            .ok_or_else(|| RepositoryError::InvalidStructure {
                path: dir.clone(),
                found: 0,
            })
    }

    /// `<install_base_dir>/<component_name>`
    pub fn install_symlink(&self) -> Result<PathBuf> {
        match self.repo_type {
            RepositoryType::Integration => {
                Ok(self.install_base_dir.join(self.component_name()?))
            }
            RepositoryType::Resource => Err(RepositoryError::Unsupported {
                repo_type: self.repo_type,
                operation: "install path",
            }),
        }
    }

    /// Clone the remote repository into the working directory.
    ///
    /// Leftovers of an interrupted clone (a working directory without `.git`)
    /// are removed first.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::AlreadyCloned`] if the repository is already cloned.
    /// - [`RepositoryError::CloneFailed`] if git fails.
    #[tracing::instrument(skip(self), fields(slug = %self.slug))]
    pub fn clone(&self) -> Result<()> {
        let working_dir = self.working_dir();
        if self.is_cloned() {
            return Err(RepositoryError::AlreadyCloned { path: working_dir });
        }

        if self.path_present(&working_dir) {
            warn!("Removing incomplete clone at {:?}", working_dir);
            self.runtime.remove_dir_all(&working_dir)?;
        }

        self.runtime.create_dir_all(&self.clone_base_dir)?;

        info!("Cloning {} into {:?}", self.url, working_dir);
        self.git
            .clone_repo(&self.url, &working_dir)
            .map_err(|source| RepositoryError::CloneFailed {
                url: self.url.clone(),
                path: working_dir.clone(),
                source,
            })
    }

    /// Update remote refs and tags; the working tree is left alone.
    #[tracing::instrument(skip(self), fields(slug = %self.slug))]
    pub fn fetch(&self) -> Result<()> {
        self.ensure_cloned()?;
        debug!("Fetching {}", self.url);
        Ok(self.git.fetch(&self.working_dir())?)
    }

    /// Version of the checked-out working tree under the current strategy.
    pub fn current_version(&self) -> Result<String> {
        self.ensure_cloned()?;
        VersionResolver::current_version(&self.git, &self.working_dir(), self.update_strategy)
    }

    /// Latest available version under the current strategy.
    pub fn latest_version(&self) -> Result<String> {
        self.ensure_cloned()?;
        VersionResolver::latest_version(&self.git, &self.working_dir(), self.update_strategy)
    }

    /// Move the working tree to a tag name or commit hash.
    ///
    /// An unknown reference surfaces as [`RepositoryError::Git`].
    #[tracing::instrument(skip(self), fields(slug = %self.slug))]
    pub fn checkout(&self, reference: &str) -> Result<()> {
        self.ensure_cloned()?;
        info!("Checking out {} in {:?}", reference, self.working_dir());
        Ok(self.git.checkout(&self.working_dir(), reference)?)
    }

    /// Publish the component directory as `<install_base_dir>/<component_name>`.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::NotCloned`] before `clone()`.
    /// - [`RepositoryError::Unsupported`] for resource repositories.
    /// - [`RepositoryError::InvalidStructure`] unless there is exactly one component directory.
    /// - [`RepositoryError::AlreadyInstalled`] if anything already occupies the install path.
    #[tracing::instrument(skip(self), fields(slug = %self.slug))]
    pub fn install(&self) -> Result<()> {
        self.ensure_cloned()?;
        self.ensure_supported("install")?;

        let component_dir = self.component_dir()?;
        let link = self.install_symlink()?;
        if self.path_present(&link) {
            return Err(RepositoryError::AlreadyInstalled { path: link });
        }

        self.runtime.create_dir_all(&self.install_base_dir)?;
        let target = self.runtime.canonicalize(&component_dir)?;

        info!("Linking {:?} -> {:?}", link, target);
        self.runtime.symlink(&target, &link)?;
        Ok(())
    }

    /// Remove the install link. The working directory is kept.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::NotCloned`] before `clone()`.
    /// - [`RepositoryError::Unsupported`] for resource repositories.
    /// - [`RepositoryError::NotInstalled`] if there is no install link into
    ///   the working directory. A foreign entry at the install path is left alone.
    #[tracing::instrument(skip(self), fields(slug = %self.slug))]
    pub fn uninstall(&self) -> Result<()> {
        self.ensure_cloned()?;
        self.ensure_supported("uninstall")?;

        let link = self.installed_link()?;
        info!("Removing link {:?}", link);
        self.runtime.remove_symlink(&link)?;
        Ok(())
    }

    /// Uninstall if needed, then delete the working directory.
    ///
    /// Only this repository's own link is removed; a foreign entry at the
    /// install path survives.
    #[tracing::instrument(skip(self), fields(slug = %self.slug))]
    pub fn remove(&self) -> Result<()> {
        self.ensure_cloned()?;

        if self.is_installed() {
            self.uninstall()?;
        }

        let working_dir = self.working_dir();
        info!("Deleting {:?}", working_dir);
        self.runtime.remove_dir_all(&working_dir)?;
        Ok(())
    }

    fn ensure_cloned(&self) -> Result<()> {
        if self.is_cloned() {
            Ok(())
        } else {
            Err(RepositoryError::NotCloned {
                path: self.working_dir(),
            })
        }
    }

    fn ensure_supported(&self, operation: &'static str) -> Result<()> {
        match self.repo_type {
            RepositoryType::Integration => Ok(()),
            RepositoryType::Resource => Err(RepositoryError::Unsupported {
                repo_type: self.repo_type,
                operation,
            }),
        }
    }

    /// The install link, or [`RepositoryError::NotInstalled`] if it is absent
    /// or not ours.
    fn installed_link(&self) -> Result<PathBuf> {
        match self.install_symlink() {
            Ok(link) if self.owns_link(&link) => Ok(link),
            Ok(link) if self.path_present(&link) => {
                warn!("{:?} does not belong to {}, leaving it alone", link, self.slug);
                Err(RepositoryError::NotInstalled { path: link })
            }
            Ok(link) => Err(RepositoryError::NotInstalled { path: link }),
            Err(RepositoryError::InvalidStructure { .. }) => Err(RepositoryError::NotInstalled {
                path: self.install_base_dir.clone(),
            }),
            Err(e) => Err(e),
        }
    }

    /// A symlink resolving into the working directory. Dangling links count.
    fn owns_link(&self, link: &Path) -> bool {
        if !self.runtime.is_symlink(link) {
            return false;
        }

        let working_dir = self.working_dir();
        if let Ok(target) = self.runtime.resolve_link(link) {
            // Links are created from the canonical component path
            target.starts_with(&working_dir)
                || self
                    .runtime
                    .canonicalize(&working_dir)
                    .is_ok_and(|canonical| target.starts_with(canonical))
        } else {
            debug!("Cannot read {:?}", link);
            false
        }
    }

    /// Exists, or is a symlink whose target is gone.
    fn path_present(&self, path: &Path) -> bool {
        self.runtime.is_symlink(path) || self.runtime.exists(path)
    }
}
