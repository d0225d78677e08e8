use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use crate::repository::RepositoryType;
use crate::runtime::Runtime;

/// Directories derived from the hub configuration root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub root: PathBuf,
    /// `<root>/gpm`, one clone per repository.
    pub clone_dir: PathBuf,
    /// `<root>/custom_components`, where integrations are linked.
    pub install_dir: PathBuf,
    /// `<root>/www/gpm`, reserved for resources.
    pub resource_dir: PathBuf,
    /// `<root>/.storage/gpm.json`
    pub store_path: PathBuf,
}

impl Paths {
    pub fn new(root: PathBuf) -> Self {
        Self {
            clone_dir: root.join("gpm"),
            install_dir: root.join("custom_components"),
            resource_dir: root.join("www").join("gpm"),
            store_path: root.join(".storage").join("gpm.json"),
            root,
        }
    }

    /// Install base for repositories of the given type.
    pub fn install_dir_for(&self, repo_type: RepositoryType) -> PathBuf {
        match repo_type {
            RepositoryType::Integration => self.install_dir.clone(),
            RepositoryType::Resource => self.resource_dir.clone(),
        }
    }
}

/// Use `root` if given, otherwise the default configuration root.
#[tracing::instrument(skip(runtime))]
pub fn resolve_root<R: Runtime>(runtime: &R, root: Option<PathBuf>) -> Result<PathBuf> {
    let root = match root {
        Some(path) => path,
        None => default_root(runtime)?,
    };
    info!("Using configuration root: {}", root.display());
    Ok(root)
}

/// `/config` when privileged (container installs), otherwise
/// `~/.homeassistant`.
#[tracing::instrument(skip(runtime))]
pub fn default_root<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    if runtime.is_privileged() {
        Ok(system_root())
    } else {
        let home_dir = runtime
            .home_dir()
            .context("Could not find home directory")?;
        Ok(home_dir.join(".homeassistant"))
    }
}

#[cfg(not(windows))]
fn system_root() -> PathBuf {
    PathBuf::from("/config")
}

#[cfg(windows)]
fn system_root() -> PathBuf {
    PathBuf::from(r"C:\config")
}
