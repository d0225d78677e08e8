use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::SharedRepositoryManager;
use crate::git::{Git, GitCli};
use crate::package::{PackageEntry, PackageStore};
use crate::repository::RepositoryManager;
use crate::runtime::Runtime;

use super::paths::{Paths, resolve_root};

/// Dependencies and locations shared by all commands.
pub struct Config<R: Runtime, G: Git> {
    pub runtime: Arc<R>,
    pub git: Arc<G>,
    pub paths: Paths,
}

impl<R: Runtime> Config<R, GitCli> {
    /// Configuration backed by the `git` executable. `GPM_GIT` overrides its path.
    pub fn new(runtime: R, root: Option<PathBuf>) -> Result<Self> {
        let root = resolve_root(&runtime, root)?;
        let git = match runtime.env_var("GPM_GIT") {
            Ok(program) => GitCli::with_program(program),
            Err(_) => GitCli::new(),
        };
        Ok(Self::with_git(runtime, git, root))
    }
}

impl<R: Runtime, G: Git> Config<R, G> {
    pub fn with_git(runtime: R, git: G, root: PathBuf) -> Self {
        Self {
            runtime: Arc::new(runtime),
            git: Arc::new(git),
            paths: Paths::new(root),
        }
    }

    pub fn store(&self) -> PackageStore<'_, R> {
        PackageStore::new(self.runtime.as_ref(), self.paths.store_path.clone())
    }
}

impl<R: Runtime + 'static, G: Git + 'static> Config<R, G> {
    /// Manager for a configured (or about to be configured) repository.
    pub fn open(&self, entry: &PackageEntry) -> Result<SharedRepositoryManager<Arc<R>, Arc<G>>> {
        let manager = RepositoryManager::new(
            Arc::clone(&self.runtime),
            Arc::clone(&self.git),
            entry.url.clone(),
            entry.repo_type,
            self.paths.clone_dir.clone(),
            self.paths.install_dir_for(entry.repo_type),
            entry.update_strategy,
        )?;
        Ok(SharedRepositoryManager::new(manager))
    }
}
