//! Async, serialized access to a [`RepositoryManager`].
//!
//! Every operation takes the per-instance lock, then runs the synchronous
//! manager body on the blocking pool. The precondition check and the effect
//! of one call therefore never interleave with another call on the same
//! repository, and slow git/network work never stalls the async runtime.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::git::Git;
use crate::repository::{RepositoryError, RepositoryManager, Result, UpdateStrategy};
use crate::runtime::Runtime;

/// Repository operations as seen by the setup flow, the update entity and
/// the CLI.
///
/// Abstracted so the orchestration can be tested against mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryOperations: Send + Sync {
    /// On-disk directory name of the repository.
    fn slug(&self) -> String;

    async fn is_cloned(&self) -> Result<bool>;
    async fn is_installed(&self) -> Result<bool>;

    async fn clone_repo(&self) -> Result<()>;
    async fn fetch(&self) -> Result<()>;
    async fn checkout(&self, reference: String) -> Result<()>;
    async fn install(&self) -> Result<()>;
    async fn uninstall(&self) -> Result<()>;
    async fn remove(&self) -> Result<()>;

    async fn current_version(&self) -> Result<String>;
    async fn latest_version(&self) -> Result<String>;
    async fn component_name(&self) -> Result<String>;

    async fn update_strategy(&self) -> Result<UpdateStrategy>;
    async fn set_update_strategy(&self, strategy: UpdateStrategy) -> Result<()>;
}

/// A [`RepositoryManager`] behind an async lock, cheap to clone and share
/// between tasks.
pub struct SharedRepositoryManager<R: Runtime + 'static, G: Git + 'static> {
    inner: Arc<Mutex<RepositoryManager<R, G>>>,
    slug: String,
}

impl<R: Runtime + 'static, G: Git + 'static> Clone for SharedRepositoryManager<R, G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            slug: self.slug.clone(),
        }
    }
}

impl<R: Runtime + 'static, G: Git + 'static> SharedRepositoryManager<R, G> {
    pub fn new(manager: RepositoryManager<R, G>) -> Self {
        let slug = manager.slug().to_string();
        Self {
            inner: Arc::new(Mutex::new(manager)),
            slug,
        }
    }

    /// Run `op` with exclusive access to the manager on the blocking pool.
    pub async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut RepositoryManager<R, G>) -> Result<T> + Send + 'static,
    {
        let mut guard = Arc::clone(&self.inner).lock_owned().await;
        tokio::task::spawn_blocking(move || op(&mut guard))
            .await
            .map_err(|e| {
                RepositoryError::Filesystem(anyhow!(e).context(format!(
                    "repository task for {} did not complete",
                    self.slug
                )))
            })?
    }
}

#[async_trait]
impl<R: Runtime + 'static, G: Git + 'static> RepositoryOperations
    for SharedRepositoryManager<R, G>
{
    fn slug(&self) -> String {
        self.slug.clone()
    }

    async fn is_cloned(&self) -> Result<bool> {
        self.run(|m| Ok(m.is_cloned())).await
    }

    async fn is_installed(&self) -> Result<bool> {
        self.run(|m| Ok(m.is_installed())).await
    }

    async fn clone_repo(&self) -> Result<()> {
        self.run(|m| RepositoryManager::clone(m)).await
    }

    async fn fetch(&self) -> Result<()> {
        self.run(|m| m.fetch()).await
    }

    async fn checkout(&self, reference: String) -> Result<()> {
        self.run(move |m| m.checkout(&reference)).await
    }

    async fn install(&self) -> Result<()> {
        self.run(|m| m.install()).await
    }

    async fn uninstall(&self) -> Result<()> {
        self.run(|m| m.uninstall()).await
    }

    async fn remove(&self) -> Result<()> {
        self.run(|m| m.remove()).await
    }

    async fn current_version(&self) -> Result<String> {
        self.run(|m| m.current_version()).await
    }

    async fn latest_version(&self) -> Result<String> {
        self.run(|m| m.latest_version()).await
    }

    async fn component_name(&self) -> Result<String> {
        self.run(|m| m.component_name()).await
    }

    async fn update_strategy(&self) -> Result<UpdateStrategy> {
        self.run(|m| Ok(m.update_strategy())).await
    }

    async fn set_update_strategy(&self, strategy: UpdateStrategy) -> Result<()> {
        self.run(move |m| {
            m.set_update_strategy(strategy);
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockGit;
    use crate::repository::{COMPONENTS_DIR, RepositoryType};
    use crate::runtime::RealRuntime;
    use std::fs;
    use tempfile::tempdir;

    fn shared(root: &std::path::Path) -> SharedRepositoryManager<RealRuntime, MockGit> {
        let mut git = MockGit::new();
        git.expect_clone_repo().returning(|_, dest| {
            fs::create_dir_all(dest.join(".git")).unwrap();
            fs::create_dir_all(dest.join(COMPONENTS_DIR).join("awesome")).unwrap();
            Ok(())
        });
        git.expect_tags()
            .returning(|_| Ok(vec!["v1.0.0".into(), "v1.1.0-rc1".into()]));
        let manager = RepositoryManager::new(
            RealRuntime,
            git,
            "https://github.com/user/awesome-component.git",
            RepositoryType::Integration,
            root.join("gpm"),
            root.join("custom_components"),
            UpdateStrategy::LatestTag,
        )
        .unwrap();
        SharedRepositoryManager::new(manager)
    }

    #[tokio::test]
    async fn test_operations_run_through_manager() {
        let root = tempdir().unwrap();
        let ops = shared(root.path());

        assert_eq!(ops.slug(), "awesome-component");
        assert!(!ops.is_cloned().await.unwrap());

        ops.clone_repo().await.unwrap();
        assert!(ops.is_cloned().await.unwrap());
        assert_eq!(ops.component_name().await.unwrap(), "awesome");

        ops.install().await.unwrap();
        assert!(ops.is_installed().await.unwrap());

        ops.remove().await.unwrap();
        assert!(!ops.is_cloned().await.unwrap());
        assert!(!ops.is_installed().await.unwrap());
    }

    #[tokio::test]
    async fn test_strategy_change_is_shared_between_clones() {
        let root = tempdir().unwrap();
        let ops = shared(root.path());
        let other = ops.clone();
        ops.clone_repo().await.unwrap();

        assert_eq!(other.latest_version().await.unwrap(), "v1.0.0");

        ops.set_update_strategy(UpdateStrategy::LatestUnstableTag)
            .await
            .unwrap();
        assert_eq!(
            other.update_strategy().await.unwrap(),
            UpdateStrategy::LatestUnstableTag
        );
        assert_eq!(other.latest_version().await.unwrap(), "v1.1.0-rc1");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_installs_are_serialized() {
        let root = tempdir().unwrap();
        let ops = shared(root.path());
        ops.clone_repo().await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ops = ops.clone();
                tokio::spawn(async move { ops.install().await })
            })
            .collect();

        let mut installed = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => installed += 1,
                Err(RepositoryError::AlreadyInstalled { .. }) => rejected += 1,
                Err(other) => panic!("Unexpected error: {:?}", other),
            }
        }

        assert_eq!(installed, 1);
        assert_eq!(rejected, 7);
    }

    #[tokio::test]
    async fn test_panicking_operation_becomes_error() {
        let root = tempdir().unwrap();
        let ops = shared(root.path());

        let result: Result<()> = ops.run(|_| panic!("boom")).await;
        assert!(matches!(result, Err(RepositoryError::Filesystem(_))));

        // Lock is released again
        assert!(!ops.is_cloned().await.unwrap());
    }
}
