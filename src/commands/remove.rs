use anyhow::{Context, Result};
use log::{debug, warn};

use crate::application::RepositoryOperations;
use crate::git::Git;
use crate::runtime::Runtime;

use super::config::Config;

/// Uninstall and delete a repository, then forget it.
#[tracing::instrument(skip(config))]
pub async fn remove<R: Runtime + 'static, G: Git + 'static>(
    config: &Config<R, G>,
    name: &str,
    yes: bool,
) -> Result<()> {
    let store = config.store();
    let (id, entry) = store.find_required(name)?;
    let ops = config.open(&entry)?;
    let working_dir = config.paths.clone_dir.join(ops.slug());

    if !yes {
        println!();
        println!("=== Removal Plan ===");
        println!();
        println!("Repository: {}", id);
        println!("  [DEL] {}", working_dir.display());
        println!();
        if !config.runtime.confirm("Proceed with removal?")? {
            println!("Removal cancelled.");
            return Ok(());
        }
    }

    if ops.is_cloned().await? {
        ops.remove()
            .await
            .with_context(|| format!("Failed to remove {}", id))?;
    } else {
        warn!("{} is not cloned at {:?}, only forgetting it", id, working_dir);
    }

    store.remove(&id)?;
    debug!("Removed {} from {:?}", id, store.path());
    println!("Removed {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockGit;
    use crate::runtime::MockRuntime;
    use std::path::PathBuf;

    const STORE: &str = r#"{"version": 1, "entries": {"github_com.user.foo": {"url": "https://github.com/user/foo", "type": "integration"}}}"#;

    #[tokio::test]
    async fn test_remove_cancelled() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .returning(|p| p.ends_with("gpm.json"));
        runtime
            .expect_read_to_string()
            .returning(|_| Ok(STORE.to_string()));
        runtime
            .expect_confirm()
            .times(1)
            .returning(|_| Ok(false));
        runtime.expect_remove_dir_all().never();
        runtime.expect_write().never();

        let config = Config::with_git(runtime, MockGit::new(), PathBuf::from("/config"));
        remove(&config, "foo", false).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_forgets_missing_clone() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .returning(|p| p.ends_with("gpm.json") || p.ends_with(".storage"));
        runtime
            .expect_read_to_string()
            .returning(|_| Ok(STORE.to_string()));
        runtime.expect_confirm().never();
        runtime.expect_remove_dir_all().never();
        runtime
            .expect_write()
            .withf(|_, contents| !String::from_utf8_lossy(contents).contains("github_com.user.foo"))
            .times(1)
            .returning(|_, _| Ok(()));
        runtime.expect_rename().times(1).returning(|_, _| Ok(()));

        let config = Config::with_git(runtime, MockGit::new(), PathBuf::from("/config"));
        remove(&config, "foo", true).await.unwrap();
    }
}
