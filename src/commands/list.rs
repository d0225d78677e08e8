use anyhow::Result;
use log::debug;

use crate::application::{RepositoryOperations, UpdateEntity};
use crate::git::Git;
use crate::runtime::Runtime;

use super::config::Config;

/// List configured repositories with their installed version.
#[tracing::instrument(skip(config))]
pub async fn list<R: Runtime + 'static, G: Git + 'static>(config: &Config<R, G>) -> Result<()> {
    let entries = config.store().load_all()?;
    if entries.is_empty() {
        println!("No repositories configured.");
        return Ok(());
    }

    debug!("Found {} repository(ies)", entries.len());

    for (id, entry) in entries {
        let ops = config.open(&entry)?;
        let state = if !ops.is_cloned().await? {
            "missing"
        } else if ops.is_installed().await? {
            "installed"
        } else {
            "not installed"
        };

        let entity = UpdateEntity::new(ops);
        let version = match entity.installed_version().await {
            Ok(version) => version,
            Err(e) => {
                debug!("No version for {}: {}", id, e);
                "(unknown)".to_string()
            }
        };

        println!(
            "{} {} [{}, {}, {}]",
            id, version, entry.repo_type, entry.update_strategy, state
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockGit;
    use crate::runtime::MockRuntime;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_list_empty_store() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);

        let config = Config::with_git(runtime, MockGit::new(), PathBuf::from("/config"));
        assert!(list(&config).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_missing_clone() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .returning(|p| p.ends_with("gpm.json"));
        runtime.expect_read_to_string().returning(|_| {
            Ok(r#"{"version": 1, "entries": {"github_com.user.foo": {"url": "https://github.com/user/foo", "type": "integration"}}}"#.to_string())
        });

        let mut git = MockGit::new();
        git.expect_describe_tag().never();

        let config = Config::with_git(runtime, git, PathBuf::from("/config"));
        assert!(list(&config).await.is_ok());
    }
}
