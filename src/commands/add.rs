use anyhow::{Context, Result};
use log::debug;

use crate::application::{SetupError, SetupFlow};
use crate::git::Git;
use crate::package::PackageEntry;
use crate::repository::{RepositoryType, UpdateStrategy};
use crate::runtime::Runtime;

use super::config::Config;

/// Clone, install and register a repository.
#[tracing::instrument(skip(config))]
pub async fn add<R: Runtime + 'static, G: Git + 'static>(
    config: &Config<R, G>,
    url: &str,
    repo_type: RepositoryType,
    strategy: UpdateStrategy,
) -> Result<()> {
    let entry = PackageEntry::new(url.trim(), repo_type, strategy);
    let id = entry
        .unique_id()
        .with_context(|| format!("Cannot derive an identifier from URL '{}'", url))?;

    let store = config.store();
    if store.get(&id)?.is_some() {
        return Err(SetupError::already_configured()).with_context(|| format!("Cannot add {}", id));
    }

    debug!("Setting up {} as {}", url, id);
    let ops = config.open(&entry)?;
    let outcome = SetupFlow::new(&ops)
        .run()
        .await
        .with_context(|| format!("Failed to set up {}", url))?;

    store.add(entry.clone())?;
    println!(
        "Installed {} {} ({}, {})",
        entry.slug(),
        outcome.version,
        id,
        strategy
    );
    Ok(())
}
