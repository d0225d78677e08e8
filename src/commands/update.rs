use anyhow::{Context, Result};

use crate::application::UpdateEntity;
use crate::git::Git;
use crate::runtime::Runtime;

use super::config::Config;

/// Switch a repository to `version`, or to its latest version.
#[tracing::instrument(skip(config))]
pub async fn update<R: Runtime + 'static, G: Git + 'static>(
    config: &Config<R, G>,
    name: &str,
    version: Option<String>,
    backup: bool,
) -> Result<()> {
    let (id, entry) = config.store().find_required(name)?;
    let entity = UpdateEntity::new(config.open(&entry)?);

    let notice = entity
        .install(version, backup)
        .await
        .with_context(|| format!("Failed to update {}", id))?;

    println!(
        "Updated {} to {}. Restart Home Assistant to load the new version.",
        notice.component, notice.version
    );
    Ok(())
}
