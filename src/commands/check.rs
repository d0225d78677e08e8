use anyhow::{Result, bail};
use log::warn;

use crate::application::UpdateEntity;
use crate::git::Git;
use crate::runtime::Runtime;

use super::config::Config;

/// Fetch and compare installed and latest versions.
///
/// Checks every configured repository when `name` is `None`.
#[tracing::instrument(skip(config))]
pub async fn check<R: Runtime + 'static, G: Git + 'static>(
    config: &Config<R, G>,
    name: Option<&str>,
) -> Result<()> {
    let store = config.store();
    let entries = match name {
        Some(name) => vec![store.find_required(name)?],
        None => store.load_all()?,
    };

    if entries.is_empty() {
        println!("No repositories configured.");
        return Ok(());
    }

    let mut failed = 0;
    for (id, entry) in entries {
        let entity = UpdateEntity::new(config.open(&entry)?);
        match entity.check().await {
            Ok(status) if status.update_available => {
                println!(
                    "{}: {} -> {} (update available)",
                    id, status.installed, status.latest
                );
            }
            Ok(status) => println!("{}: {} (up to date)", id, status.installed),
            Err(e) => {
                warn!("Failed to check {}: {}", id, e);
                println!("{}: check failed: {}", id, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} repository(ies) could not be checked", failed);
    }
    Ok(())
}
