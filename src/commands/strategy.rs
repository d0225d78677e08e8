use anyhow::Result;

use crate::git::Git;
use crate::repository::UpdateStrategy;
use crate::runtime::Runtime;

use super::config::Config;

/// Persist a new update strategy for a configured repository.
#[tracing::instrument(skip(config))]
pub fn strategy<R: Runtime, G: Git>(
    config: &Config<R, G>,
    name: &str,
    strategy: UpdateStrategy,
) -> Result<()> {
    let store = config.store();
    let (id, entry) = store.find_required(name)?;

    if entry.update_strategy == strategy {
        println!("{} already uses {}", id, strategy);
        return Ok(());
    }

    store.set_strategy(&id, strategy)?;
    println!(
        "{}: update strategy changed from {} to {}",
        id, entry.update_strategy, strategy
    );
    Ok(())
}
