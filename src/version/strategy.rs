use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy deciding which revision counts as "latest".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum UpdateStrategy {
    /// Highest stable semver tag.
    #[default]
    LatestTag,
    /// Highest semver tag, pre-releases included.
    LatestUnstableTag,
    /// Tip of the remote default branch.
    LatestCommit,
}

impl UpdateStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateStrategy::LatestTag => "latest_tag",
            UpdateStrategy::LatestUnstableTag => "latest_unstable_tag",
            UpdateStrategy::LatestCommit => "latest_commit",
        }
    }

    /// Whether versions are tag names (as opposed to commit hashes).
    pub fn is_tag_based(&self) -> bool {
        !matches!(self, UpdateStrategy::LatestCommit)
    }
}

impl fmt::Display for UpdateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
