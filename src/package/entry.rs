use serde::{Deserialize, Serialize};

use crate::repository::{RepositoryType, UpdateStrategy, slug, unique_id};

/// Persisted configuration of one managed repository.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    pub url: String,
    #[serde(rename = "type", default)]
    pub repo_type: RepositoryType,
    #[serde(default)]
    pub update_strategy: UpdateStrategy,
}

impl PackageEntry {
    pub fn new(
        url: impl Into<String>,
        repo_type: RepositoryType,
        update_strategy: UpdateStrategy,
    ) -> Self {
        Self {
            url: url.into(),
            repo_type,
            update_strategy,
        }
    }

    /// Stable identifier of the repository, see [`unique_id`].
    pub fn unique_id(&self) -> Option<String> {
        unique_id(&self.url)
    }

    pub fn slug(&self) -> String {
        slug(&self.url)
    }

    /// Whether `name` refers to this entry by URL (in any equivalent
    /// spelling) or slug.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim();
        if self.url == name || self.slug() == name {
            return true;
        }
        match (unique_id(name), self.unique_id()) {
            (Some(given), Some(own)) => given == own,
            _ => false,
        }
    }
}
