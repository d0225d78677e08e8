use serde::{Deserialize, Serialize};
use std::fmt;

/// What a repository provides, which decides how it is installed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum RepositoryType {
    /// A hub integration, linked from `custom_components/<name>`.
    #[default]
    Integration,
    /// A frontend resource (single downloadable asset).
    Resource,
}

impl RepositoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepositoryType::Integration => "integration",
            RepositoryType::Resource => "resource",
        }
    }
}

impl fmt::Display for RepositoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&RepositoryType::Integration).unwrap(),
            "\"integration\""
        );
        let parsed: RepositoryType = serde_json::from_str("\"resource\"").unwrap();
        assert_eq!(parsed, RepositoryType::Resource);
    }

    #[test]
    fn test_display() {
        assert_eq!(RepositoryType::Integration.to_string(), "integration");
        assert_eq!(RepositoryType::Resource.to_string(), "resource");
    }
}
