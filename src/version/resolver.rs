//! Version resolution for cloned repositories.
//!
//! Turns the tag list and commit graph of a working copy into a single
//! "current" or "latest" version string according to an [`UpdateStrategy`].

use log::debug;
use std::path::Path;

use crate::git::Git;
use crate::repository::RepositoryError;

use super::{ParsedTag, TagVersion, UpdateStrategy};

/// Version resolver - stateless, operates on a working directory through [`Git`].
pub struct VersionResolver;

impl VersionResolver {
    /// Version of the checked-out working copy.
    ///
    /// Under [`UpdateStrategy::LatestCommit`] this is the full commit hash,
    /// otherwise the nearest reachable tag name.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::Describe`] if no tag is reachable under a tag strategy.
    pub fn current_version<G: Git + ?Sized>(
        git: &G,
        dir: &Path,
        strategy: UpdateStrategy,
    ) -> Result<String, RepositoryError> {
        if strategy.is_tag_based() {
            git.describe_tag(dir)
                .map_err(|source| RepositoryError::Describe {
                    path: dir.to_path_buf(),
                    source,
                })
        } else {
            Ok(git.head_commit(dir)?)
        }
    }

    /// Latest installable version of the repository.
    ///
    /// Tag strategies fall back to the default branch commit when no tag
    /// qualifies, so this succeeds for any repository with at least one commit.
    pub fn latest_version<G: Git + ?Sized>(
        git: &G,
        dir: &Path,
        strategy: UpdateStrategy,
    ) -> Result<String, RepositoryError> {
        if !strategy.is_tag_based() {
            return Ok(git.default_branch_commit(dir)?);
        }

        let tags = git.tags(dir)?;
        let include_unstable = strategy == UpdateStrategy::LatestUnstableTag;
        match Self::select_latest_tag(&tags, include_unstable) {
            Some(tag) => Ok(tag.to_string()),
            None => {
                debug!(
                    "No usable tag among {} tag(s) in {:?}, falling back to latest commit",
                    tags.len(),
                    dir
                );
                Ok(git.default_branch_commit(dir)?)
            }
        }
    }

    /// Highest semver tag in `tags`.
    ///
    /// Tags that do not parse are ignored. Pre-releases are only candidates
    /// when `include_unstable` is set. Among tags of equal precedence the one
    /// listed first wins.
    pub fn select_latest_tag(tags: &[String], include_unstable: bool) -> Option<&str> {
        let mut best: Option<(TagVersion, &str)> = None;

        for tag in tags {
            let ParsedTag::Valid(version) = ParsedTag::parse(tag) else {
                continue;
            };
            if version.is_prerelease() && !include_unstable {
                continue;
            }
            match &best {
                Some((current, _)) if version <= *current => {}
                _ => best = Some((version, tag.as_str())),
            }
        }

        best.map(|(_, tag)| tag)
    }
}
