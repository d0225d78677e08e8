//! Identifiers derived from repository URLs.
//!
//! Both functions are pure: equivalent spellings of a URL (trailing `/`,
//! trailing `.git`) always map to the same value.

/// Short directory name for a repository: the last `/`-separated segment of
/// the URL with trailing slashes and a `.git` suffix removed.
///
/// `https://github.com/user/foo.git`, `https://github.com/user/foo` and
/// `https://github.com/user/foo/` all yield `foo`.
pub fn slug(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}

/// Whether `slug` can be used as a directory name inside the clone base.
pub(crate) fn is_usable_slug(slug: &str) -> bool {
    !slug.is_empty() && slug != "." && slug != ".." && !slug.contains(['/', '\\'])
}

/// Stable identifier used to detect duplicate configuration of one repository.
///
/// Host, owner path and repository name, lower-cased and joined with `.`;
/// dots in the host become `_`. `github.com/user/foo.git` becomes
/// `github_com.user.foo`. Scheme, credentials and scp-style `host:path`
/// syntax are normalised away.
///
/// Returns `None` when the URL has no path below the host.
///
/// Parsed by hand rather than with the `url` crate, which rejects scp-style
/// `git@host:owner/repo` remotes and bare local paths.
pub fn unique_id(url: &str) -> Option<String> {
    let url = url.trim();

    let without_scheme = match url.split_once("://") {
        Some((_, rest)) => rest.to_string(),
        None => scp_to_path(url),
    };

    let trimmed = without_scheme.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    let mut segments = trimmed.split('/').filter(|s| !s.is_empty());
    let host = segments.next()?;
    let host = host.rsplit('@').next().unwrap_or(host);

    let mut parts = vec![host.to_lowercase().replace(['.', ':'], "_")];
    parts.extend(segments.map(str::to_lowercase));

    if parts.len() < 2 || parts[0].is_empty() {
        return None;
    }

    Some(parts.join("."))
}

/// `git@host:owner/repo` -> `git@host/owner/repo`; anything else unchanged.
fn scp_to_path(url: &str) -> String {
    match (url.find(':'), url.find('/')) {
        (Some(colon), Some(slash)) if colon < slash => {
            format!("{}/{}", &url[..colon], &url[colon + 1..])
        }
        (Some(colon), None) => format!("{}/{}", &url[..colon], &url[colon + 1..]),
        _ => url.to_string(),
    }
}
