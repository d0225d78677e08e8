//! Permissive semantic-version parsing of tag names.
//!
//! Repositories tag releases inconsistently (`v1.0.0`, `1.0.0`, `v2.0.0beta2`,
//! `2.0.0-rc.1`, `latest`, ...). Every tag is classified as either a
//! [`ParsedTag::Valid`] version or [`ParsedTag::Invalid`]; invalid tags are
//! simply not candidates for "latest".

use std::cmp::Ordering;

/// Result of parsing a tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedTag {
    Valid(TagVersion),
    Invalid,
}

impl ParsedTag {
    pub fn parse(tag: &str) -> Self {
        match TagVersion::parse(tag) {
            Some(version) => ParsedTag::Valid(version),
            None => ParsedTag::Invalid,
        }
    }

    pub fn valid(self) -> Option<TagVersion> {
        match self {
            ParsedTag::Valid(version) => Some(version),
            ParsedTag::Invalid => None,
        }
    }
}

/// A single dot/dash separated piece of a pre-release label.
///
/// Variant order matters: numeric identifiers sort below alphanumeric ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Identifier {
    Numeric(u64),
    AlphaNumeric(String),
}

/// `MAJOR.MINOR.PATCH[pre-release][+build]`.
///
/// Equality and ordering follow semver precedence, so build metadata is
/// carried along but never compared.
#[derive(Debug, Clone)]
pub struct TagVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Vec<Identifier>,
    pub build: Option<String>,
}

impl TagVersion {
    /// Parse a tag name, returning `None` for anything that is not a version.
    pub fn parse(tag: &str) -> Option<Self> {
        let s = tag.trim();
        let s = s.strip_prefix(['v', 'V']).unwrap_or(s);

        let (s, build) = match s.split_once('+') {
            Some((version, build)) => {
                if build.is_empty() || !build.chars().all(is_label_char) {
                    return None;
                }
                (version, Some(build.to_string()))
            }
            None => (s, None),
        };

        let (major, rest) = take_number(s)?;
        let rest = rest.strip_prefix('.')?;
        let (minor, rest) = take_number(rest)?;
        let rest = rest.strip_prefix('.')?;
        let (patch, rest) = take_number(rest)?;

        let pre = if rest.is_empty() {
            Vec::new()
        } else {
            parse_pre_release(rest)?
        };

        Some(Self {
            major,
            minor,
            patch,
            pre,
            build,
        })
    }

    /// Alpha, beta, dev, release candidates and any other pre-release label.
    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

impl PartialEq for TagVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TagVersion {}

impl PartialOrd for TagVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TagVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.pre.cmp(&other.pre),
            })
    }
}

fn is_label_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '-'
}

/// Split leading ASCII digits off `s`.
fn take_number(s: &str) -> Option<(u64, &str)> {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let number = s[..end].parse().ok()?;
    Some((number, &s[end..]))
}

/// Parse whatever follows the patch number.
///
/// A `-` separator allows any label (`1.0.0-0.3.7`); a `.` or no separator at
/// all requires a letter first so that `1.2.3.4` is not read as a pre-release.
fn parse_pre_release(rest: &str) -> Option<Vec<Identifier>> {
    let label = if let Some(label) = rest.strip_prefix('-') {
        label
    } else {
        let label = rest.strip_prefix('.').unwrap_or(rest);
        if !label.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return None;
        }
        label
    };

    if label.is_empty() || !label.chars().all(is_label_char) {
        return None;
    }

    let mut identifiers = Vec::new();
    for part in label.split(['.', '-']) {
        if part.is_empty() {
            return None;
        }
        split_alnum_runs(part, &mut identifiers)?;
    }
    Some(identifiers)
}

/// Break `beta2` into `beta`, `2` so that `beta10` sorts after `beta2`.
fn split_alnum_runs(part: &str, out: &mut Vec<Identifier>) -> Option<()> {
    let mut start = 0;
    let chars: Vec<(usize, char)> = part.char_indices().collect();
    for window in chars.windows(2) {
        let (_, a) = window[0];
        let (i, b) = window[1];
        if a.is_ascii_digit() != b.is_ascii_digit() {
            out.push(identifier(&part[start..i])?);
            start = i;
        }
    }
    out.push(identifier(&part[start..])?);
    Some(())
}

fn identifier(run: &str) -> Option<Identifier> {
    if run.chars().all(|c| c.is_ascii_digit()) {
        run.parse().ok().map(Identifier::Numeric)
    } else {
        Some(Identifier::AlphaNumeric(run.to_ascii_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(tag: &str) -> TagVersion {
        TagVersion::parse(tag).unwrap_or_else(|| panic!("{} should parse", tag))
    }

    #[test]
    fn test_parse_plain_and_prefixed() {
        let plain = v("1.2.3");
        assert_eq!((plain.major, plain.minor, plain.patch), (1, 2, 3));
        assert!(!plain.is_prerelease());
        assert_eq!(v("v1.2.3"), plain);
        assert_eq!(v("V1.2.3"), plain);
    }

    #[test]
    fn test_parse_attached_pre_release() {
        let beta = v("v2.0.0beta2");
        assert!(beta.is_prerelease());
        assert_eq!(
            beta.pre,
            vec![
                Identifier::AlphaNumeric("beta".into()),
                Identifier::Numeric(2)
            ]
        );
    }

    #[test]
    fn test_parse_separated_pre_release() {
        assert!(v("1.0.0-rc.1").is_prerelease());
        assert!(v("1.0.0.dev3").is_prerelease());
        assert!(v("1.0.0-alpha").is_prerelease());
        assert!(v("1.0.0-0.3.7").is_prerelease());
    }

    #[test]
    fn test_parse_build_metadata() {
        let version = v("1.0.0+build.5");
        assert_eq!(version.build.as_deref(), Some("build.5"));
        assert!(!version.is_prerelease());
        // Build metadata does not take part in precedence
        assert_eq!(version, v("1.0.0"));
    }

    #[test]
    fn test_invalid_tags() {
        for tag in [
            "",
            "latest",
            "v",
            "1",
            "1.2",
            "1.2.x",
            "1.2.3.4",
            "1.2.3-",
            "1.2.3+",
            "1.2.3-beta..1",
            "1.2.3 beta",
            "release-1.0.0",
            "99999999999999999999.0.0",
        ] {
            assert_eq!(
                ParsedTag::parse(tag),
                ParsedTag::Invalid,
                "expected {:?} to be invalid",
                tag
            );
        }
    }

    #[test]
    fn test_valid_accessor() {
        assert!(ParsedTag::parse("v1.0.0").valid().is_some());
        assert!(ParsedTag::parse("nightly").valid().is_none());
    }

    #[test]
    fn test_ordering_core_numbers() {
        assert!(v("v0.9.9") < v("v1.0.0"));
        assert!(v("1.10.0") > v("1.9.0"));
        assert!(v("1.0.10") > v("1.0.9"));
    }

    #[test]
    fn test_pre_release_sorts_below_release() {
        assert!(v("2.0.0beta2") < v("2.0.0"));
        assert!(v("2.0.0beta2") > v("1.0.0"));
    }

    #[test]
    fn test_pre_release_precedence() {
        let ordered = [
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-beta",
            "1.0.0-beta.2",
            "1.0.0-beta.11",
            "1.0.0-rc.1",
            "1.0.0",
        ];
        for pair in ordered.windows(2) {
            assert!(v(pair[0]) < v(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_attached_numbers_compare_numerically() {
        assert!(v("1.0.0beta10") > v("1.0.0beta2"));
    }

    #[test]
    fn test_numeric_identifier_below_alphanumeric() {
        assert!(v("1.0.0-1") < v("1.0.0-alpha"));
    }
}
