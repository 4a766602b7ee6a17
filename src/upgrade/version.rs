//! Version normalization and comparison.
//!
//! Release tags and build-time version strings arrive in loose shapes
//! (`v1.4.0`, `1.4.0`, `1.4.0 (abc123 2025-01-01)`, `dev`). [`normalize`]
//! reduces them to a [`NormalizedVersion`] or rejects them; rejection is how
//! development builds opt out of update checks.

use std::cmp::Ordering;

use semver::{BuildMetadata, Prerelease, Version};

/// A version string that passed normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedVersion {
    /// Form shown to users, without the leading `v` (e.g. `1.4.0`).
    pub display: String,
    /// Tag-style form with a leading `v` (e.g. `v1.4.0`).
    pub comparable: String,
    version: Version,
}

impl NormalizedVersion {
    /// The parsed semantic version.
    #[must_use]
    pub fn semver(&self) -> &Version {
        &self.version
    }
}

/// Normalize a raw version string.
///
/// Only the first whitespace-delimited token is considered and a single
/// leading `v` is stripped. Empty input, `dev` in any case and anything that
/// is not a semantic version yield `None`. `v1` and `v1.2` are accepted as
/// shorthand for `v1.0.0` and `v1.2.0`.
///
/// # Examples
///
/// ```rust
/// use updraft::upgrade::version::normalize;
///
/// let v = normalize("v1.4.0 (abc123)").unwrap();
/// assert_eq!(v.display, "1.4.0");
/// assert_eq!(v.comparable, "v1.4.0");
///
/// assert!(normalize("dev").is_none());
/// assert!(normalize("").is_none());
/// ```
#[must_use]
pub fn normalize(raw: &str) -> Option<NormalizedVersion> {
    let token = raw.split_whitespace().next()?;
    let display = token.strip_prefix('v').unwrap_or(token);
    if display.is_empty() || display.eq_ignore_ascii_case("dev") {
        return None;
    }

    let version = parse_semver(display)?;
    Some(NormalizedVersion {
        display: display.to_string(),
        comparable: format!("v{display}"),
        version,
    })
}

/// Compare two normalized versions by semantic-version precedence.
///
/// Pre-releases sort below their release; build metadata is ignored.
#[must_use]
pub fn compare(a: &NormalizedVersion, b: &NormalizedVersion) -> Ordering {
    let (a, b) = (a.semver(), b.semver());
    (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}

fn parse_semver(text: &str) -> Option<Version> {
    if let Ok(version) = Version::parse(text) {
        return Some(version);
    }

    // Shorthand: MAJOR or MAJOR.MINOR with nothing after it
    let parts: Vec<&str> = text.split('.').collect();
    if parts.len() > 2 || parts.iter().any(|p| !is_numeric_identifier(p)) {
        return None;
    }
    let major = parts[0].parse().ok()?;
    let minor = parts.get(1).map_or(Some(0), |p| p.parse().ok())?;

    Some(Version {
        major,
        minor,
        patch: 0,
        pre: Prerelease::EMPTY,
        build: BuildMetadata::EMPTY,
    })
}

fn is_numeric_identifier(part: &str) -> bool {
    !part.is_empty()
        && part.bytes().all(|b| b.is_ascii_digit())
        && (part == "0" || !part.starts_with('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(raw: &str) -> NormalizedVersion {
        normalize(raw).unwrap_or_else(|| panic!("{raw} should normalize"))
    }

    #[test]
    fn test_normalize_strips_prefix_and_metadata() {
        let n = v("v1.2.3");
        assert_eq!(n.display, "1.2.3");
        assert_eq!(n.comparable, "v1.2.3");

        let n = v("  1.2.3 (commit abc, built 2025-01-01) ");
        assert_eq!(n.display, "1.2.3");

        let n = v("1.3.0-rc.1");
        assert_eq!(n.comparable, "v1.3.0-rc.1");
    }

    #[test]
    fn test_dev_and_empty_builds_are_rejected() {
        for raw in ["", "   ", "dev", "DEV", "Dev", "vdev", "v", "dev 2025-01-01"] {
            assert!(normalize(raw).is_none(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_invalid_syntax_is_rejected() {
        for raw in ["latest", "1.2.3.4", "01.2.3", "1..2", "vv1.2.3", "1.2.x", "1.2-beta"] {
            assert!(normalize(raw).is_none(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_shorthand_versions() {
        assert_eq!(v("v1").semver(), &Version::new(1, 0, 0));
        assert_eq!(v("1.2").semver(), &Version::new(1, 2, 0));
        assert_eq!(v("1.2").display, "1.2");
        assert_eq!(compare(&v("1.2"), &v("1.2.0")), Ordering::Equal);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["v1.2.3", "1.2.3 extra", "2.0.0-beta.2+build.5", "v3", "0.9"] {
            let first = v(raw);
            assert_eq!(normalize(&first.display), Some(first.clone()));
            assert_eq!(normalize(&first.comparable), Some(first));
        }
    }

    #[test]
    fn test_compare_ordering() {
        assert_eq!(compare(&v("1.2.0"), &v("1.3.0")), Ordering::Less);
        assert_eq!(compare(&v("2.0.0"), &v("1.99.99")), Ordering::Greater);
        assert_eq!(compare(&v("1.0.0"), &v("v1.0.0")), Ordering::Equal);
        assert_eq!(compare(&v("1.0.0-rc.1"), &v("1.0.0")), Ordering::Less);
        assert_eq!(compare(&v("1.0.0-alpha"), &v("1.0.0-beta")), Ordering::Less);
        assert_eq!(compare(&v("1.0.0-alpha.2"), &v("1.0.0-alpha.10")), Ordering::Less);
    }

    #[test]
    fn test_compare_ignores_build_metadata() {
        assert_eq!(compare(&v("1.0.0+linux"), &v("1.0.0+darwin")), Ordering::Equal);
    }

    #[test]
    fn test_compare_is_total_and_antisymmetric() {
        let versions: Vec<_> = ["0.1.0", "1.0.0-alpha", "1.0.0", "1.0.1", "1.2", "2.0.0-rc.1", "2.0.0"]
            .iter()
            .map(|raw| v(raw))
            .collect();

        for a in &versions {
            assert_eq!(compare(a, a), Ordering::Equal);
            for b in &versions {
                assert_eq!(compare(a, b), compare(b, a).reverse());
            }
        }
    }
}
