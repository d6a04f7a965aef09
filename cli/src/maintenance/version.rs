//! # Tag Versions (`maintenance::version`)
//!
//! File: cli/src/maintenance/version.rs
//! Author: Christi Mahu
//!
//! Semantic version parsing for image tags, used to decide which tag of an
//! image is newest.
//!
//! Accepted form: an optional single leading `v`, then one to three numeric
//! release components without leading zeros (`1`, `1.4`, `1.4.2`; missing
//! components count as 0). Only a full `major.minor.patch` release may carry
//! a `-` pre-release of dot-separated identifiers or a `+` build suffix, so
//! variant tags such as `1.25-alpine` are rejected. Build metadata never
//! affects ordering.
//!
use crate::core::error::MaintError;
use std::cmp::Ordering;
use std::fmt;

/// A pre-release identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Identifier {
    Numeric(u64),
    AlphaNumeric(String),
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Identifier::Numeric(a), Identifier::Numeric(b)) => a.cmp(b),
            (Identifier::AlphaNumeric(a), Identifier::AlphaNumeric(b)) => a.cmp(b),
            (Identifier::Numeric(_), Identifier::AlphaNumeric(_)) => Ordering::Less,
            (Identifier::AlphaNumeric(_), Identifier::Numeric(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(n) => write!(f, "{}", n),
            Identifier::AlphaNumeric(s) => f.write_str(s),
        }
    }
}

/// Parsed version of an image tag.
#[derive(Debug, Clone)]
pub struct ImageVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pre: Vec<Identifier>,
    build: Option<String>,
}

impl ImageVersion {
    /// `0.0.0`, the starting point when looking for the newest tag.
    pub const BASELINE: ImageVersion = ImageVersion {
        major: 0,
        minor: 0,
        patch: 0,
        pre: Vec::new(),
        build: None,
    };

    /// Parses a tag such as `v1.2.0`, `1.21`, or `2.0.0-rc.1+build.5`.
    pub fn parse(tag: &str) -> Result<Self, MaintError> {
        let fail = |reason: String| MaintError::VersionParse {
            tag: tag.to_string(),
            reason,
        };

        let text = tag.strip_prefix('v').unwrap_or(tag);
        if text.is_empty() {
            return Err(fail("empty version".to_string()));
        }

        let (rest, build) = match text.split_once('+') {
            Some((rest, build)) => {
                validate_identifiers(build).map_err(|r| fail(format!("build metadata: {}", r)))?;
                (rest, Some(build.to_string()))
            }
            None => (text, None),
        };

        let (release, pre) = match rest.split_once('-') {
            Some((release, pre)) => {
                validate_identifiers(pre).map_err(|r| fail(format!("pre-release: {}", r)))?;
                if let Some(id) = pre
                    .split('.')
                    .find(|id| id.bytes().all(|b| b.is_ascii_digit()) && has_leading_zero(id))
                {
                    return Err(fail(format!("pre-release: '{}' has a leading zero", id)));
                }
                let pre = pre
                    .split('.')
                    .map(|id| match id.parse::<u64>() {
                        Ok(n) if id.bytes().all(|b| b.is_ascii_digit()) => Identifier::Numeric(n),
                        _ => Identifier::AlphaNumeric(id.to_string()),
                    })
                    .collect::<Vec<_>>();
                (release, pre)
            }
            None => (rest, Vec::new()),
        };

        let components: Vec<&str> = release.split('.').collect();
        if components.len() > 3 {
            return Err(fail(format!(
                "expected at most 3 release components, found {}",
                components.len()
            )));
        }
        // `1.25-alpine` is a variant of 1.25, not a pre-release of it.
        if (!pre.is_empty() || build.is_some()) && components.len() != 3 {
            return Err(fail(
                "a pre-release or build suffix needs major.minor.patch".to_string(),
            ));
        }
        let mut numbers = [0u64; 3];
        for (slot, component) in numbers.iter_mut().zip(&components) {
            if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
                return Err(fail(format!("'{}' is not a number", component)));
            }
            if has_leading_zero(component) {
                return Err(fail(format!("'{}' has a leading zero", component)));
            }
            *slot = component
                .parse()
                .map_err(|e| fail(format!("'{}': {}", component, e)))?;
        }

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            pre,
            build,
        })
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

fn validate_identifiers(text: &str) -> Result<(), String> {
    for id in text.split('.') {
        if id.is_empty() {
            return Err("empty identifier".to_string());
        }
        if let Some(c) = id.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-')) {
            return Err(format!("invalid character '{}' in '{}'", c, id));
        }
    }
    Ok(())
}

fn has_leading_zero(digits: &str) -> bool {
    digits.len() > 1 && digits.starts_with('0')
}

impl Ord for ImageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.pre.cmp(&other.pre),
            })
    }
}

impl PartialOrd for ImageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality follows precedence, so build metadata is ignored here too.
impl PartialEq for ImageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ImageVersion {}

impl fmt::Display for ImageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre.is_empty() {
            let pre: Vec<String> = self.pre.iter().map(ToString::to_string).collect();
            write!(f, "-{}", pre.join("."))?;
        }
        if let Some(build) = &self.build {
            write!(f, "+{}", build)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(tag: &str) -> ImageVersion {
        ImageVersion::parse(tag).unwrap()
    }

    #[test]
    fn test_parse_plain_and_prefixed() {
        let version = v("v1.2.3");
        assert_eq!((version.major, version.minor, version.patch), (1, 2, 3));
        assert_eq!(v("1.2.3"), version);
        assert_eq!(v("1.21"), v("1.21.0"));
        assert_eq!(v("7"), v("7.0.0"));
        assert_eq!(v("0.10.0"), v("0.10"));
        assert!(v("1.25.3-alpine").is_prerelease());
    }

    #[test]
    fn test_release_ordering() {
        assert!(v("1.2.0") > v("1.1.9"));
        assert!(v("1.10.0") > v("1.9.0"));
        assert!(v("2.0.0") > v("v1.99.99"));
        assert!(v("0.0.1") > ImageVersion::BASELINE);
        assert_eq!(v("0.0.0"), ImageVersion::BASELINE);
    }

    #[test]
    fn test_prerelease_ordering() {
        assert!(v("1.0.0-alpha") < v("1.0.0"));
        assert!(v("1.0.0-alpha") < v("1.0.0-alpha.1"));
        assert!(v("1.0.0-alpha.1") < v("1.0.0-alpha.beta"));
        assert!(v("1.0.0-beta.2") < v("1.0.0-beta.11"));
        assert!(v("1.0.0-rc.1") < v("1.0.0"));
        assert!(v("1.0.0-rc.1").is_prerelease());
        assert!(!v("1.0.0").is_prerelease());
    }

    #[test]
    fn test_build_metadata_ignored() {
        assert_eq!(v("1.0.0+20240101"), v("1.0.0+exp.sha.5114f85"));
        assert_eq!(v("1.0.0-rc.1+build.5").to_string(), "1.0.0-rc.1+build.5");
    }

    #[test]
    fn test_invalid_tags() {
        for tag in [
            "latest", "", "v", "1.2.3.4", "1..2", "1.x", "vv1.0.0", "1.0.0-", "1.0.0+", "1.0.0-rc..1", "stable-alpine",
            "1.25-alpine", "7-alpine", "1.2+build", "01.2.3", "1.02", "1.0.0-rc.01",
        ] {
            let err = ImageVersion::parse(tag).unwrap_err();
            assert!(
                matches!(err, MaintError::VersionParse { tag: ref t, .. } if t == tag),
                "expected parse failure for {:?}",
                tag
            );
        }
    }
}
