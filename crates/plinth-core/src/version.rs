//! Bundle version parsing, comparison, and range matching.
//!
//! Bundle versions follow the OSGi shape `major[.minor[.micro[.qualifier]]]`:
//! - Missing numeric components default to `0`
//! - Numeric components compare as numbers
//! - The qualifier compares as a plain string, and an empty qualifier sorts
//!   before any non-empty one (`1.0.0 < 1.0.0.v2024`)
//!
//! Anything else is rejected with [`PlinthError::AmbiguousVersion`] rather
//! than guessed at.

use std::fmt;
use std::str::FromStr;

use plinth_util::errors::PlinthError;

/// A parsed bundle version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BundleVersion {
    pub major: u64,
    pub minor: u64,
    pub micro: u64,
    pub qualifier: String,
}

impl BundleVersion {
    pub fn new(major: u64, minor: u64, micro: u64) -> Self {
        Self {
            major,
            minor,
            micro,
            qualifier: String::new(),
        }
    }

    pub fn parse(version: &str) -> miette::Result<Self> {
        Ok(version.parse::<Self>()?)
    }

    pub fn with_qualifier(mut self, qualifier: &str) -> Self {
        self.qualifier = qualifier.to_string();
        self
    }
}

impl FromStr for BundleVersion {
    type Err = PlinthError;

    fn from_str(version: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| PlinthError::AmbiguousVersion {
            version: version.to_string(),
            reason,
        };

        let trimmed = version.trim();
        if trimmed.is_empty() {
            return Err(invalid("version is empty".to_string()));
        }

        let mut parts = trimmed.splitn(4, '.');
        let mut numbers = [0u64; 3];
        for (slot, label) in numbers.iter_mut().zip(["major", "minor", "micro"]) {
            let Some(part) = parts.next() else { break };
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid(format!(
                    "{label} component '{part}' is not a non-negative integer"
                )));
            }
            *slot = part
                .parse()
                .map_err(|e| invalid(format!("{label} component '{part}': {e}")))?;
        }

        let qualifier = parts.next().unwrap_or("");
        if !qualifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(invalid(format!(
                "qualifier '{qualifier}' may only contain letters, digits, '_' and '-'"
            )));
        }
        if trimmed.matches('.').count() == 3 && qualifier.is_empty() {
            return Err(invalid("qualifier is empty".to_string()));
        }

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            micro: numbers[2],
            qualifier: qualifier.to_string(),
        })
    }
}

impl fmt::Display for BundleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if !self.qualifier.is_empty() {
            write!(f, ".{}", self.qualifier)?;
        }
        Ok(())
    }
}

/// How a bare version string (one that is not a range) is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BareVersion {
    /// `1.0` matches exactly `1.0.0`. Used for bundles named by the caller.
    Exact,
    /// `1.0` matches `1.0.0` and anything above. Used for requirement headers.
    #[default]
    Minimum,
}

/// A constraint on acceptable versions of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    Any,
    Exact(BundleVersion),
    AtLeast(BundleVersion),
    Range(VersionRange),
}

impl VersionConstraint {
    /// Parse an optional constraint string.
    ///
    /// `None` or a blank string is [`VersionConstraint::Any`]. Strings starting
    /// with `[` or `(` are ranges; anything else is a bare version interpreted
    /// according to `bare`.
    pub fn parse(spec: Option<&str>, bare: BareVersion) -> miette::Result<Self> {
        let Some(spec) = spec.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::Any);
        };

        if spec.starts_with('[') || spec.starts_with('(') {
            return Ok(Self::Range(VersionRange::parse(spec)?));
        }

        let version = BundleVersion::parse(spec)?;
        Ok(match bare {
            BareVersion::Exact => Self::Exact(version),
            BareVersion::Minimum => Self::AtLeast(version),
        })
    }

    /// Check if a version satisfies this constraint.
    pub fn matches(&self, version: &BundleVersion) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(v) => version == v,
            Self::AtLeast(v) => version >= v,
            Self::Range(range) => range.contains(version),
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any version"),
            Self::Exact(v) => write!(f, "{v}"),
            Self::AtLeast(v) => write!(f, ">={v}"),
            Self::Range(range) => write!(f, "{range}"),
        }
    }
}

/// A version interval.
///
/// Supports: `[1.0,2.0)`, `[1.0,)`, `(,2.0)`, `[1.5]` (exact).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: BundleVersion,
    pub inclusive: bool,
}

impl VersionRange {
    /// Parse a range expression. Bare versions are rejected.
    pub fn parse(spec: &str) -> miette::Result<Self> {
        let invalid = |reason: &str| PlinthError::AmbiguousVersion {
            version: spec.to_string(),
            reason: reason.to_string(),
        };

        let s = spec.trim();
        if !s.starts_with('[') && !s.starts_with('(') {
            return Err(invalid("range must start with '[' or '('").into());
        }
        if s.len() < 2 || !(s.ends_with(']') || s.ends_with(')')) {
            return Err(invalid("range must end with ']' or ')'").into());
        }

        let open_inclusive = s.starts_with('[');
        let close_inclusive = s.ends_with(']');
        let inner = &s[1..s.len() - 1];

        let range = if let Some((lower, upper)) = inner.split_once(',') {
            let bound = |text: &str, inclusive: bool| -> miette::Result<Option<Bound>> {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                Ok(Some(Bound {
                    version: BundleVersion::parse(text)?,
                    inclusive,
                }))
            };
            VersionRange {
                lower: bound(lower, open_inclusive)?,
                upper: bound(upper, close_inclusive)?,
            }
        } else {
            // Exact version: [1.0] means exactly 1.0
            if !open_inclusive || !close_inclusive {
                return Err(invalid("a single-version range must be written [v]").into());
            }
            let v = BundleVersion::parse(inner.trim())?;
            VersionRange {
                lower: Some(Bound {
                    version: v.clone(),
                    inclusive: true,
                }),
                upper: Some(Bound {
                    version: v,
                    inclusive: true,
                }),
            }
        };

        if let (Some(lower), Some(upper)) = (&range.lower, &range.upper) {
            if lower.version > upper.version {
                return Err(invalid("lower bound is above upper bound").into());
            }
        }
        Ok(range)
    }

    /// Check if a version falls inside this range.
    pub fn contains(&self, version: &BundleVersion) -> bool {
        if let Some(ref lower) = self.lower {
            if lower.inclusive {
                if *version < lower.version {
                    return false;
                }
            } else if *version <= lower.version {
                return false;
            }
        }
        if let Some(ref upper) = self.upper {
            if upper.inclusive {
                if *version > upper.version {
                    return false;
                }
            } else if *version >= upper.version {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = match &self.lower {
            Some(b) if !b.inclusive => '(',
            _ => '[',
        };
        let close = match &self.upper {
            Some(b) if b.inclusive => ']',
            _ => ')',
        };
        write!(f, "{open}")?;
        if let Some(b) = &self.lower {
            write!(f, "{}", b.version)?;
        }
        f.write_str(",")?;
        if let Some(b) = &self.upper {
            write!(f, "{}", b.version)?;
        }
        write!(f, "{close}")
    }
}
