//! NuGet version-range expressions.
//!
//! Grammar accepted here:
//! - `*` — any version
//! - `1.2.3` — minimum version, inclusive, unbounded above
//! - `[1.0]` — exactly 1.0
//! - `[1.0,2.0)` and friends — interval with inclusive `[`/`]` or
//!   exclusive `(`/`)` endpoints; either bound may be omitted, as in
//!   `(,2.0]` or `[1.0,)`.

use std::fmt;
use std::str::FromStr;

use semver::Version;

use super::parse_lenient;

/// A malformed range expression. Fatal for the whole run: a rule that
/// cannot be parsed must not silently match nothing.
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseError {
    Empty,
    UnbalancedBrackets(String),
    ExclusiveExact(String),
    TooManyBounds(String),
    InvalidBound(String),
}

impl fmt::Display for RangeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeParseError::Empty => write!(f, "empty range expression"),
            RangeParseError::UnbalancedBrackets(expr) => {
                write!(f, "unbalanced brackets in range expression: {expr}")
            }
            RangeParseError::ExclusiveExact(expr) => {
                write!(
                    f,
                    "a single-version range must use inclusive brackets: {expr}"
                )
            }
            RangeParseError::TooManyBounds(expr) => {
                write!(f, "range expression has more than two bounds: {expr}")
            }
            RangeParseError::InvalidBound(bound) => {
                write!(f, "invalid version in range bound: {bound}")
            }
        }
    }
}

impl std::error::Error for RangeParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Endpoint {
    version: Version,
    inclusive: bool,
}

/// A parsed range expression, queryable with [`VersionRange::satisfies`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    min: Option<Endpoint>,
    max: Option<Endpoint>,
}

impl VersionRange {
    /// The wildcard range matching every version.
    pub fn any() -> Self {
        VersionRange {
            min: None,
            max: None,
        }
    }

    /// Whether `version` falls within this range. Pure bound comparison
    /// under SemVer precedence, so `2.0.0-beta` is inside `[1.0,2.0)`.
    pub fn satisfies(&self, version: &Version) -> bool {
        if let Some(min) = &self.min {
            let ok = if min.inclusive {
                *version >= min.version
            } else {
                *version > min.version
            };
            if !ok {
                return false;
            }
        }
        if let Some(max) = &self.max {
            let ok = if max.inclusive {
                *version <= max.version
            } else {
                *version < max.version
            };
            if !ok {
                return false;
            }
        }
        true
    }
}

fn parse_bound(text: &str, inclusive: bool) -> Result<Option<Endpoint>, RangeParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let version =
        parse_lenient(text).map_err(|_| RangeParseError::InvalidBound(text.to_string()))?;
    Ok(Some(Endpoint { version, inclusive }))
}

impl FromStr for VersionRange {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expr = s.trim();
        if expr.is_empty() {
            return Err(RangeParseError::Empty);
        }
        if expr == "*" {
            return Ok(VersionRange::any());
        }

        let starts_bracketed = expr.starts_with(['[', '(']);
        let ends_bracketed = expr.ends_with([']', ')']);
        if starts_bracketed != ends_bracketed {
            return Err(RangeParseError::UnbalancedBrackets(expr.to_string()));
        }

        // A bare version is a minimum bound, per NuGet range semantics.
        if !starts_bracketed {
            let min = parse_bound(expr, true)?;
            return Ok(VersionRange { min, max: None });
        }

        let min_inclusive = expr.starts_with('[');
        let max_inclusive = expr.ends_with(']');
        let inner = &expr[1..expr.len() - 1];

        let bounds: Vec<&str> = inner.split(',').collect();
        match bounds.as_slice() {
            [single] => {
                if !(min_inclusive && max_inclusive) {
                    return Err(RangeParseError::ExclusiveExact(expr.to_string()));
                }
                let exact = parse_bound(single, true)?;
                if exact.is_none() {
                    return Err(RangeParseError::InvalidBound(expr.to_string()));
                }
                Ok(VersionRange {
                    min: exact.clone(),
                    max: exact,
                })
            }
            [low, high] => Ok(VersionRange {
                min: parse_bound(low, min_inclusive)?,
                max: parse_bound(high, max_inclusive)?,
            }),
            _ => Err(RangeParseError::TooManyBounds(expr.to_string())),
        }
    }
}
