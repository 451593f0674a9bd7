//! Version allocation
//!
//! Versions are exact decimals with one fractional digit. Auto-increment adds
//! `0.1` to the running highest version; a forced major version replaces it
//! with `<N>.0`. All arithmetic goes through [`DecimalContext`], which carries
//! the precision instead of relying on process-wide state.

use crate::errors::VersionError;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Significant digits available to version arithmetic
pub const DEFAULT_PRECISION: u32 = 5;

/// Version given to the first package of an empty manifest
pub const BOOTSTRAP_VERSION: &str = "1.0";

/// Running version of an empty manifest, one step below [`BOOTSTRAP_VERSION`]
pub const EMPTY_MANIFEST_VERSION: &str = "0.9";

/// Precision settings for decimal version arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalContext {
    pub precision: u32,
}

impl Default for DecimalContext {
    fn default() -> Self {
        DecimalContext {
            precision: DEFAULT_PRECISION,
        }
    }
}

impl DecimalContext {
    pub fn new(precision: u32) -> Self {
        DecimalContext { precision }
    }

    /// Increment applied between consecutive auto-assigned versions
    pub fn step() -> Decimal {
        Decimal::new(1, 1)
    }

    /// Reject values that cannot be represented within the precision
    pub fn fit(&self, value: Decimal) -> Result<Decimal, VersionError> {
        let rounded = value.round_sf(self.precision).unwrap_or(value);
        if rounded == value {
            Ok(value)
        } else {
            Err(VersionError::PrecisionExceeded {
                value: value.to_string(),
                precision: self.precision,
            })
        }
    }
}

/// Parse a stored version string
pub fn parse_version(raw: &str) -> Result<Decimal, VersionError> {
    Decimal::from_str(raw.trim()).map_err(|_| VersionError::Invalid(raw.to_string()))
}

/// Render a version with exactly one fractional digit
pub fn format_version(value: Decimal) -> String {
    let mut value = value.round_dp(1);
    value.rescale(1);
    value.to_string()
}

/// Compute the version for the next accepted package.
///
/// `force_major` wins outright when it is positive and fits the precision. Otherwise an absent or
/// blank `current` bootstraps at [`BOOTSTRAP_VERSION`], and anything else is
/// bumped by exactly `0.1`.
pub fn next_version(
    current: Option<&str>,
    force_major: Option<u32>,
    ctx: &DecimalContext,
) -> Result<String, VersionError> {
    if let Some(major) = force_major.filter(|major| *major > 0) {
        return Ok(format_version(ctx.fit(Decimal::from(major))?));
    }

    let current = match current.map(str::trim) {
        None | Some("") => return Ok(BOOTSTRAP_VERSION.to_string()),
        Some(current) => current,
    };

    let value = parse_version(current)?;
    let next = value
        .checked_add(DecimalContext::step())
        .ok_or_else(|| VersionError::PrecisionExceeded {
            value: current.to_string(),
            precision: ctx.precision,
        })?;

    Ok(format_version(ctx.fit(next)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn next(current: Option<&str>, force: Option<u32>) -> String {
        next_version(current, force, &DecimalContext::default())
            .unwrap_or_else(|e| panic!("allocation failed: {e}"))
    }

    #[test]
    fn test_bootstrap() {
        assert_eq!(next(None, None), "1.0");
        assert_eq!(next(Some(""), None), "1.0");
        assert_eq!(next(Some(EMPTY_MANIFEST_VERSION), None), "1.0");
    }

    #[test]
    fn test_increments_are_exact() {
        let mut current = "1.0".to_string();
        let mut seen = Vec::new();
        for _ in 0..10 {
            current = next(Some(&current), None);
            seen.push(current.clone());
        }
        assert_eq!(
            seen,
            ["1.1", "1.2", "1.3", "1.4", "1.5", "1.6", "1.7", "1.8", "1.9", "2.0"]
        );
    }

    #[test]
    fn test_increment_crosses_major_boundaries() {
        assert_eq!(next(Some("9.9"), None), "10.0");
        assert_eq!(next(Some("12.0"), None), "12.1");
        assert_eq!(next(Some("2"), None), "2.1");
    }

    #[test]
    fn test_forced_major_ignores_current() {
        assert_eq!(next(Some("12.4"), Some(7)), "7.0");
        assert_eq!(next(None, Some(3)), "3.0");
    }

    #[test]
    fn test_forced_major_must_fit_precision() {
        assert_eq!(
            next_version(Some("1.0"), Some(123_456), &DecimalContext::default()),
            Err(VersionError::PrecisionExceeded {
                value: "123456".to_string(),
                precision: 5,
            })
        );
        assert!(next_version(None, Some(12_345), &DecimalContext::default())
            .is_ok_and(|v| v == "12345.0"));
    }

    #[test]
    fn test_zero_force_falls_back_to_increment() {
        assert_eq!(next(Some("1.4"), Some(0)), "1.5");
    }

    #[test]
    fn test_precision_is_enforced() {
        let narrow = DecimalContext::new(2);
        assert_eq!(
            next_version(Some("10.0"), None, &narrow),
            Err(VersionError::PrecisionExceeded {
                value: "10.1".to_string(),
                precision: 2,
            })
        );
        assert!(next_version(Some("9.8"), None, &narrow).is_ok_and(|v| v == "9.9"));
    }

    #[test]
    fn test_invalid_current_version() {
        assert_eq!(
            next_version(Some("abc"), None, &DecimalContext::default()),
            Err(VersionError::Invalid("abc".to_string()))
        );
    }

    #[test]
    fn test_format_version() {
        assert_eq!(format_version(Decimal::new(7, 0)), "7.0");
        assert_eq!(format_version(Decimal::new(110, 2)), "1.1");
    }
}
