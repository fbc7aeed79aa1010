//! Build metadata.

use std::fmt;

const UNKNOWN: &str = "unknown";

/// Version details injected at compile time.
///
/// Set `TSDBD_VERSION`, `TSDBD_COMMIT` and `TSDBD_BRANCH` in the build
/// environment; any that are unset read as `"unknown"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub branch: &'static str,
}

impl BuildInfo {
    /// Product name printed by `version`.
    pub const PRODUCT: &'static str = "tsdb";

    /// Metadata baked into this binary.
    pub const fn current() -> Self {
        Self::new(
            option_env!("TSDBD_VERSION"),
            option_env!("TSDBD_COMMIT"),
            option_env!("TSDBD_BRANCH"),
        )
    }

    /// Metadata from optional parts, defaulting each missing or empty part.
    pub const fn new(
        version: Option<&'static str>,
        commit: Option<&'static str>,
        branch: Option<&'static str>,
    ) -> Self {
        Self {
            version: or_unknown(version),
            commit: or_unknown(commit),
            branch: or_unknown(branch),
        }
    }
}

const fn or_unknown(value: Option<&'static str>) -> &'static str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => UNKNOWN,
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} v{} (git: {} {})",
            Self::PRODUCT,
            self.version,
            self.branch,
            self.commit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parts_are_unknown() {
        let info = BuildInfo::new(None, Some(""), Some("main"));
        assert_eq!(info.version, "unknown");
        assert_eq!(info.commit, "unknown");
        assert_eq!(info.branch, "main");
    }

    #[test]
    fn display_format() {
        let info = BuildInfo::new(Some("1.2.0"), Some("abc123"), Some("main"));
        assert_eq!(info.to_string(), "tsdb v1.2.0 (git: main abc123)");
    }
}
