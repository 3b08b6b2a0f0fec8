use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;

use crate::error::AirgapError;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    // ASCII digits only; `\d` would admit other Unicode digits.
    Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+$").expect("static version regex")
});

/// Prefix of the tags that anchor baseline artifacts.
pub const BASELINE_TAG_PREFIX: &str = "baseline-";

/// A `MAJOR.MINOR.PATCH` version string, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version(String);

impl Version {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the tag marking this baseline, e.g. `baseline-1.0.0`.
    #[must_use]
    pub fn baseline_tag(&self) -> String {
        format!("{BASELINE_TAG_PREFIX}{}", self.0)
    }
}

impl FromStr for Version {
    type Err = AirgapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if VERSION_RE.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(AirgapError::InvalidVersion(s.to_string()))
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
