//! Metadata about the analyzer run that produced a listfile

use facet::Facet;
use std::fmt::{Display, Formatter};

/// Oldest Forcheck release whose listfiles are known to parse reliably.
pub const MIN_SUPPORTED_VERSION: ToolVersion = ToolVersion::new(14, 2, 0);

/// Release in which Forcheck swapped the culprit and location lines.
pub const CURRENT_FORMAT_SINCE: ToolVersion = ToolVersion::new(14, 1, 0);

/// Forcheck release number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
pub struct ToolVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ToolVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `V14.3.2` (as printed in Forcheck banners) or `14.3.2`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.strip_prefix('V').unwrap_or(text);
        let mut parts = text.splitn(3, '.');
        let major = parse_component(parts.next()?)?;
        let minor = parse_component(parts.next()?)?;
        let patch = parse_component(parts.next()?)?;
        Some(Self::new(major, minor, patch))
    }

    /// Releases are compared on major.minor only.
    pub fn is_supported(&self) -> bool {
        (self.major, self.minor) >= (MIN_SUPPORTED_VERSION.major, MIN_SUPPORTED_VERSION.minor)
    }

    pub fn version_string(&self) -> String {
        format!("Forcheck version {self}")
    }
}

/// Leading digits of a version component; Forcheck sometimes appends a
/// build letter to the patch level.
fn parse_component(part: &str) -> Option<u32> {
    let end = part
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(part.len());
    part[..end].parse().ok()
}

impl Display for ToolVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Meaning of a Forcheck exit status, for the statuses Forcheck documents.
pub fn exit_code_meaning(code: i32) -> Option<&'static str> {
    match code {
        0 => Some("no informative, warning, overflow or error messages presented"),
        2 => Some("informative, but no warning, overflow or error messages presented"),
        4 => Some("warning, but no overflow or error messages presented"),
        6 => Some("table overflow, but no error messages presented"),
        8 => Some("error messages presented"),
        _ => None,
    }
}

/// What the analyzer-invocation side knows about the run.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct RunData {
    pub exit_code: i32,
    pub exit_meaning: String,
    pub command: String,
    pub version_string: String,
}

impl RunData {
    pub fn new(exit_code: i32, command: impl Into<String>, version: &ToolVersion) -> Self {
        let exit_meaning = exit_code_meaning(exit_code)
            .map(str::to_string)
            .unwrap_or_else(|| format!("analyzer failed (exit code {exit_code})"));
        Self {
            exit_code,
            exit_meaning,
            command: command.into(),
            version_string: version.version_string(),
        }
    }

    /// Whether the exit status is one Forcheck documents as a normal finish.
    pub fn completed(&self) -> bool {
        exit_code_meaning(self.exit_code).is_some()
    }
}
