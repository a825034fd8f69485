//! Parser configuration, fixed for the lifetime of a parser

use crate::error::IgnoreListError;
use crate::run::{CURRENT_FORMAT_SINCE, ToolVersion};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Where the raw listfile is copied when the parse raises an anomaly.
pub const DEFAULT_DEBUG_COPY: &str = "forcheck_listfile.debug";

/// Layout of the two lines preceding a file-event marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Forcheck before 14.1: location tag directly above the marker,
    /// culprit above that.
    Legacy,
    /// Forcheck 14.1 and later: culprit directly above the marker,
    /// location tag above that.
    #[default]
    Current,
}

impl ReportFormat {
    pub fn for_version(version: &ToolVersion) -> Self {
        if (version.major, version.minor) < (CURRENT_FORMAT_SINCE.major, CURRENT_FORMAT_SINCE.minor)
        {
            ReportFormat::Legacy
        } else {
            ReportFormat::Current
        }
    }

    /// Split the lookback lines into `(culprit line, location line)`.
    pub fn assign<'a>(&self, previous: &'a str, before_previous: &'a str) -> (&'a str, &'a str) {
        match self {
            ReportFormat::Legacy => (before_previous, previous),
            ReportFormat::Current => (previous, before_previous),
        }
    }
}

/// How to handle a file event whose location tag cannot be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Attribution {
    /// Attribute it to the page's target file at line 0.
    #[default]
    BestEffort,
    /// Fail the parse.
    Strict,
}

/// Options for a [`ReportParser`](crate::ReportParser).
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub format: ReportFormat,
    /// Numeric codes to drop, whatever their severity.
    pub ignore: BTreeSet<u32>,
    pub attribution: Attribution,
    /// Destination for a copy of the raw listfile when an anomaly is found.
    pub debug_copy: Option<PathBuf>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            format: ReportFormat::default(),
            ignore: BTreeSet::new(),
            attribution: Attribution::default(),
            debug_copy: Some(PathBuf::from(DEFAULT_DEBUG_COPY)),
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn ignore(mut self, codes: impl IntoIterator<Item = u32>) -> Self {
        self.ignore.extend(codes);
        self
    }

    pub fn attribution(mut self, attribution: Attribution) -> Self {
        self.attribution = attribution;
        self
    }

    pub fn debug_copy(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.debug_copy = path.map(Into::into);
        self
    }
}

/// Parse a comma-separated list of numeric codes, e.g. `"234,153, 9"`.
///
/// Blank entries are skipped; duplicates collapse.
pub fn parse_ignore_list(list: &str) -> Result<BTreeSet<u32>, IgnoreListError> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry.parse::<u32>().map_err(|_| IgnoreListError {
                entry: entry.to_string(),
            })
        })
        .collect()
}
