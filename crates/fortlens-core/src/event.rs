//! Individual diagnostic occurrences

use crate::code::DiagnosticCode;
use facet::Facet;
use std::borrow::Borrow;
use std::fmt::{Display, Formatter};

/// Path of an analysed source file, as printed by Forcheck.
///
/// Never contains a `..` segment, so it can be mapped to an output page
/// without escaping the output directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
pub struct SourcePath {
    path: String,
}

impl SourcePath {
    /// Returns `None` for empty paths and paths with parent-directory segments.
    pub fn new(path: impl Into<String>) -> Option<Self> {
        let path = path.into();
        if path.is_empty() || path.split(['/', '\\']).any(|segment| segment == "..") {
            return None;
        }
        Some(Self { path })
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Location of the annotated-source page, relative to the output root.
    pub fn page_path(&self) -> String {
        format!("src/{}.html", self.path.replace(' ', "_"))
    }
}

impl Display for SourcePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

impl AsRef<str> for SourcePath {
    fn as_ref(&self) -> &str {
        &self.path
    }
}

impl Borrow<str> for SourcePath {
    fn borrow(&self) -> &str {
        &self.path
    }
}

/// One occurrence of a diagnostic.
///
/// File events carry a location and a culprit excerpt; global events carry
/// free-text details instead. Instances are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct EventInstance {
    code: DiagnosticCode,
    file: Option<SourcePath>,
    line: Option<u32>,
    culprit: Option<String>,
    details: Option<String>,
}

impl EventInstance {
    /// An event attributed to a source location. Line 0 means "unknown line".
    pub fn file_event(
        code: DiagnosticCode,
        file: Option<SourcePath>,
        line: u32,
        culprit: impl Into<String>,
    ) -> Self {
        Self {
            code,
            file,
            line: Some(line),
            culprit: Some(culprit.into()),
            details: None,
        }
    }

    /// A program-wide event from the global analysis section.
    pub fn global_event(code: DiagnosticCode, details: impl Into<String>) -> Self {
        Self {
            code,
            file: None,
            line: None,
            culprit: None,
            details: Some(details.into()),
        }
    }

    pub fn code(&self) -> DiagnosticCode {
        self.code
    }

    pub fn file(&self) -> Option<&SourcePath> {
        self.file.as_ref()
    }

    /// 1-based line number; `Some(0)` when the listfile gave no location.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    pub fn culprit(&self) -> Option<&str> {
        self.culprit.as_deref()
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn is_global(&self) -> bool {
        self.details.is_some()
    }

    /// Link to this occurrence on its annotated-source page.
    pub fn link(&self) -> Option<String> {
        let file = self.file.as_ref()?;
        Some(format!(
            "{}#line-{}",
            file.page_path(),
            self.line.unwrap_or_default()
        ))
    }
}
