//! View types for rendering fortlens reports
//!
//! This crate turns a parsed [`ParserState`] into plain, serializable views:
//! the ranked event index, one page per diagnostic code and one annotated
//! page per source file. Renderers only ever see these types.

use facet::Facet;
use fortlens_core::{Anomaly, DiagnosticCode, EventInstance, ParserState, RunData, SourcePath};
use std::collections::BTreeMap;

/// Width the code label is right-aligned to in source callouts.
pub const CALLOUT_LABEL_WIDTH: usize = 5;

/// Link to the page of `code`, seen from a page `depth` directories deep.
pub fn event_url(code: DiagnosticCode, depth: usize) -> String {
    format!("{}event/{}.html", to_root(depth), code.slug())
}

/// Relative path from a page `depth` directories deep back to the root.
pub fn to_root(depth: usize) -> String {
    "../".repeat(depth)
}

/// Directory depth of a page path, e.g. `src/a/b.f90.html` is 2 deep.
pub fn page_depth(page_path: &str) -> usize {
    page_path.matches('/').count()
}

/// One row of the event index
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct ApiEvent {
    /// Display form, e.g. `123 E`
    pub code: String,
    pub number: u32,
    pub severity: String,
    pub message: String,
    pub count: usize,
    /// Link relative to the output root
    pub link: String,
}

impl ApiEvent {
    fn new(code: DiagnosticCode, message: &str, count: usize) -> Self {
        Self {
            code: code.to_string(),
            number: code.number(),
            severity: code.severity().to_string(),
            message: message.to_string(),
            count,
            link: event_url(code, 0),
        }
    }
}

/// One occurrence of a diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct ApiInstance {
    #[facet(default)]
    pub file: Option<String>,
    #[facet(default)]
    pub line: Option<u32>,
    #[facet(default)]
    pub culprit: Option<String>,
    #[facet(default)]
    pub details: Option<String>,
    /// Link to the annotated source, relative to the output root
    #[facet(default)]
    pub link: Option<String>,
}

impl From<&EventInstance> for ApiInstance {
    fn from(instance: &EventInstance) -> Self {
        Self {
            file: instance.file().map(|f| f.as_str().to_string()),
            line: instance.line(),
            culprit: instance.culprit().map(str::to_string),
            details: instance.details().map(str::to_string),
            link: instance.link(),
        }
    }
}

/// Everything known about one diagnostic code
#[derive(Debug, Clone, Facet)]
#[facet(rename_all = "camelCase")]
pub struct ApiEventPage {
    pub event: ApiEvent,
    /// Event pages live one directory below the root
    pub to_root: String,
    pub instances: Vec<ApiInstance>,
}

impl ApiEventPage {
    pub const DEPTH: usize = 1;

    /// Page for `code`, or `None` if it never occurred.
    pub fn build(state: &ParserState, code: DiagnosticCode) -> Option<Self> {
        let instances = state.instances(code);
        if instances.is_empty() {
            return None;
        }
        Some(Self {
            event: ApiEvent::new(code, state.message(code).unwrap_or_default(), instances.len()),
            to_root: to_root(Self::DEPTH),
            instances: instances.iter().map(ApiInstance::from).collect(),
        })
    }

    /// Pages for every reported code, in index order.
    pub fn all(state: &ParserState) -> Vec<Self> {
        state
            .ranked()
            .into_iter()
            .filter_map(|s| Self::build(state, s.code))
            .collect()
    }
}

/// A diagnostic shown inline on an annotated source line
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct ApiCallout {
    /// Code right-aligned to [`CALLOUT_LABEL_WIDTH`]
    pub label: String,
    pub culprit: String,
    pub message: String,
    /// Link to the event page, relative to the source page
    pub event_url: String,
}

/// All callouts attached to one source line
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct ApiCalloutLine {
    pub line: u32,
    pub callouts: Vec<ApiCallout>,
}

/// Annotated page for one source file
#[derive(Debug, Clone, Facet)]
#[facet(rename_all = "camelCase")]
pub struct ApiSourcePage {
    pub file: String,
    /// Page location relative to the output root
    pub path: String,
    pub depth: usize,
    pub to_root: String,
    /// Lines in ascending order; callouts on a line keep encounter order
    pub lines: Vec<ApiCalloutLine>,
}

impl ApiSourcePage {
    /// Page for `file`, or `None` if no event was attributed to it.
    pub fn build(state: &ParserState, file: &str) -> Option<Self> {
        let events = state.file_events(file);
        let first = events.first()?.file()?;
        Some(Self::from_events(state, first, events))
    }

    /// Pages for every file with attributed events, in path order.
    pub fn all(state: &ParserState) -> Vec<Self> {
        state
            .files()
            .map(|(path, events)| Self::from_events(state, path, events))
            .collect()
    }

    fn from_events(state: &ParserState, file: &SourcePath, events: &[EventInstance]) -> Self {
        let path = file.page_path();
        let depth = page_depth(&path);

        let mut by_line: BTreeMap<u32, Vec<ApiCallout>> = BTreeMap::new();
        for event in events {
            let code = event.code();
            by_line
                .entry(event.line().unwrap_or_default())
                .or_default()
                .push(ApiCallout {
                    label: format!("{:>width$}", code.to_string(), width = CALLOUT_LABEL_WIDTH),
                    culprit: event.culprit().unwrap_or_default().to_string(),
                    message: state.message(code).unwrap_or_default().to_string(),
                    event_url: event_url(code, depth),
                });
        }

        Self {
            file: file.as_str().to_string(),
            path,
            depth,
            to_root: to_root(depth),
            lines: by_line
                .into_iter()
                .map(|(line, callouts)| ApiCalloutLine { line, callouts })
                .collect(),
        }
    }
}

/// A file with at least one attributed event
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct ApiFileEntry {
    pub path: String,
    /// Annotated page relative to the output root
    pub page: String,
    pub events: usize,
}

/// Run-time inconsistency flagged for manual review
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct ApiAnomaly {
    /// `duplicate-message` or `summary-mismatch`
    pub kind: String,
    pub code: String,
    pub description: String,
}

impl From<&Anomaly> for ApiAnomaly {
    fn from(anomaly: &Anomaly) -> Self {
        let kind = match anomaly {
            Anomaly::DuplicateMessage { .. } => "duplicate-message",
            Anomaly::SummaryMismatch { .. } => "summary-mismatch",
        };
        Self {
            kind: kind.to_string(),
            code: anomaly.code().to_string(),
            description: anomaly.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct ApiTotal {
    pub label: String,
    pub count: u64,
}

/// How the analyzer run went
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
#[facet(rename_all = "camelCase")]
pub struct ApiRunData {
    pub exit_code: i32,
    pub exit_meaning: String,
    pub command: String,
    pub version_string: String,
    pub completed: bool,
}

impl From<&RunData> for ApiRunData {
    fn from(run: &RunData) -> Self {
        Self {
            exit_code: run.exit_code,
            exit_meaning: run.exit_meaning.clone(),
            command: run.command.clone(),
            version_string: run.version_string.clone(),
            completed: run.completed(),
        }
    }
}

/// The report index: ranked events, annotated files and run health
#[derive(Debug, Clone, Facet)]
#[facet(rename_all = "camelCase")]
pub struct ApiReport {
    /// Most frequent first
    pub events: Vec<ApiEvent>,
    pub files: Vec<ApiFileEntry>,
    pub totals: Vec<ApiTotal>,
    pub ignored: Vec<u32>,
    pub anomalies: Vec<ApiAnomaly>,
    pub anomaly_detected: bool,
    #[facet(default)]
    pub run: Option<ApiRunData>,
}

impl ApiReport {
    pub fn build(state: &ParserState, run: Option<&RunData>) -> Self {
        Self {
            events: state
                .ranked()
                .into_iter()
                .map(|s| ApiEvent::new(s.code, s.message, s.count))
                .collect(),
            files: state
                .files()
                .map(|(path, events)| ApiFileEntry {
                    path: path.as_str().to_string(),
                    page: path.page_path(),
                    events: events.len(),
                })
                .collect(),
            totals: state
                .totals()
                .iter()
                .map(|(label, &count)| ApiTotal {
                    label: label.clone(),
                    count,
                })
                .collect(),
            ignored: state.ignored().iter().copied().collect(),
            anomalies: state.anomalies().iter().map(ApiAnomaly::from).collect(),
            anomaly_detected: state.anomaly_detected(),
            run: run.map(ApiRunData::from),
        }
    }
}
