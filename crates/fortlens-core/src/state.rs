//! Aggregation of decoded events

use crate::code::DiagnosticCode;
use crate::event::{EventInstance, SourcePath};
use facet::Facet;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use tracing::debug;

/// An internal inconsistency found while parsing.
///
/// Anomalies never change the aggregated data; they flag the run for
/// manual review.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
#[repr(u8)]
pub enum Anomaly {
    /// The same code was reported with two different messages.
    DuplicateMessage {
        code: DiagnosticCode,
        first: String,
        second: String,
    },
    /// Forcheck's own end-of-run tally disagrees with the parsed count.
    SummaryMismatch {
        code: DiagnosticCode,
        local: usize,
        reported: usize,
    },
}

impl Anomaly {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Anomaly::DuplicateMessage { code, .. } | Anomaly::SummaryMismatch { code, .. } => *code,
        }
    }
}

impl Display for Anomaly {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Anomaly::DuplicateMessage { code, first, second } => write!(
                f,
                "different messages for event code ({code}): {first:?} vs {second:?}"
            ),
            Anomaly::SummaryMismatch {
                code,
                local,
                reported,
            } => write!(
                f,
                "parsed results do not match forcheck summary ({code}): found {local}, summary states {reported}"
            ),
        }
    }
}

/// A code with its message and number of occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSummary<'a> {
    pub code: DiagnosticCode,
    pub message: &'a str,
    pub count: usize,
}

/// Everything decoded from one listfile.
///
/// Built by a single pass of [`ReportParser`](crate::ReportParser); treat it
/// as read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ParserState {
    messages: BTreeMap<DiagnosticCode, String>,
    counts: BTreeMap<DiagnosticCode, usize>,
    instances: BTreeMap<DiagnosticCode, Vec<EventInstance>>,
    file_events: BTreeMap<SourcePath, Vec<EventInstance>>,
    ignored: BTreeSet<u32>,
    anomalies: Vec<Anomaly>,
    totals: BTreeMap<String, u64>,
}

impl ParserState {
    pub fn new(ignored: impl IntoIterator<Item = u32>) -> Self {
        Self {
            ignored: ignored.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Whether events with this code are dropped, whatever their severity.
    pub fn is_ignored(&self, code: DiagnosticCode) -> bool {
        self.ignored.contains(&code.number())
    }

    /// Record an event attributed to a source location.
    pub fn record_file_event(
        &mut self,
        file: Option<SourcePath>,
        line: u32,
        code: DiagnosticCode,
        message: &str,
        culprit: impl Into<String>,
    ) {
        if self.is_ignored(code) {
            return;
        }
        let instance = EventInstance::file_event(code, file.clone(), line, culprit);
        if let Some(file) = file {
            self.file_events
                .entry(file)
                .or_default()
                .push(instance.clone());
        }
        self.store(code, message, instance);
    }

    /// Record a program-wide event.
    pub fn record_global_event(
        &mut self,
        code: DiagnosticCode,
        message: &str,
        details: impl Into<String>,
    ) {
        if self.is_ignored(code) {
            return;
        }
        let instance = EventInstance::global_event(code, details);
        self.store(code, message, instance);
    }

    /// Record one of the `number of <label>: <count>` totals.
    pub fn record_summary_total(&mut self, label: impl Into<String>, count: u64) {
        self.totals.insert(label.into(), count);
    }

    /// Compare Forcheck's tally for `code` with the parsed count.
    ///
    /// A mismatch is recorded as an anomaly; the parsed count is kept.
    /// Returns whether the tally agreed (ignored codes always agree).
    pub fn reconcile_tally(&mut self, code: DiagnosticCode, reported: usize) -> bool {
        if self.is_ignored(code) {
            return true;
        }
        let local = self.count(code);
        if local == reported {
            return true;
        }
        debug!(%code, local, reported, "parsed results do not match forcheck summary");
        self.anomalies.push(Anomaly::SummaryMismatch {
            code,
            local,
            reported,
        });
        false
    }

    fn store(&mut self, code: DiagnosticCode, message: &str, instance: EventInstance) {
        self.instances.entry(code).or_default().push(instance);
        *self.counts.entry(code).or_default() += 1;

        match self.messages.get(&code) {
            None => {
                self.messages.insert(code, message.to_string());
            }
            Some(first) if first != message => {
                debug!(%code, "seeing different messages for event code");
                self.anomalies.push(Anomaly::DuplicateMessage {
                    code,
                    first: first.clone(),
                    second: message.to_string(),
                });
            }
            Some(_) => {}
        }
    }

    /// First message seen for `code`.
    pub fn message(&self, code: DiagnosticCode) -> Option<&str> {
        self.messages.get(&code).map(String::as_str)
    }

    /// Number of recorded occurrences; 0 for unseen or ignored codes.
    pub fn count(&self, code: DiagnosticCode) -> usize {
        self.counts.get(&code).copied().unwrap_or(0)
    }

    /// Occurrences of `code` in encounter order.
    pub fn instances(&self, code: DiagnosticCode) -> &[EventInstance] {
        self.instances.get(&code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// File events attributed to `file`, in encounter order.
    pub fn file_events(&self, file: &str) -> &[EventInstance] {
        self.file_events
            .get(file)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All codes with at least one occurrence, in code order.
    pub fn codes(&self) -> impl Iterator<Item = DiagnosticCode> + '_ {
        self.counts.keys().copied()
    }

    /// All files with at least one attributed event, in path order.
    pub fn files(&self) -> impl Iterator<Item = (&SourcePath, &[EventInstance])> {
        self.file_events
            .iter()
            .map(|(path, events)| (path, events.as_slice()))
    }

    /// Codes ordered by descending count, ties broken by code.
    pub fn ranked(&self) -> Vec<EventSummary<'_>> {
        let mut ranked: Vec<EventSummary<'_>> = self
            .counts
            .iter()
            .map(|(&code, &count)| EventSummary {
                code,
                message: self.message(code).unwrap_or_default(),
                count,
            })
            .collect();
        // stable sort keeps code order among equal counts
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked
    }

    /// Total number of recorded occurrences.
    pub fn event_count(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn ignored(&self) -> &BTreeSet<u32> {
        &self.ignored
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// Whether the run needs manual review.
    pub fn anomaly_detected(&self) -> bool {
        !self.anomalies.is_empty()
    }

    /// Auxiliary `number of ...` totals from the summary, by label.
    pub fn totals(&self) -> &BTreeMap<String, u64> {
        &self.totals
    }

    pub fn total(&self, label: &str) -> Option<u64> {
        self.totals.get(label).copied()
    }
}
