//! Stage parsers
//!
//! Each parser decodes the lines of one report region and feeds the decoded
//! events into a [`ParserState`]. The driver hands every non-sentinel line of
//! the active stage to that stage's parser, together with the two lines that
//! preceded it.

use crate::error::FormatError;
use crate::event::SourcePath;
use crate::grammar::{
    TOTAL_PREFIX, decode_location, decode_marker, decode_tally, decode_total, is_marker,
};
use crate::options::{Attribution, ReportFormat};
use crate::stage::Stage;
use crate::state::ParserState;

/// A line handed to a stage parser, with its lookback context.
#[derive(Debug, Clone, Copy)]
pub struct DispatchedLine<'a> {
    /// 1-based physical line number in the listfile
    pub line_no: usize,
    /// File the current page is attributed to
    pub target_file: Option<&'a str>,
    pub current: &'a str,
    pub previous: &'a str,
    pub before_previous: &'a str,
}

/// Decoder for one report region.
pub trait StageParser {
    fn stage(&self) -> Stage;

    fn slurp(&self, line: &DispatchedLine<'_>, state: &mut ParserState) -> Result<(), FormatError>;
}

/// Per-file diagnostics: `**[<code>] <message>` preceded by a culprit line
/// and a `(file: ..., line: ...)` tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileEventStage {
    format: ReportFormat,
    attribution: Attribution,
}

impl FileEventStage {
    pub fn new(format: ReportFormat, attribution: Attribution) -> Self {
        Self {
            format,
            attribution,
        }
    }
}

impl StageParser for FileEventStage {
    fn stage(&self) -> Stage {
        Stage::FileEvents
    }

    fn slurp(
        &self,
        line: &DispatchedLine<'_>,
        state: &mut ParserState,
    ) -> Result<(), FormatError> {
        if !is_marker(line.current) {
            return Ok(());
        }
        let (code, message) = decode_marker(line.current).ok_or_else(|| malformed(self, line))?;
        if state.is_ignored(code) {
            return Ok(());
        }

        let (mut culprit, location_line) = self.format.assign(line.previous, line.before_previous);
        let (file, line_number) = match decode_location(location_line) {
            Some((file, number)) => (Some(file), number),
            // A missing culprit shifts the location tag up by one line.
            None => match decode_location(culprit) {
                Some((file, number)) => {
                    culprit = "";
                    (Some(file), number)
                }
                None if self.attribution == Attribution::Strict => {
                    return Err(FormatError::AmbiguousLocation {
                        stage: self.stage(),
                        line_no: line.line_no,
                        line: line.current.to_string(),
                    });
                }
                None => (line.target_file, 0),
            },
        };

        // Forcheck has no "no culprit" marker, but messages without one
        // usually start with a parenthesis.
        if message.starts_with('(') {
            culprit = "";
        }

        let file = file
            .map(|path| {
                SourcePath::new(path).ok_or_else(|| FormatError::ParentTraversal {
                    stage: self.stage(),
                    line_no: line.line_no,
                    path: path.to_string(),
                })
            })
            .transpose()?;

        state.record_file_event(file, line_number, code, message, culprit);
        Ok(())
    }
}

/// Program-wide diagnostics: `**[<code>] <message>` preceded by a details line.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalEventStage;

impl StageParser for GlobalEventStage {
    fn stage(&self) -> Stage {
        Stage::GlobalEvents
    }

    fn slurp(
        &self,
        line: &DispatchedLine<'_>,
        state: &mut ParserState,
    ) -> Result<(), FormatError> {
        reject_target_file(self, line)?;
        if !is_marker(line.current) {
            return Ok(());
        }
        let (code, message) = decode_marker(line.current).ok_or_else(|| malformed(self, line))?;

        // Back-to-back markers: the first one had no details line.
        let details = if is_marker(line.previous) {
            ""
        } else {
            line.previous
        };
        state.record_global_event(code, message, details);
        Ok(())
    }
}

/// End-of-run summary: per-code tallies and `number of ...` totals.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryStage;

impl StageParser for SummaryStage {
    fn stage(&self) -> Stage {
        Stage::Summary
    }

    fn slurp(
        &self,
        line: &DispatchedLine<'_>,
        state: &mut ParserState,
    ) -> Result<(), FormatError> {
        reject_target_file(self, line)?;
        if let Some((count, code, _)) = decode_tally(line.current) {
            state.reconcile_tally(code, count);
        } else if line.current.starts_with(TOTAL_PREFIX) {
            let (label, count) =
                decode_total(line.current).ok_or_else(|| FormatError::MalformedTotal {
                    stage: self.stage(),
                    line_no: line.line_no,
                    line: line.current.to_string(),
                })?;
            state.record_summary_total(label, count);
        }
        Ok(())
    }
}

fn malformed(parser: &dyn StageParser, line: &DispatchedLine<'_>) -> FormatError {
    FormatError::MalformedMarker {
        stage: parser.stage(),
        line_no: line.line_no,
        line: line.current.to_string(),
    }
}

fn reject_target_file(
    parser: &dyn StageParser,
    line: &DispatchedLine<'_>,
) -> Result<(), FormatError> {
    match line.target_file {
        Some(file) if !parser.stage().allows_target_file() => {
            Err(FormatError::UnexpectedTargetFile {
                stage: parser.stage(),
                line_no: line.line_no,
                file: file.to_string(),
            })
        }
        _ => Ok(()),
    }
}
