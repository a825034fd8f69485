//! Report driver: page-aware line iteration and stage sequencing
//!
//! A listfile is a sequence of pages. Every page opens with a header:
//!
//! ```text
//! FORCHECK V14.3.2 ...        <- banner
//! (options ...)   src/foo.f90 <- optional attribution, last word is the file
//!                             <- blank separator (required after attribution)
//! ```
//!
//! Pages are separated by a line starting with a form feed. Across pages the
//! body is split into stages by sentinel lines (see [`Stage`]).

use crate::error::{FormatError, ParseError};
use crate::grammar::attribution_target;
use crate::options::ParseOptions;
use crate::stage::Stage;
use crate::stages::{DispatchedLine, FileEventStage, GlobalEventStage, StageParser, SummaryStage};
use crate::state::ParserState;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

const BANNER_PREFIX: &str = "FORCHECK";
const FORM_FEED: char = '\u{c}';

/// Line reader that counts physical lines and tolerates non-UTF-8 bytes.
struct NumberedLines<R> {
    reader: R,
    line_no: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> NumberedLines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: Vec::new(),
        }
    }

    /// Next line without its terminator, or `None` at end of input.
    fn next_line(&mut self) -> Result<Option<String>, ParseError> {
        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(ParseError::Read)?;
        if read == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        let text = String::from_utf8_lossy(&self.buf);
        Ok(Some(text.trim_end_matches(['\n', '\r']).to_string()))
    }

    /// Like `next_line`, but running out of input is a malformed header.
    fn header_line(&mut self, stage: Stage) -> Result<String, ParseError> {
        match self.next_line()? {
            Some(line) => Ok(line),
            None => Err(FormatError::MalformedHeader {
                stage,
                line_no: self.line_no + 1,
                line: String::new(),
            }
            .into()),
        }
    }
}

enum PageStart {
    Page { target_file: Option<String> },
    EndOfInput,
}

/// Read the header of the page that opens while `stage` is active.
fn read_page_header<R: BufRead>(
    lines: &mut NumberedLines<R>,
    stage: Stage,
) -> Result<PageStart, ParseError> {
    let Some(banner) = lines.next_line()? else {
        return Ok(PageStart::EndOfInput);
    };
    if !banner.starts_with(BANNER_PREFIX) {
        return Err(malformed_header(stage, lines.line_no, banner));
    }

    let attribution = lines.header_line(stage)?;
    let target_file = attribution_target(&attribution).map(str::to_string);
    if target_file.is_some() {
        let separator = lines.header_line(stage)?;
        if !separator.trim().is_empty() {
            return Err(malformed_header(stage, lines.line_no, separator));
        }
    }
    Ok(PageStart::Page { target_file })
}

fn malformed_header(stage: Stage, line_no: usize, line: String) -> ParseError {
    FormatError::MalformedHeader {
        stage,
        line_no,
        line,
    }
    .into()
}

/// Parse a standalone page header and return the file it attributes the page
/// to. The same header text always yields the same result.
pub fn parse_page_header(header: &str) -> Result<Option<String>, FormatError> {
    let stage = Stage::FileEvents;
    let mut lines = NumberedLines::new(header.as_bytes());
    match read_page_header(&mut lines, stage) {
        Ok(PageStart::Page { target_file }) => Ok(target_file),
        Ok(PageStart::EndOfInput) => Err(FormatError::MalformedHeader {
            stage,
            line_no: 1,
            line: String::new(),
        }),
        Err(ParseError::Format(err)) => Err(err),
        Err(other) => Err(FormatError::MalformedHeader {
            stage,
            line_no: lines.line_no,
            line: other.to_string(),
        }),
    }
}

/// The last two trimmed lines seen, in a fixed two-slot ring.
#[derive(Debug, Default)]
struct LookbackWindow {
    slots: [String; 2],
    head: usize,
}

impl LookbackWindow {
    fn push(&mut self, line: &str) {
        self.head = (self.head + 1) % self.slots.len();
        let slot = &mut self.slots[self.head];
        slot.clear();
        slot.push_str(line);
    }

    fn previous(&self) -> &str {
        &self.slots[self.head]
    }

    fn before_previous(&self) -> &str {
        &self.slots[(self.head + 1) % self.slots.len()]
    }
}

/// Turns a Forcheck listfile into a [`ParserState`] in a single pass.
#[derive(Debug, Clone)]
pub struct ReportParser {
    options: ParseOptions,
    file_events: FileEventStage,
}

impl ReportParser {
    pub fn new(options: ParseOptions) -> Self {
        let file_events = FileEventStage::new(options.format, options.attribution);
        Self {
            options,
            file_events,
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse the listfile at `path`.
    ///
    /// When the parse raises an anomaly, the raw listfile is copied to the
    /// configured debug location. That copy never affects the returned state.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ParserState, ParseError> {
        let path = path.as_ref();
        info!(path = %path.display(), "parsing forcheck listfile");
        let file = File::open(path).map_err(|source| ParseError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let state = self.parse_reader(BufReader::new(file))?;

        if state.anomaly_detected() {
            self.preserve(path, &state);
        } else {
            info!("parse successful");
        }
        Ok(state)
    }

    /// Parse listfile text held in memory.
    pub fn parse_str(&self, text: &str) -> Result<ParserState, ParseError> {
        self.parse_reader(text.as_bytes())
    }

    /// Parse a listfile from any buffered reader.
    pub fn parse_reader(&self, reader: impl BufRead) -> Result<ParserState, ParseError> {
        if !self.options.ignore.is_empty() {
            info!(ignored = ?self.options.ignore, "ignoring forcheck events");
        }

        let mut lines = NumberedLines::new(reader);
        let mut state = ParserState::new(self.options.ignore.iter().copied());
        let mut window = LookbackWindow::default();
        let mut stage = Stage::FileEvents;
        info!(%stage, "parsing stage");

        let mut target_file = match read_page_header(&mut lines, stage)? {
            PageStart::Page { target_file } => target_file,
            PageStart::EndOfInput => return Err(FormatError::Truncated { stage }.into()),
        };

        while let Some(raw) = lines.next_line()? {
            if raw.starts_with(FORM_FEED) {
                match read_page_header(&mut lines, stage)? {
                    PageStart::Page { target_file: next } => {
                        debug!(line_no = lines.line_no, target_file = ?next, "new page");
                        target_file = next;
                    }
                    PageStart::EndOfInput => break,
                }
                continue;
            }

            let current = raw.trim();
            if let Some(next) = stage.transition(current) {
                stage = next;
                info!(%stage, "parsing stage");
            } else if let Some(parser) = self.parser_for(stage) {
                let line = DispatchedLine {
                    line_no: lines.line_no,
                    target_file: target_file.as_deref(),
                    current,
                    previous: window.previous(),
                    before_previous: window.before_previous(),
                };
                parser.slurp(&line, &mut state)?;
            }
            window.push(current);
        }

        if !stage.is_final() {
            return Err(FormatError::Truncated { stage }.into());
        }
        info!(
            events = state.event_count(),
            codes = state.codes().count(),
            files = state.files().count(),
            anomalies = state.anomalies().len(),
            "listfile parsed"
        );
        Ok(state)
    }

    fn parser_for(&self, stage: Stage) -> Option<&dyn StageParser> {
        match stage {
            Stage::FileEvents => Some(&self.file_events),
            Stage::GlobalEvents => Some(&GlobalEventStage),
            Stage::ProgramUnits => None,
            Stage::Summary => Some(&SummaryStage),
        }
    }

    fn preserve(&self, path: &Path, state: &ParserState) {
        for anomaly in state.anomalies() {
            warn!(%anomaly, "parse anomaly");
        }
        let Some(destination) = &self.options.debug_copy else {
            warn!("there appears to be a problem in the parsing; raw listfile not preserved");
            return;
        };
        if let (Ok(source), Ok(target)) = (path.canonicalize(), destination.canonicalize()) {
            if source == target {
                warn!(
                    copy = %destination.display(),
                    "debug copy destination is the listfile itself; raw listfile not preserved"
                );
                return;
            }
        }
        match std::fs::copy(path, destination) {
            Ok(_) => warn!(
                copy = %destination.display(),
                "there appears to be a problem in the parsing; listfile preserved for inspection"
            ),
            Err(err) => warn!(
                copy = %destination.display(),
                error = %err,
                "failed to preserve listfile for inspection"
            ),
        }
    }
}

impl Default for ReportParser {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}
