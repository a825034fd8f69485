//! fortlens-core - Core library for analysing Forcheck listfiles
//!
//! Forcheck writes its findings as a paginated text report (a "listfile").
//! This crate turns that report into a structured, queryable model:
//! - per-file diagnostics with their source location and culprit excerpt
//! - program-wide diagnostics from the global analysis
//! - Forcheck's own end-of-run tallies, cross-checked against what was parsed
//!
//! # Parsing a listfile
//!
//! ```
//! use fortlens_core::{ParseOptions, ReportParser, parse_code};
//!
//! let listfile = [
//!     "FORCHECK V14.3.2",
//!     "(options: -f95)  foo.f90",
//!     "",
//!     "(file: foo.f90, line:   42)",
//!     "      X = 1",
//!     "**[  123 E] Undeclared variable",
//!     "\u{c}",
//!     "FORCHECK V14.3.2",
//!     "",
//!     "global program analysis:",
//!     "program_units and procedures analysed:",
//!     "messages presented:",
//!     "   1x[  123 E] Undeclared variable",
//!     "number of error messages:    1",
//! ]
//! .join("\n");
//!
//! let parser = ReportParser::new(ParseOptions::default());
//! let state = parser.parse_str(&listfile).unwrap();
//!
//! let code = parse_code("123 E").unwrap();
//! let event = &state.instances(code)[0];
//! assert_eq!(event.file().unwrap().as_str(), "foo.f90");
//! assert_eq!(event.line(), Some(42));
//! assert_eq!(event.culprit(), Some("X = 1"));
//! assert_eq!(state.total("error messages"), Some(1));
//! assert!(!state.anomaly_detected());
//! ```
//!
//! # Consistency anomalies
//!
//! Two inconsistencies are recorded instead of aborting the parse: a code
//! reported with differing messages, and a Forcheck tally that disagrees with
//! the parsed count. Either one sets [`ParserState::anomaly_detected`], and
//! [`ReportParser::parse_file`] then keeps a copy of the raw listfile for
//! manual inspection.

mod code;
mod driver;
mod error;
mod event;
pub mod grammar;
mod options;
mod run;
mod stage;
pub mod stages;
mod state;

pub use code::{DiagnosticCode, Severity, parse_code};
pub use driver::{ReportParser, parse_page_header};
pub use error::{FormatError, IgnoreListError, ParseError};
pub use event::{EventInstance, SourcePath};
pub use options::{Attribution, DEFAULT_DEBUG_COPY, ParseOptions, ReportFormat, parse_ignore_list};
pub use run::{
    CURRENT_FORMAT_SINCE, MIN_SUPPORTED_VERSION, RunData, ToolVersion, exit_code_meaning,
};
pub use stage::Stage;
pub use state::{Anomaly, EventSummary, ParserState};
