//! End-to-end parsing of listfile fixtures

use fortlens_core::{
    Anomaly, FormatError, ParseError, ParseOptions, ParserState, ReportFormat, ReportParser,
    Stage, parse_code,
};
use std::path::{Path, PathBuf};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> PathBuf {
    Path::new(FIXTURES_DIR).join(name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", name, e))
}

fn parse_fixture(name: &str, options: ParseOptions) -> ParserState {
    ReportParser::new(options.debug_copy(None::<PathBuf>))
        .parse_str(&read_fixture(name))
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", name, e))
}

fn parse_text(lines: &[&str]) -> Result<ParserState, ParseError> {
    ReportParser::default().parse_str(&lines.join("\n"))
}

#[test]
fn test_current_format_report() {
    let state = parse_fixture("current.lst", ParseOptions::default());
    let undeclared = parse_code("123 E").unwrap();

    assert_eq!(state.count(undeclared), 3);
    assert_eq!(state.message(undeclared), Some("Undeclared variable"));
    let located: Vec<(&str, Option<u32>, Option<&str>)> = state
        .instances(undeclared)
        .iter()
        .map(|e| (e.file().unwrap().as_str(), e.line(), e.culprit()))
        .collect();
    assert_eq!(
        located,
        [
            ("src/foo.f90", Some(12), Some("X = 1")),
            ("src/foo.f90", Some(20), Some("Y = X")),
            ("src/bar.f90", Some(9), Some("Z = 2")),
        ]
    );

    // no culprit line: the location tag sits directly above the marker
    let implicit = &state.instances(parse_code("675 I").unwrap())[0];
    assert_eq!(implicit.line(), Some(31));
    assert_eq!(implicit.culprit(), Some(""));

    let mismatch = &state.instances(parse_code("41 W").unwrap())[0];
    assert_eq!(mismatch.culprit(), Some("CALL SUB(A, B)"));
    assert_eq!(mismatch.link().as_deref(), Some("src/src/bar.f90.html#line-5"));

    assert_eq!(state.file_events("src/foo.f90").len(), 3);
    assert_eq!(state.file_events("src/bar.f90").len(), 2);
    assert_eq!(state.event_count(), 8);
    assert!(!state.anomaly_detected());
}

#[test]
fn test_global_events_and_details() {
    let state = parse_fixture("current.lst", ParseOptions::default());

    let unreferenced = state.instances(parse_code("557 W").unwrap());
    assert_eq!(unreferenced.len(), 2);
    assert!(unreferenced.iter().all(|e| e.is_global() && e.file().is_none()));
    assert_eq!(unreferenced[0].details(), Some("SUB, referenced in FOO"));
    // adjacent markers: the second one has no details line of its own
    assert_eq!(unreferenced[1].details(), Some(""));

    let unused = &state.instances(parse_code("999 I").unwrap())[0];
    assert_eq!(unused.details(), Some("BAR"));
}

#[test]
fn test_summary_totals_and_ranking() {
    let state = parse_fixture("current.lst", ParseOptions::default());

    assert_eq!(state.total("error messages"), Some(3));
    assert_eq!(state.total("warnings"), Some(3));
    assert_eq!(state.total("informative messages"), Some(2));

    let ranked: Vec<(String, usize)> = state
        .ranked()
        .iter()
        .map(|s| (s.code.to_string(), s.count))
        .collect();
    assert_eq!(
        ranked,
        [
            ("123 E".to_string(), 3),
            ("557 W".to_string(), 2),
            ("41 W".to_string(), 1),
            ("675 I".to_string(), 1),
            ("999 I".to_string(), 1),
        ]
    );
}

#[test]
fn test_ignored_codes_are_dropped_everywhere() {
    let state = parse_fixture("current.lst", ParseOptions::new().ignore([123, 557]));

    assert_eq!(state.count(parse_code("123 E").unwrap()), 0);
    assert!(state.instances(parse_code("557 W").unwrap()).is_empty());
    assert!(state.codes().all(|c| c.number() != 123 && c.number() != 557));
    assert_eq!(state.file_events("src/foo.f90").len(), 1);
    // the summary still tallies them, but ignored codes never mismatch
    assert!(!state.anomaly_detected());
}

#[test]
fn test_legacy_format_report() {
    let state = parse_fixture(
        "legacy.lst",
        ParseOptions::new().format(ReportFormat::Legacy),
    );
    let event = &state.instances(parse_code("123 E").unwrap())[0];
    assert_eq!(event.file().unwrap().as_str(), "old.f");
    assert_eq!(event.line(), Some(3));
    assert_eq!(event.culprit(), Some("X = 1"));
    assert!(!state.anomaly_detected());
}

#[test]
fn test_legacy_report_read_as_current_misplaces_culprit() {
    let state = parse_fixture("legacy.lst", ParseOptions::default());
    let event = &state.instances(parse_code("123 E").unwrap())[0];
    // the location tag is found through the fallback, the culprit is lost
    assert_eq!(event.line(), Some(3));
    assert_eq!(event.culprit(), Some(""));
}

#[test]
fn test_anomalies_are_collected() {
    let state = parse_fixture("anomalies.lst", ParseOptions::default());
    let code = parse_code("123 E").unwrap();

    assert!(state.anomaly_detected());
    assert_eq!(state.count(code), 2);
    assert_eq!(state.message(code), Some("Undeclared variable"));
    assert_eq!(
        state.anomalies(),
        [
            Anomaly::DuplicateMessage {
                code,
                first: "Undeclared variable".to_string(),
                second: "Variable not declared".to_string(),
            },
            Anomaly::SummaryMismatch {
                code,
                local: 2,
                reported: 3,
            },
        ]
    );
}

#[test]
fn test_parse_file_preserves_listfile_on_anomaly() {
    let dir = tempfile::tempdir().unwrap();
    let copy = dir.path().join("forcheck_listfile.debug");
    let parser = ReportParser::new(ParseOptions::new().debug_copy(Some(&copy)));

    let state = parser.parse_file(fixture_path("anomalies.lst")).unwrap();
    assert!(state.anomaly_detected());
    assert_eq!(
        std::fs::read_to_string(&copy).unwrap(),
        read_fixture("anomalies.lst")
    );
}

#[test]
fn test_parse_file_without_anomaly_leaves_no_copy() {
    let dir = tempfile::tempdir().unwrap();
    let copy = dir.path().join("forcheck_listfile.debug");
    let parser = ReportParser::new(ParseOptions::new().debug_copy(Some(&copy)));

    let state = parser.parse_file(fixture_path("current.lst")).unwrap();
    assert!(!state.anomaly_detected());
    assert!(!copy.exists());
}

#[test]
fn test_debug_copy_onto_listfile_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let listfile = dir.path().join("forcheck.lst");
    std::fs::copy(fixture_path("anomalies.lst"), &listfile).unwrap();
    let parser = ReportParser::new(ParseOptions::new().debug_copy(Some(&listfile)));

    let state = parser.parse_file(&listfile).unwrap();
    assert!(state.anomaly_detected());
    assert_eq!(
        std::fs::read_to_string(&listfile).unwrap(),
        read_fixture("anomalies.lst")
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_parse_file_missing() {
    let err = ReportParser::default()
        .parse_file(fixture_path("does-not-exist.lst"))
        .unwrap_err();
    assert!(matches!(err, ParseError::Open { .. }));
}

#[test]
fn test_truncated_report() {
    let err = parse_text(&["FORCHECK V14.3.2", "", "**[ 1 E] something"]).unwrap_err();
    assert!(matches!(
        err,
        ParseError::Format(FormatError::Truncated {
            stage: Stage::FileEvents
        })
    ));

    let err = parse_text(&[
        "FORCHECK V14.3.2",
        "",
        "global program analysis:",
        "program_units and procedures analysed:",
    ])
    .unwrap_err();
    assert!(matches!(
        err,
        ParseError::Format(FormatError::Truncated {
            stage: Stage::ProgramUnits
        })
    ));
}

#[test]
fn test_empty_input_is_truncated() {
    let err = ReportParser::default().parse_str("").unwrap_err();
    assert!(matches!(
        err,
        ParseError::Format(FormatError::Truncated {
            stage: Stage::FileEvents
        })
    ));
}

#[test]
fn test_form_feed_at_end_of_input() {
    let state = parse_text(&[
        "FORCHECK V14.3.2",
        "",
        "global program analysis:",
        "program_units and procedures analysed:",
        "messages presented:",
        "\u{c}",
    ])
    .unwrap();
    assert_eq!(state.event_count(), 0);
}

#[test]
fn test_header_cut_short_after_form_feed() {
    let err = parse_text(&[
        "FORCHECK V14.3.2",
        "",
        "\u{c}",
        "FORCHECK V14.3.2",
    ])
    .unwrap_err();
    match err {
        ParseError::Format(FormatError::MalformedHeader { line_no, .. }) => assert_eq!(line_no, 5),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_bad_banner_reports_current_stage() {
    let err = parse_text(&[
        "FORCHECK V14.3.2",
        "",
        "global program analysis:",
        "\u{c}",
        "not a banner",
    ])
    .unwrap_err();
    let err = match err {
        ParseError::Format(err) => err,
        other => panic!("unexpected error: {other}"),
    };
    assert!(matches!(
        err,
        FormatError::MalformedHeader {
            stage: Stage::GlobalEvents,
            ..
        }
    ));
    assert_eq!(err.line_no(), Some(5));
    assert!(
        err.to_string().contains("(global events)"),
        "Message should name the stage: {}",
        err
    );
}

#[test]
fn test_missing_banner() {
    let err = parse_text(&["not a listfile", ""]).unwrap_err();
    assert!(matches!(
        err,
        ParseError::Format(FormatError::MalformedHeader { line_no: 1, .. })
    ));
}

#[test]
fn test_target_file_in_global_stage() {
    let err = parse_text(&[
        "FORCHECK V14.3.2",
        "(options: -f95)   foo.f90",
        "",
        "global program analysis:",
        "**[  557 W] procedure not referenced",
    ])
    .unwrap_err();
    match err {
        ParseError::Format(FormatError::UnexpectedTargetFile {
            stage,
            line_no,
            file,
        }) => {
            assert_eq!(stage, Stage::GlobalEvents);
            assert_eq!(line_no, 5);
            assert_eq!(file, "foo.f90");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_window_spans_page_breaks() {
    // the form feed and the next page header never enter the lookback window
    let state = parse_text(&[
        "FORCHECK V14.3.2",
        "(options: -f95)   foo.f90",
        "",
        "(file: foo.f90, line:    8)",
        "      CALL BAR",
        "\u{c}",
        "FORCHECK V14.3.2",
        "(options: -f95)   foo.f90",
        "",
        "**[  200 W] call of unknown procedure",
        "global program analysis:",
        "\u{c}",
        "FORCHECK V14.3.2",
        "",
        "program_units and procedures analysed:",
        "messages presented:",
        "   1x[  200 W] call of unknown procedure",
    ])
    .unwrap();
    let event = &state.instances(parse_code("200 W").unwrap())[0];
    assert_eq!(event.line(), Some(8));
    assert_eq!(event.culprit(), Some("CALL BAR"));
    assert!(!state.anomaly_detected());
}

#[test]
fn test_tally_for_unseen_code() {
    let state = parse_text(&[
        "FORCHECK V14.3.2",
        "",
        "global program analysis:",
        "program_units and procedures analysed:",
        "messages presented:",
        "   2x[  300 I] never reported",
    ])
    .unwrap();
    assert_eq!(
        state.anomalies(),
        [Anomaly::SummaryMismatch {
            code: parse_code("300 I").unwrap(),
            local: 0,
            reported: 2,
        }]
    );
}
