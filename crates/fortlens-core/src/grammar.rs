//! Decoders for the individual line shapes of a listfile
//!
//! All decoders take a line with surrounding whitespace already trimmed and
//! return `None` when the line does not have their shape.

use crate::code::{DiagnosticCode, parse_code};

/// Prefix shared by every event marker line.
pub const MARKER_PREFIX: &str = "**[";

/// Prefix of the auxiliary totals in the summary.
pub const TOTAL_PREFIX: &str = "number of ";

/// Whether the line announces a diagnostic.
pub fn is_marker(line: &str) -> bool {
    line.starts_with(MARKER_PREFIX)
}

/// Decode `**[<code>] <message>`.
///
/// Whitespace is allowed between the bracket and the code; the message may be
/// empty but must be preceded by a space.
pub fn decode_marker(line: &str) -> Option<(DiagnosticCode, &str)> {
    decode_bracketed(line.strip_prefix(MARKER_PREFIX)?)
}

/// Decode `(file: <path>, line: <n>)`. Text after the closing paren is ignored.
///
/// A line number too large for `u32` saturates; the tag still decodes.
pub fn decode_location(line: &str) -> Option<(&str, u32)> {
    let rest = line.strip_prefix("(file: ")?;
    let (path, rest) = rest.split_once(',')?;
    if path.is_empty() {
        return None;
    }
    let rest = rest.strip_prefix(" line:")?;
    let (number, rest) = split_leading_number(require_whitespace(rest)?)?;
    if !rest.starts_with(')') {
        return None;
    }
    Some((path, number.parse().unwrap_or(u32::MAX)))
}

/// Decode Forcheck's own tally, `<count>x[<code>] <message>`. Oversized counts saturate.
pub fn decode_tally(line: &str) -> Option<(usize, DiagnosticCode, &str)> {
    let (count, rest) = split_leading_number(line)?;
    let (code, message) = decode_bracketed(rest.strip_prefix("x[")?)?;
    if message.is_empty() {
        return None;
    }
    Some((count.parse().unwrap_or(usize::MAX), code, message))
}

/// Decode `number of <label>: <count>`. The label runs to the first colon.
pub fn decode_total(line: &str) -> Option<(&str, u64)> {
    let rest = line.strip_prefix(TOTAL_PREFIX)?;
    let (label, rest) = rest.split_once(':')?;
    let (count, _) = split_leading_number(require_whitespace(rest)?)?;
    Some((label, count.parse().unwrap_or(u64::MAX)))
}

/// Target file named by a page attribution line: its last word.
pub fn attribution_target(line: &str) -> Option<&str> {
    line.split_whitespace().next_back()
}

fn decode_bracketed(rest: &str) -> Option<(DiagnosticCode, &str)> {
    let (code, rest) = rest.trim_start().split_once(']')?;
    let code = parse_code(code)?;
    let message = rest.strip_prefix(' ')?;
    Some((code, message))
}

/// Strip at least one leading whitespace character.
fn require_whitespace(text: &str) -> Option<&str> {
    let trimmed = text.trim_start();
    (trimmed.len() < text.len()).then_some(trimmed)
}

/// Split a non-empty run of leading ASCII digits from the rest of the text.
fn split_leading_number(text: &str) -> Option<(&str, &str)> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    if end == 0 {
        return None;
    }
    Some(text.split_at(end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_with_padded_code() {
        let (code, message) = decode_marker("**[  123 E] Undeclared variable").expect("marker");
        assert_eq!(code.to_string(), "123 E");
        assert_eq!(message, "Undeclared variable");
    }

    #[test]
    fn marker_message_keeps_inner_brackets() {
        let (_, message) = decode_marker("**[ 41 W] (argument [1]) mismatch").expect("marker");
        assert_eq!(message, "(argument [1]) mismatch");
    }

    #[test]
    fn marker_rejects_bad_shapes() {
        assert!(decode_marker("**[123E] oops").is_none());
        assert!(decode_marker("**[ 123 E]oops").is_none());
        assert!(decode_marker("**[ 123 E]").is_none());
        assert!(decode_marker("**[ 123 Q] nope").is_none());
        assert!(decode_marker("** [123 E] nope").is_none());
    }

    #[test]
    fn marker_allows_empty_message() {
        let (_, message) = decode_marker("**[ 1 I] ").expect("marker");
        assert_eq!(message, "");
    }

    #[test]
    fn location_tag() {
        assert_eq!(
            decode_location("(file: foo.f90, line:   42)"),
            Some(("foo.f90", 42))
        );
        assert_eq!(
            decode_location("(file: dir/a b.f, line: 7) trailing"),
            Some(("dir/a b.f", 7))
        );
    }

    #[test]
    fn location_rejects_bad_shapes() {
        assert!(decode_location("X = 1").is_none());
        assert!(decode_location("(file: , line: 3)").is_none());
        assert!(decode_location("(file: foo.f90, line:42)").is_none());
        assert!(decode_location("(file: foo.f90, line: 42").is_none());
        assert!(decode_location("(file: foo.f90, line: x)").is_none());
        assert!(decode_location("(file: foo.f90 line: 4)").is_none());
    }

    #[test]
    fn location_line_number_saturates() {
        assert_eq!(
            decode_location("(file: foo.f90, line: 99999999999)"),
            Some(("foo.f90", u32::MAX))
        );
    }

    #[test]
    fn tally_line() {
        let (count, code, message) =
            decode_tally("7x[  123 E] Undeclared variable").expect("tally");
        assert_eq!(count, 7);
        assert_eq!(code.to_string(), "123 E");
        assert_eq!(message, "Undeclared variable");
    }

    #[test]
    fn tally_rejects_bad_shapes() {
        assert!(decode_tally("x[ 123 E] msg").is_none());
        assert!(decode_tally("7x[ 123 E] ").is_none());
        assert!(decode_tally("7 x[ 123 E] msg").is_none());
        assert!(decode_tally("**[ 123 E] msg").is_none());
    }

    #[test]
    fn oversized_counts_saturate() {
        let (count, code, _) =
            decode_tally("999999999999999999999999x[ 1 E] msg").expect("tally");
        assert_eq!(count, usize::MAX);
        assert_eq!(code.to_string(), "1 E");
        assert_eq!(
            decode_total("number of warnings: 999999999999999999999999"),
            Some(("warnings", u64::MAX))
        );
    }

    #[test]
    fn total_line() {
        assert_eq!(
            decode_total("number of error messages:     3"),
            Some(("error messages", 3))
        );
        assert_eq!(
            decode_total("number of warnings: 12 (of which 2 suppressed)"),
            Some(("warnings", 12))
        );
        assert!(decode_total("number of error messages:3").is_none());
        assert!(decode_total("number of error messages").is_none());
        assert!(decode_total("number of things: many").is_none());
    }

    #[test]
    fn attribution_takes_last_word() {
        assert_eq!(
            attribution_target("(options: -f95 -ff)   src/foo.f90"),
            Some("src/foo.f90")
        );
        assert_eq!(attribution_target("   "), None);
    }
}
