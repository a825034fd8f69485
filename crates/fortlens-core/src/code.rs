use facet::Facet;
use std::fmt::{Display, Formatter};

/// Severity category attached to every Forcheck diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
#[repr(u8)]
pub enum Severity {
    /// `I`
    Informative,
    /// `E`
    Error,
    /// `W`
    Warning,
    /// `O` - table overflow
    Overflow,
}

impl Severity {
    /// Parse the one-letter category used in listfiles.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'I' => Some(Severity::Informative),
            'E' => Some(Severity::Error),
            'W' => Some(Severity::Warning),
            'O' => Some(Severity::Overflow),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Severity::Informative => 'I',
            Severity::Error => 'E',
            Severity::Warning => 'W',
            Severity::Overflow => 'O',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Informative => "informative",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Overflow => "overflow",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a diagnostic: numeric id plus severity letter, e.g. `123 E`.
///
/// The same number may appear with several severities, and each pairing is
/// aggregated separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
pub struct DiagnosticCode {
    pub number: u32,
    pub severity: Severity,
}

impl DiagnosticCode {
    pub fn new(number: u32, severity: Severity) -> Self {
        Self { number, severity }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Code with spaces replaced by underscores (`123_E`), used in page names.
    pub fn slug(&self) -> String {
        self.to_string().replace(' ', "_")
    }
}

impl Display for DiagnosticCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.number, self.severity.letter())
    }
}

impl PartialEq<&str> for DiagnosticCode {
    fn eq(&self, other: &&str) -> bool {
        parse_code(other).is_some_and(|parsed| parsed == *self)
    }
}

impl PartialEq<DiagnosticCode> for &str {
    fn eq(&self, other: &DiagnosticCode) -> bool {
        parse_code(self).is_some_and(|parsed| parsed == *other)
    }
}

/// Parse the `<digits> <I|E|W|O>` token pair.
///
/// Exactly one space separates the number from the letter; nothing may
/// surround the pair.
pub fn parse_code(token: &str) -> Option<DiagnosticCode> {
    let (digits, letter) = token.split_once(' ')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut letters = letter.chars();
    let severity = Severity::from_letter(letters.next()?)?;
    if letters.next().is_some() {
        return None;
    }
    let number = digits.parse::<u32>().ok()?;
    Some(DiagnosticCode::new(number, severity))
}
