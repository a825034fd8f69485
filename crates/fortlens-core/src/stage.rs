//! Report regions and the sentinels that separate them

use std::fmt::{Display, Formatter};

/// One contiguous region of a listfile, decoded by its own grammar.
///
/// Stages always appear in declaration order. Each non-final stage ends at
/// the line that exactly equals its [`sentinel`](Stage::sentinel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    FileEvents,
    GlobalEvents,
    ProgramUnits,
    Summary,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::FileEvents,
        Stage::GlobalEvents,
        Stage::ProgramUnits,
        Stage::Summary,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::FileEvents => "file events",
            Stage::GlobalEvents => "global events",
            Stage::ProgramUnits => "program units",
            Stage::Summary => "forcheck summary",
        }
    }

    /// Line that ends this stage. The summary consumes the rest of the input.
    pub fn sentinel(&self) -> Option<&'static str> {
        match self {
            Stage::FileEvents => Some("global program analysis:"),
            Stage::GlobalEvents => Some("program_units and procedures analysed:"),
            Stage::ProgramUnits => Some("messages presented:"),
            Stage::Summary => None,
        }
    }

    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::FileEvents => Some(Stage::GlobalEvents),
            Stage::GlobalEvents => Some(Stage::ProgramUnits),
            Stage::ProgramUnits => Some(Stage::Summary),
            Stage::Summary => None,
        }
    }

    pub fn is_final(&self) -> bool {
        self.next().is_none()
    }

    /// Stage entered when `line` is this stage's sentinel.
    pub fn transition(&self, line: &str) -> Option<Stage> {
        if self.sentinel()? == line {
            self.next()
        } else {
            None
        }
    }

    /// Whether lines of this stage may belong to a page attributed to a file.
    pub fn allows_target_file(&self) -> bool {
        matches!(self, Stage::FileEvents | Stage::ProgramUnits)
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
