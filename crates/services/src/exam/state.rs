use std::fmt;

use exam_core::model::Section;

/// Lifecycle of one exam attempt.
///
/// Sections are visited in the fixed `Section::ORDER` exactly once each;
/// `Completed` is terminal and no transition leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamPhase {
    NotStarted,
    Welcome,
    InProgress(Section),
    Completed,
}

impl ExamPhase {
    #[must_use]
    pub fn section(self) -> Option<Section> {
        match self {
            ExamPhase::InProgress(section) => Some(section),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ExamPhase::Completed)
    }
}

impl fmt::Display for ExamPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamPhase::NotStarted => f.write_str("not started"),
            ExamPhase::Welcome => f.write_str("welcome"),
            ExamPhase::InProgress(section) => write!(f, "in progress ({section})"),
            ExamPhase::Completed => f.write_str("completed"),
        }
    }
}

/// What ended a section.
///
/// A user-confirmed finish may double-check intent in the UI; a timer
/// expiry must advance unconditionally, so the two are kept distinct even
/// though the resulting transition is identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCause {
    UserConfirmed,
    TimerExpired,
}

/// Where the exam went after a section ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionOutcome {
    /// The next section begins with this many seconds on the clock.
    Next {
        section: Section,
        duration_secs: u32,
    },
    /// The exam reached its terminal state.
    Completed,
}
