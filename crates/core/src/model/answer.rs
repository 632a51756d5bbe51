use thiserror::Error;

use crate::model::{QuestionBank, Section};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors raised by answer-sheet mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerSheetError {
    /// The owning session has completed; the sheet is read-only.
    #[error("answer sheet is closed")]
    Closed,

    #[error("question index {index} out of bounds for {len} questions")]
    OutOfBounds { index: usize, len: usize },
}

//
// ─── ANSWER STATE ──────────────────────────────────────────────────────────────
//

/// Per-question answer and review-flag state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerState {
    pub selected: Option<String>,
    pub marked: bool,
}

impl AnswerState {
    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.selected.is_some()
    }
}

//
// ─── ANSWER SHEET ──────────────────────────────────────────────────────────────
//

/// Mutable answer state for one section.
///
/// Sized exactly to the section's question count at construction and never
/// resized. All mutation goes through `select_option` and `toggle_mark`;
/// every successful mutation bumps the version counter. Once closed the
/// sheet rejects mutation and leaves prior state unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSheet {
    states: Vec<AnswerState>,
    version: u64,
    closed: bool,
}

impl AnswerSheet {
    /// Create a sheet with one blank slot per question.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            states: vec![AnswerState::default(); len],
            version: 0,
            closed: false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn state(&self, index: usize) -> Option<&AnswerState> {
        self.states.get(index)
    }

    #[must_use]
    pub fn states(&self) -> &[AnswerState] {
        &self.states
    }

    /// Number of questions with a selected option.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.states.iter().filter(|s| s.is_answered()).count()
    }

    /// Number of questions flagged for review.
    #[must_use]
    pub fn marked_count(&self) -> usize {
        self.states.iter().filter(|s| s.marked).count()
    }

    /// Record a selection for the question at `index`.
    ///
    /// Reselecting any number of times is allowed and idempotently
    /// overwrites the previous choice.
    ///
    /// # Errors
    ///
    /// Returns `AnswerSheetError::Closed` after the session completed and
    /// `AnswerSheetError::OutOfBounds` for an invalid index.
    pub fn select_option(
        &mut self,
        index: usize,
        option: impl Into<String>,
    ) -> Result<(), AnswerSheetError> {
        let state = self.slot(index)?;
        state.selected = Some(option.into());
        self.version += 1;
        Ok(())
    }

    /// Flip the review flag for the question at `index`.
    ///
    /// Independent of whether the question has been answered.
    ///
    /// # Errors
    ///
    /// Returns `AnswerSheetError::Closed` after the session completed and
    /// `AnswerSheetError::OutOfBounds` for an invalid index.
    pub fn toggle_mark(&mut self, index: usize) -> Result<(), AnswerSheetError> {
        let state = self.slot(index)?;
        state.marked = !state.marked;
        self.version += 1;
        Ok(())
    }

    /// Make the sheet read-only. Irreversible.
    pub fn close(&mut self) {
        self.closed = true;
    }

    fn slot(&mut self, index: usize) -> Result<&mut AnswerState, AnswerSheetError> {
        if self.closed {
            return Err(AnswerSheetError::Closed);
        }
        let len = self.states.len();
        self.states
            .get_mut(index)
            .ok_or(AnswerSheetError::OutOfBounds { index, len })
    }
}

//
// ─── ANSWER BOOK ───────────────────────────────────────────────────────────────
//

/// The pair of answer sheets for one exam attempt, one per section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerBook {
    reading_writing: AnswerSheet,
    math: AnswerSheet,
}

impl AnswerBook {
    /// Create blank sheets sized to the given bank's sections.
    #[must_use]
    pub fn for_bank(bank: &QuestionBank) -> Self {
        Self {
            reading_writing: AnswerSheet::new(bank.section(Section::ReadingWriting).len()),
            math: AnswerSheet::new(bank.section(Section::Math).len()),
        }
    }

    #[must_use]
    pub fn sheet(&self, section: Section) -> &AnswerSheet {
        match section {
            Section::ReadingWriting => &self.reading_writing,
            Section::Math => &self.math,
        }
    }

    pub fn sheet_mut(&mut self, section: Section) -> &mut AnswerSheet {
        match section {
            Section::ReadingWriting => &mut self.reading_writing,
            Section::Math => &mut self.math,
        }
    }

    /// Close both sheets. Called once the exam reaches its terminal state.
    pub fn close(&mut self) {
        self.reading_writing.close();
        self.math.close();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
