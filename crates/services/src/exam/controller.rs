use chrono::{DateTime, Utc};
use std::fmt;
use tracing::debug;

use exam_core::model::{
    AnswerBook, AnswerSheetError, AnswerState, Question, QuestionBank, Section,
};
use exam_core::scoring::{self, Report};
use exam_core::Clock;

use crate::error::SessionError;
use crate::exam::progress::ExamProgress;
use crate::exam::state::{ExamPhase, SectionOutcome, TransitionCause};

//
// ─── EXAM CONTROLLER ───────────────────────────────────────────────────────────
//

/// State machine for one timed, two-section exam attempt.
///
/// Owns the loaded questions, the answer book, and the session position.
/// The controller is purely synchronous; the workflow layer wires it to a
/// countdown timer and drives transitions through it.
///
/// Every transition bumps `timer_generation`. Ticks and expiries carry the
/// generation of the countdown that produced them, so a timer that was
/// armed for an already-finished section can no longer touch the session
/// even if its callback fires late.
pub struct ExamController {
    clock: Clock,
    phase: ExamPhase,
    bank: QuestionBank,
    answers: AnswerBook,
    question_index: usize,
    remaining_seconds: u32,
    timer_generation: u64,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl ExamController {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        let bank = QuestionBank::default();
        let answers = AnswerBook::for_bank(&bank);
        Self {
            clock,
            phase: ExamPhase::NotStarted,
            bank,
            answers,
            question_index: 0,
            remaining_seconds: 0,
            timer_generation: 0,
            started_at: None,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> ExamPhase {
        self.phase
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn question_index(&self) -> usize {
        self.question_index
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Generation the current countdown must carry to be heard.
    #[must_use]
    pub fn timer_generation(&self) -> u64 {
        self.timer_generation
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// The question currently shown, if a section is in progress.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        let section = self.phase.section()?;
        self.bank.section(section).get(self.question_index)
    }

    /// Answer state for the current question.
    #[must_use]
    pub fn current_answer(&self) -> Option<&AnswerState> {
        let section = self.phase.section()?;
        self.answers.sheet(section).state(self.question_index)
    }

    /// Accept a loaded question bank: `NotStarted → Welcome`.
    ///
    /// Fires even for an empty bank; whether empty is terminal is a UI
    /// decision, not this state machine's.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyStarted` outside `NotStarted`.
    pub fn load(&mut self, bank: QuestionBank) -> Result<(), SessionError> {
        if self.phase != ExamPhase::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }
        self.answers = AnswerBook::for_bank(&bank);
        self.bank = bank;
        self.phase = ExamPhase::Welcome;
        debug!(total = self.bank.total(), "question bank accepted");
        Ok(())
    }

    /// Explicit user start: `Welcome → InProgress(ReadingWriting)`.
    ///
    /// Returns the section's initial seconds so the caller can start a
    /// countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotLoaded` before `load` and
    /// `SessionError::AlreadyStarted` after the exam began.
    pub fn begin(&mut self) -> Result<u32, SessionError> {
        match self.phase {
            ExamPhase::NotStarted => Err(SessionError::NotLoaded),
            ExamPhase::Welcome => {
                let first = Section::ORDER[0];
                self.enter_section(first);
                self.started_at = Some(self.clock.now());
                Ok(first.duration_secs())
            }
            ExamPhase::InProgress(_) | ExamPhase::Completed => Err(SessionError::AlreadyStarted),
        }
    }

    /// End the current section, by user confirmation or timer expiry.
    ///
    /// Both causes advance identically; expiry never waits on a
    /// confirmation, so a hard deadline cannot be suppressed by an
    /// unacknowledged dialog.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` outside `InProgress`.
    pub fn finish_section(
        &mut self,
        cause: TransitionCause,
    ) -> Result<SectionOutcome, SessionError> {
        let ExamPhase::InProgress(section) = self.phase else {
            return Err(SessionError::NotInProgress);
        };
        debug!(%section, ?cause, "section finished");

        match section.next() {
            Some(next) => {
                self.enter_section(next);
                Ok(SectionOutcome::Next {
                    section: next,
                    duration_secs: next.duration_secs(),
                })
            }
            None => {
                self.phase = ExamPhase::Completed;
                self.remaining_seconds = 0;
                self.timer_generation += 1;
                self.completed_at = Some(self.clock.now());
                self.answers.close();
                Ok(SectionOutcome::Completed)
            }
        }
    }

    /// Record the countdown's new remaining value.
    ///
    /// A tick whose generation was superseded by a section transition is
    /// dropped, and within the live section the stored value only ever
    /// decreases.
    pub fn record_tick(&mut self, generation: u64, remaining: u32) {
        if generation != self.timer_generation {
            return;
        }
        if let ExamPhase::InProgress(_) = self.phase {
            if remaining < self.remaining_seconds {
                self.remaining_seconds = remaining;
            }
        }
    }

    /// Apply the expiry of the countdown with the given generation.
    ///
    /// An expiry that raced a user confirmation arrives with a superseded
    /// generation and returns `Ok(None)`, so a late callback from the
    /// previous section's timer can never close the section that replaced
    /// it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` outside `InProgress`.
    pub fn expire_timer(
        &mut self,
        generation: u64,
    ) -> Result<Option<SectionOutcome>, SessionError> {
        if generation != self.timer_generation {
            return Ok(None);
        }
        self.finish_section(TransitionCause::TimerExpired).map(Some)
    }

    /// Intra-section navigation, clamped to the section bounds.
    ///
    /// Out-of-range requests clamp rather than error; the timer and
    /// section are unaffected.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` outside `InProgress`.
    pub fn go_to_question(&mut self, index: usize) -> Result<usize, SessionError> {
        let ExamPhase::InProgress(section) = self.phase else {
            return Err(SessionError::NotInProgress);
        };
        let len = self.bank.section(section).len();
        self.question_index = index.min(len.saturating_sub(1));
        Ok(self.question_index)
    }

    /// Record a selection for the current question.
    ///
    /// # Errors
    ///
    /// Returns `AnswerSheetError::Closed` (via `SessionError::Answers`)
    /// once the exam completed, and `SessionError::NotInProgress` before
    /// the exam started.
    pub fn select_option(&mut self, option: impl Into<String>) -> Result<(), SessionError> {
        let (section, index) = self.mutation_target()?;
        self.answers.sheet_mut(section).select_option(index, option)?;
        Ok(())
    }

    /// Flip the review flag for the current question.
    ///
    /// # Errors
    ///
    /// Same as [`Self::select_option`].
    pub fn toggle_mark(&mut self) -> Result<(), SessionError> {
        let (section, index) = self.mutation_target()?;
        self.answers.sheet_mut(section).toggle_mark(index)?;
        Ok(())
    }

    /// Score the attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` before the terminal state.
    pub fn report(&self) -> Result<Report, SessionError> {
        if self.phase != ExamPhase::Completed {
            return Err(SessionError::NotCompleted);
        }
        Ok(scoring::score(&self.bank, &self.answers))
    }

    /// Snapshot of the attempt for presentation.
    #[must_use]
    pub fn progress(&self) -> ExamProgress {
        let (section_len, answered, marked) = match self.phase.section() {
            Some(section) => {
                let sheet = self.answers.sheet(section);
                (
                    self.bank.section(section).len(),
                    sheet.answered_count(),
                    sheet.marked_count(),
                )
            }
            None => (0, 0, 0),
        };

        ExamProgress {
            phase: self.phase,
            question_index: self.question_index,
            section_len,
            remaining_seconds: self.remaining_seconds,
            answered,
            marked,
        }
    }

    fn enter_section(&mut self, section: Section) {
        self.phase = ExamPhase::InProgress(section);
        self.question_index = 0;
        self.remaining_seconds = section.duration_secs();
        self.timer_generation += 1;
    }

    fn mutation_target(&self) -> Result<(Section, usize), SessionError> {
        match self.phase {
            ExamPhase::InProgress(section) => Ok((section, self.question_index)),
            ExamPhase::Completed => Err(SessionError::Answers(AnswerSheetError::Closed)),
            ExamPhase::NotStarted | ExamPhase::Welcome => Err(SessionError::NotInProgress),
        }
    }
}

impl fmt::Debug for ExamController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamController")
            .field("phase", &self.phase)
            .field("questions", &self.bank.total())
            .field("question_index", &self.question_index)
            .field("remaining_seconds", &self.remaining_seconds)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{Question, QuestionId};
    use exam_core::time::fixed_clock;

    fn build_question(id: &str, section: Section, skill: &str) -> Question {
        Question::new(
            QuestionId::new(id),
            section,
            "Domain",
            skill,
            "Medium",
            "body",
            vec!["A) first".into(), "B) second".into()],
            "A",
            "explanation",
            None,
        )
        .unwrap()
    }

    fn loaded_controller(rw: usize, math: usize) -> ExamController {
        let mut questions = Vec::new();
        for i in 0..rw {
            questions.push(build_question(
                &format!("r{i}"),
                Section::ReadingWriting,
                "Inferences",
            ));
        }
        for i in 0..math {
            questions.push(build_question(&format!("m{i}"), Section::Math, "Algebra"));
        }

        let mut controller = ExamController::new(fixed_clock());
        controller.load(QuestionBank::partition(questions)).unwrap();
        controller
    }

    #[test]
    fn load_moves_to_welcome_even_when_empty() {
        let mut controller = ExamController::new(fixed_clock());
        controller.load(QuestionBank::default()).unwrap();
        assert_eq!(controller.phase(), ExamPhase::Welcome);

        let err = controller.load(QuestionBank::default()).unwrap_err();
        assert!(matches!(err, SessionError::AlreadyStarted));
    }

    #[test]
    fn begin_requires_a_loaded_bank() {
        let mut controller = ExamController::new(fixed_clock());
        assert!(matches!(controller.begin(), Err(SessionError::NotLoaded)));
    }

    #[test]
    fn section_entry_initializes_duration_and_index() {
        // Scenario C: 3840 seconds for Reading & Writing, 4200 for Math.
        let mut controller = loaded_controller(2, 2);

        assert_eq!(controller.begin().unwrap(), 3840);
        assert_eq!(controller.phase(), ExamPhase::InProgress(Section::ReadingWriting));
        assert_eq!(controller.remaining_seconds(), 3840);
        assert_eq!(controller.question_index(), 0);
        assert!(controller.started_at().is_some());

        controller.go_to_question(1).unwrap();
        let outcome = controller
            .finish_section(TransitionCause::UserConfirmed)
            .unwrap();
        assert_eq!(
            outcome,
            SectionOutcome::Next {
                section: Section::Math,
                duration_secs: 4200
            }
        );
        assert_eq!(controller.remaining_seconds(), 4200);
        assert_eq!(controller.question_index(), 0);
    }

    #[test]
    fn sections_run_in_fixed_order_and_complete_once() {
        let mut controller = loaded_controller(1, 1);
        controller.begin().unwrap();

        controller
            .finish_section(TransitionCause::UserConfirmed)
            .unwrap();
        assert_eq!(controller.phase(), ExamPhase::InProgress(Section::Math));

        let outcome = controller
            .finish_section(TransitionCause::TimerExpired)
            .unwrap();
        assert_eq!(outcome, SectionOutcome::Completed);
        assert!(controller.phase().is_terminal());
        assert!(controller.completed_at().is_some());

        let err = controller
            .finish_section(TransitionCause::UserConfirmed)
            .unwrap_err();
        assert!(matches!(err, SessionError::NotInProgress));
    }

    #[test]
    fn timer_expiry_advances_without_confirmation() {
        // Scenario B: the forced transition happens and the stats hold.
        let mut controller = loaded_controller(4, 1);
        controller.begin().unwrap();

        controller.select_option("A) first").unwrap();
        controller.go_to_question(1).unwrap();
        controller.select_option("A) first").unwrap();
        controller.go_to_question(2).unwrap();
        controller.select_option("B) second").unwrap();

        let outcome = controller
            .finish_section(TransitionCause::TimerExpired)
            .unwrap();
        assert!(matches!(outcome, SectionOutcome::Next { .. }));

        controller
            .finish_section(TransitionCause::TimerExpired)
            .unwrap();
        let report = controller.report().unwrap();
        let stats = report.section(Section::ReadingWriting);
        assert_eq!(stats.correct, 2);
        assert_eq!(stats.incorrect, 1);
        assert_eq!(stats.omitted, 1);
        assert_eq!(stats.accuracy, 50);
    }

    #[test]
    fn navigation_clamps_to_section_bounds() {
        let mut controller = loaded_controller(3, 0);
        controller.begin().unwrap();

        assert_eq!(controller.go_to_question(1).unwrap(), 1);
        assert_eq!(controller.go_to_question(99).unwrap(), 2);
        assert_eq!(controller.go_to_question(0).unwrap(), 0);
        assert_eq!(controller.remaining_seconds(), 3840);
    }

    #[test]
    fn navigation_in_an_empty_section_stays_at_zero() {
        let mut controller = loaded_controller(0, 1);
        controller.begin().unwrap();

        assert_eq!(controller.go_to_question(5).unwrap(), 0);
        assert!(controller.current_question().is_none());
    }

    #[test]
    fn record_tick_never_raises_remaining_and_ignores_other_phases() {
        let mut controller = loaded_controller(1, 1);
        controller.record_tick(controller.timer_generation(), 10);
        assert_eq!(controller.remaining_seconds(), 0);

        controller.begin().unwrap();
        let generation = controller.timer_generation();
        controller.record_tick(generation, 3839);
        controller.record_tick(generation, 3838);
        assert_eq!(controller.remaining_seconds(), 3838);

        controller.record_tick(generation, 3839);
        assert_eq!(controller.remaining_seconds(), 3838);
    }

    #[test]
    fn superseded_timer_cannot_touch_the_next_section() {
        let mut controller = loaded_controller(1, 1);
        controller.begin().unwrap();
        let first_timer = controller.timer_generation();

        // The user confirms at the instant the first countdown runs out;
        // the expired timer's callbacks arrive after the transition.
        controller
            .finish_section(TransitionCause::UserConfirmed)
            .unwrap();
        assert_eq!(controller.phase(), ExamPhase::InProgress(Section::Math));

        controller.record_tick(first_timer, 3);
        assert_eq!(controller.remaining_seconds(), 4200);

        assert_eq!(controller.expire_timer(first_timer).unwrap(), None);
        assert_eq!(controller.phase(), ExamPhase::InProgress(Section::Math));

        // The countdown armed for Math is still heard.
        let outcome = controller
            .expire_timer(controller.timer_generation())
            .unwrap();
        assert_eq!(outcome, Some(SectionOutcome::Completed));
    }

    #[test]
    fn selection_is_idempotent_and_mark_is_independent() {
        let mut controller = loaded_controller(2, 0);
        controller.begin().unwrap();

        controller.select_option("A) first").unwrap();
        controller.select_option("A) first").unwrap();
        assert_eq!(
            controller.current_answer().unwrap().selected.as_deref(),
            Some("A) first")
        );

        controller.toggle_mark().unwrap();
        assert!(controller.current_answer().unwrap().marked);
        controller.toggle_mark().unwrap();
        assert!(!controller.current_answer().unwrap().marked);
    }

    #[test]
    fn completed_exam_rejects_mutation_and_keeps_state() {
        // Scenario E.
        let mut controller = loaded_controller(1, 1);
        controller.begin().unwrap();
        controller.select_option("A) first").unwrap();
        controller
            .finish_section(TransitionCause::UserConfirmed)
            .unwrap();
        controller
            .finish_section(TransitionCause::UserConfirmed)
            .unwrap();

        let before = controller.report().unwrap();
        assert!(matches!(
            controller.select_option("B) second"),
            Err(SessionError::Answers(AnswerSheetError::Closed))
        ));
        assert!(matches!(
            controller.toggle_mark(),
            Err(SessionError::Answers(AnswerSheetError::Closed))
        ));
        assert_eq!(controller.report().unwrap(), before);
    }

    #[test]
    fn report_is_only_available_at_completion() {
        let mut controller = loaded_controller(1, 1);
        assert!(matches!(controller.report(), Err(SessionError::NotCompleted)));

        controller.begin().unwrap();
        assert!(matches!(controller.report(), Err(SessionError::NotCompleted)));
    }

    #[test]
    fn progress_reflects_current_section() {
        let mut controller = loaded_controller(2, 1);
        controller.begin().unwrap();
        controller.select_option("A) first").unwrap();
        controller.toggle_mark().unwrap();

        let progress = controller.progress();
        assert_eq!(progress.phase, ExamPhase::InProgress(Section::ReadingWriting));
        assert_eq!(progress.section_len, 2);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.marked, 1);
        assert_eq!(progress.remaining_seconds, 3840);
    }
}
