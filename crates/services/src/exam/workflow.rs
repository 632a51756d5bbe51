use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

use bank::{QuestionSource, load_bank};
use exam_core::Clock;
use exam_core::scoring::Report;

use crate::error::SessionError;
use crate::exam::controller::ExamController;
use crate::exam::progress::ExamProgress;
use crate::exam::state::{ExamPhase, SectionOutcome, TransitionCause};
use crate::progress_sync::ProgressClient;
use crate::timer::{CountdownTimer, TimerHandle};

type SharedController = Arc<Mutex<ExamController>>;
type TimerSlot = Arc<Mutex<Option<TimerHandle>>>;

//
// ─── EXAM WORKFLOW ─────────────────────────────────────────────────────────────
//

/// Orchestrates one exam attempt.
///
/// Wires the countdown timer to the controller so every transition path,
/// manual or automatic, deterministically stops the old timer and starts
/// the next one, and fires the best-effort progress save at completion.
///
/// The timer's expiry callback takes the controller lock directly from the
/// timer task, so an expiry is applied before any later user action can
/// run and a section cannot be silently extended. Each countdown carries
/// the controller's timer generation, captured under the same lock as the
/// transition that armed it; the controller drops callbacks from a
/// superseded generation, so a timer that lost the race to a user
/// confirmation cannot tick or expire against the wrong section.
pub struct ExamWorkflow {
    controller: SharedController,
    timer: TimerSlot,
    progress_client: Option<ProgressClient>,
}

impl ExamWorkflow {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            controller: Arc::new(Mutex::new(ExamController::new(clock))),
            timer: Arc::new(Mutex::new(None)),
            progress_client: None,
        }
    }

    /// Attach the external progress-tracking client.
    #[must_use]
    pub fn with_progress_client(mut self, client: ProgressClient) -> Self {
        self.progress_client = Some(client);
        self
    }

    /// Fetch and accept the question bank for a test.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Bank` for load or validation failures; the
    /// caller redirects to a fallback view rather than starting the exam.
    pub async fn load(
        &self,
        source: &dyn QuestionSource,
        test_id: &str,
    ) -> Result<(), SessionError> {
        let bank = load_bank(source, test_id).await?;
        self.lock()?.load(bank)
    }

    /// Explicit user start; begins the first section and its countdown.
    ///
    /// # Errors
    ///
    /// Propagates the controller's phase errors.
    pub fn begin(&self) -> Result<(), SessionError> {
        let (initial_seconds, generation) = {
            let mut guard = self.lock()?;
            let seconds = guard.begin()?;
            (seconds, guard.timer_generation())
        };
        Self::start_timer(
            &self.controller,
            &self.timer,
            &self.progress_client,
            generation,
            initial_seconds,
        );
        Ok(())
    }

    /// User-confirmed end of the current section.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` outside a running section.
    pub fn finish_section(&self) -> Result<SectionOutcome, SessionError> {
        let (outcome, generation) = {
            let mut guard = self.lock()?;
            let outcome = guard.finish_section(TransitionCause::UserConfirmed)?;
            (outcome, guard.timer_generation())
        };
        Self::apply_outcome(
            &self.controller,
            &self.timer,
            &self.progress_client,
            outcome,
            generation,
        );
        Ok(outcome)
    }

    /// Stop the attempt without finishing it (navigation away).
    ///
    /// The live timer is stopped so it cannot keep ticking after the
    /// session is abandoned.
    pub fn stop(&self) {
        Self::stop_timer(&self.timer);
    }

    /// # Errors
    ///
    /// Propagates the controller's navigation errors.
    pub fn go_to_question(&self, index: usize) -> Result<usize, SessionError> {
        self.lock()?.go_to_question(index)
    }

    /// # Errors
    ///
    /// Propagates the controller's mutation errors.
    pub fn select_option(&self, option: &str) -> Result<(), SessionError> {
        self.lock()?.select_option(option)
    }

    /// # Errors
    ///
    /// Propagates the controller's mutation errors.
    pub fn toggle_mark(&self) -> Result<(), SessionError> {
        self.lock()?.toggle_mark()
    }

    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` before the terminal state.
    pub fn report(&self) -> Result<Report, SessionError> {
        self.lock()?.report()
    }

    /// # Errors
    ///
    /// Returns `SessionError::Poisoned` if the shared state is poisoned.
    pub fn phase(&self) -> Result<ExamPhase, SessionError> {
        Ok(self.lock()?.phase())
    }

    /// # Errors
    ///
    /// Returns `SessionError::Poisoned` if the shared state is poisoned.
    pub fn progress(&self) -> Result<ExamProgress, SessionError> {
        Ok(self.lock()?.progress())
    }

    /// True while a countdown task is live for the current section.
    #[must_use]
    pub fn timer_running(&self) -> bool {
        self.timer
            .lock()
            .map(|slot| slot.as_ref().is_some_and(|handle| !handle.is_finished()))
            .unwrap_or(false)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ExamController>, SessionError> {
        self.controller.lock().map_err(|_| SessionError::Poisoned)
    }

    fn start_timer(
        controller: &SharedController,
        timer: &TimerSlot,
        progress_client: &Option<ProgressClient>,
        generation: u64,
        initial_seconds: u32,
    ) {
        let on_tick = {
            let controller = Arc::clone(controller);
            move |remaining| {
                if let Ok(mut guard) = controller.lock() {
                    guard.record_tick(generation, remaining);
                }
            }
        };

        let on_expire = {
            let controller = Arc::clone(controller);
            let timer = Arc::clone(timer);
            let progress_client = progress_client.clone();
            move || {
                let applied = match controller.lock() {
                    Ok(mut guard) => match guard.expire_timer(generation) {
                        Ok(Some(outcome)) => Some((outcome, guard.timer_generation())),
                        // A user confirmation won the race; this timer is done.
                        Ok(None) => None,
                        Err(err) => {
                            warn!(error = %err, "expiry transition rejected");
                            None
                        }
                    },
                    Err(_) => None,
                };
                if let Some((outcome, next_generation)) = applied {
                    Self::apply_outcome(
                        &controller,
                        &timer,
                        &progress_client,
                        outcome,
                        next_generation,
                    );
                }
            }
        };

        let handle = CountdownTimer::start(initial_seconds, on_tick, on_expire);
        if let Ok(mut slot) = timer.lock() {
            // Replacing the handle drops and thereby stops any previous
            // section's timer.
            *slot = Some(handle);
        }
    }

    fn apply_outcome(
        controller: &SharedController,
        timer: &TimerSlot,
        progress_client: &Option<ProgressClient>,
        outcome: SectionOutcome,
        generation: u64,
    ) {
        match outcome {
            SectionOutcome::Next { duration_secs, .. } => {
                Self::start_timer(controller, timer, progress_client, generation, duration_secs);
            }
            SectionOutcome::Completed => {
                Self::stop_timer(timer);
                if let Some(client) = progress_client {
                    match controller.lock() {
                        Ok(guard) => match guard.report() {
                            Ok(report) => {
                                let _task = client.spawn_save(&report);
                            }
                            Err(err) => warn!(error = %err, "progress save skipped"),
                        },
                        Err(_) => warn!("progress save skipped, session state poisoned"),
                    }
                }
            }
        }
    }

    fn stop_timer(timer: &TimerSlot) {
        if let Ok(mut slot) = timer.lock() {
            if let Some(handle) = slot.take() {
                handle.stop();
            }
        }
    }
}

impl Drop for ExamWorkflow {
    fn drop(&mut self) {
        Self::stop_timer(&self.timer);
    }
}
