#![forbid(unsafe_code)]

pub mod error;
pub mod exam;
pub mod progress_sync;
pub mod timer;

pub use exam_core::Clock;

pub use error::SessionError;
pub use exam::{
    ExamController, ExamPhase, ExamProgress, ExamWorkflow, SectionOutcome, TransitionCause,
};
pub use progress_sync::{ProgressClient, ProgressPayload};
pub use timer::{Countdown, CountdownTimer, Tick, TimerHandle};
