mod controller;
mod progress;
mod state;
mod workflow;

// Public API of the exam subsystem.
pub use controller::ExamController;
pub use progress::ExamProgress;
pub use state::{ExamPhase, SectionOutcome, TransitionCause};
pub use workflow::ExamWorkflow;
