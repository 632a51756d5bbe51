use crate::exam::state::ExamPhase;

/// Aggregated view of exam progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamProgress {
    pub phase: ExamPhase,
    pub question_index: usize,
    pub section_len: usize,
    pub remaining_seconds: u32,
    pub answered: usize,
    pub marked: usize,
}
