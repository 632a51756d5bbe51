mod answer;
mod question;
mod section;

pub use answer::{AnswerBook, AnswerSheet, AnswerSheetError, AnswerState};
pub use question::{Question, QuestionBank, QuestionError, QuestionId, option_letter};
pub use section::Section;
