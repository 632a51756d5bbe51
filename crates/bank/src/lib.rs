#![forbid(unsafe_code)]

pub mod error;
pub mod record;
pub mod source;

pub use error::{BankError, ResourceError, ValidationError};
pub use record::QuestionRecord;
pub use source::{
    FileSource, HttpSource, QuestionSource, StaticSource, load_bank, load_skill_questions,
};
