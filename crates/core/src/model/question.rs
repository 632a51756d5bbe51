use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::Section;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors raised while constructing a `Question`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {0} has no options")]
    NoOptions(QuestionId),

    #[error("question {id} has invalid correct option {value:?}")]
    InvalidCorrectOption { id: QuestionId, value: String },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Unique identifier for a question. Wire ids are opaque strings.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(String);

impl QuestionId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns the leading letter label of an option string, e.g. `'A'` for
/// `"A) 14"`.
#[must_use]
pub fn option_letter(option: &str) -> Option<char> {
    option.chars().next().filter(char::is_ascii_alphabetic)
}

/// Immutable exam question.
///
/// Created once when a question bank loads and never mutated afterwards.
/// The body holds rich text with embedded math and optional markdown-style
/// headers; rendering is a presentation concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    section: Section,
    domain: String,
    skill: String,
    difficulty: String,
    body: String,
    options: Vec<String>,
    correct_option: char,
    explanation: String,
    image: Option<String>,
}

impl Question {
    /// Create a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::NoOptions` if the option list is empty, and
    /// `QuestionError::InvalidCorrectOption` if the correct option is not a
    /// single letter.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: QuestionId,
        section: Section,
        domain: impl Into<String>,
        skill: impl Into<String>,
        difficulty: impl Into<String>,
        body: impl Into<String>,
        options: Vec<String>,
        correct_option: &str,
        explanation: impl Into<String>,
        image: Option<String>,
    ) -> Result<Self, QuestionError> {
        if options.is_empty() {
            return Err(QuestionError::NoOptions(id));
        }

        let mut letters = correct_option.chars();
        let letter = match (letters.next(), letters.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => c,
            _ => {
                return Err(QuestionError::InvalidCorrectOption {
                    id,
                    value: correct_option.to_owned(),
                });
            }
        };

        Ok(Self {
            id,
            section,
            domain: domain.into(),
            skill: skill.into(),
            difficulty: difficulty.into(),
            body: body.into(),
            options,
            correct_option: letter,
            explanation: explanation.into(),
            image,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn section(&self) -> Section {
        self.section
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    #[must_use]
    pub fn skill(&self) -> &str {
        &self.skill
    }

    #[must_use]
    pub fn difficulty(&self) -> &str {
        &self.difficulty
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_option(&self) -> char {
        self.correct_option
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Whether a selected option string answers this question correctly.
    ///
    /// Correctness compares the selection's leading letter against the
    /// correct letter, exact and case-sensitive.
    #[must_use]
    pub fn is_correct(&self, selected: &str) -> bool {
        selected.chars().next() == Some(self.correct_option)
    }
}

//
// ─── QUESTION BANK ─────────────────────────────────────────────────────────────
//

/// The full question set for one test, partitioned by section.
///
/// Order within each section is preserved as received; shuffling, if
/// desired, is a caller concern applied before the session starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBank {
    reading_writing: Vec<Question>,
    math: Vec<Question>,
}

impl QuestionBank {
    /// Partition a flat list of questions by their section tag.
    #[must_use]
    pub fn partition(questions: impl IntoIterator<Item = Question>) -> Self {
        let mut bank = Self::default();
        for question in questions {
            match question.section() {
                Section::ReadingWriting => bank.reading_writing.push(question),
                Section::Math => bank.math.push(question),
            }
        }
        bank
    }

    #[must_use]
    pub fn section(&self, section: Section) -> &[Question] {
        match section {
            Section::ReadingWriting => &self.reading_writing,
            Section::Math => &self.math,
        }
    }

    /// Total number of questions across both sections.
    #[must_use]
    pub fn total(&self) -> usize {
        self.reading_writing.len() + self.math.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Iterate all questions in section order.
    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.reading_writing.iter().chain(self.math.iter())
    }

    /// Distinct skill tags in first-encountered order.
    #[must_use]
    pub fn skills(&self) -> Vec<&str> {
        let mut skills: Vec<&str> = Vec::new();
        for question in self.iter() {
            if !skills.contains(&question.skill()) {
                skills.push(question.skill());
            }
        }
        skills
    }

    /// All questions tagged with the given skill, in section order.
    #[must_use]
    pub fn by_skill(&self, skill: &str) -> Vec<&Question> {
        self.iter().filter(|q| q.skill() == skill).collect()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
