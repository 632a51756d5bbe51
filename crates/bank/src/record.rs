use serde::Deserialize;

use exam_core::model::{Question, QuestionBank, QuestionId, Section};

use crate::error::ValidationError;

/// Wire shape of a single question record.
///
/// This mirrors the JSON resource format so the loader can deserialize
/// without leaking transport concerns into the domain layer.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionRecord {
    pub question_id: String,
    pub assessment: String,
    /// Section tag; `"Math"` or `"Reading and Writing"` in practice.
    pub test: String,
    pub domain: String,
    pub skill: String,
    pub difficulty: String,
    pub question_text: String,
    /// Option strings, each prefixed with a letter label, e.g. `"A) ..."`.
    pub options: Vec<String>,
    /// Single letter naming the correct option.
    pub correct_option: String,
    pub explanation: String,
    /// Relative image path; empty or absent means no image.
    #[serde(default)]
    pub image: String,
}

impl QuestionRecord {
    /// Convert the record into a validated domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Question` if the option list is empty or
    /// the correct option is not a single letter.
    pub fn into_question(self) -> Result<Question, ValidationError> {
        let image = match self.image.trim() {
            "" => None,
            path => Some(path.to_owned()),
        };

        Ok(Question::new(
            QuestionId::new(self.question_id),
            Section::from_wire(&self.test),
            self.domain,
            self.skill,
            self.difficulty,
            self.question_text,
            self.options,
            &self.correct_option,
            self.explanation,
            image,
        )?)
    }
}

/// Decode a raw payload into question records.
///
/// # Errors
///
/// Returns `ValidationError::Json` if the payload is not a well-formed
/// JSON array of records with the required string fields.
pub fn parse_payload(payload: &str) -> Result<Vec<QuestionRecord>, ValidationError> {
    Ok(serde_json::from_str(payload)?)
}

/// Validate records and partition them into a section bank.
///
/// Order within each section is preserved as received.
///
/// # Errors
///
/// Returns `ValidationError` for the first record that fails validation.
pub fn bank_from_records(
    records: impl IntoIterator<Item = QuestionRecord>,
) -> Result<QuestionBank, ValidationError> {
    let questions = records
        .into_iter()
        .map(QuestionRecord::into_question)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(QuestionBank::partition(questions))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, test: &str) -> QuestionRecord {
        QuestionRecord {
            question_id: id.to_owned(),
            assessment: "SAT".to_owned(),
            test: test.to_owned(),
            domain: "Algebra".to_owned(),
            skill: "Linear equations".to_owned(),
            difficulty: "Easy".to_owned(),
            question_text: "If 2x = 6, what is x?".to_owned(),
            options: vec!["A) 2".to_owned(), "B) 3".to_owned()],
            correct_option: "B".to_owned(),
            explanation: "Divide both sides by 2.".to_owned(),
            image: String::new(),
        }
    }

    #[test]
    fn record_converts_to_domain_question() {
        let question = record("q1", "Math").into_question().unwrap();
        assert_eq!(question.section(), Section::Math);
        assert_eq!(question.correct_option(), 'B');
        assert_eq!(question.image(), None);
    }

    #[test]
    fn blank_image_maps_to_none_and_path_is_kept() {
        let mut with_image = record("q1", "Math");
        with_image.image = "images/q1.png".to_owned();
        let question = with_image.into_question().unwrap();
        assert_eq!(question.image(), Some("images/q1.png"));
    }

    #[test]
    fn bad_correct_option_fails_validation() {
        let mut bad = record("q1", "Math");
        bad.correct_option = "B) 3".to_owned();
        let err = bad.into_question().unwrap_err();
        assert!(matches!(err, ValidationError::Question(_)));
    }

    #[test]
    fn payload_must_be_an_array_of_records() {
        assert!(matches!(
            parse_payload("{\"not\": \"an array\"}").unwrap_err(),
            ValidationError::Json(_)
        ));
        assert!(parse_payload("[]").unwrap().is_empty());
    }

    #[test]
    fn missing_required_field_fails_validation() {
        let payload = r#"[{"question_id": "q1", "test": "Math"}]"#;
        assert!(matches!(
            parse_payload(payload).unwrap_err(),
            ValidationError::Json(_)
        ));
    }

    #[test]
    fn records_partition_by_section_tag() {
        let bank = bank_from_records(vec![
            record("m1", "Math"),
            record("r1", "Reading and Writing"),
            record("m2", "Math"),
        ])
        .unwrap();

        assert_eq!(bank.section(Section::Math).len(), 2);
        assert_eq!(bank.section(Section::ReadingWriting).len(), 1);
        let math_ids: Vec<_> = bank
            .section(Section::Math)
            .iter()
            .map(|q| q.id().as_str())
            .collect();
        assert_eq!(math_ids, ["m1", "m2"]);
    }
}
