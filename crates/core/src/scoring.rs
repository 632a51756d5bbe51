use serde::Serialize;
use std::collections::HashMap;

use crate::model::{AnswerBook, AnswerSheet, Question, QuestionBank, Section};

/// How many skills to surface on each end of the accuracy ranking.
const SURFACED_SKILLS: usize = 3;

//
// ─── SECTION STATS ─────────────────────────────────────────────────────────────
//

/// Raw scoring results for one section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionStats {
    pub correct: u32,
    /// Answered, but with the wrong option.
    pub incorrect: u32,
    /// No option selected at scoring time.
    pub omitted: u32,
    pub total: u32,
    /// `round(correct / total * 100)`, 0 when the section is empty.
    pub accuracy: u32,
}

//
// ─── SKILL STATS ───────────────────────────────────────────────────────────────
//

/// Accuracy for one skill group.
///
/// Groups exist only for skills present in the loaded question set, so
/// `total` is always at least 1. Accuracy is left unrounded; the
/// presentation layer rounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillStats {
    pub skill: String,
    pub correct: u32,
    pub total: u32,
    pub accuracy: f64,
}

//
// ─── REPORT ────────────────────────────────────────────────────────────────────
//

/// Post-completion scoring and skill-level analytics report.
///
/// Derived on demand from the question bank and answer book; never stored
/// or mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub reading_writing: SectionStats,
    pub math: SectionStats,
    /// Per-skill accuracy in first-encountered order.
    pub skills: Vec<SkillStats>,
    /// Up to three skills with the lowest accuracy, ascending.
    pub weakest_skills: Vec<String>,
    /// Up to three skills with the highest accuracy, descending.
    pub strongest_skills: Vec<String>,
    pub total_correct: u32,
    pub total_questions: u32,
    pub total_percentage: f64,
}

impl Report {
    #[must_use]
    pub fn section(&self, section: Section) -> &SectionStats {
        match section {
            Section::ReadingWriting => &self.reading_writing,
            Section::Math => &self.math,
        }
    }
}

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Score a completed exam.
///
/// Pure function over the loaded questions and the captured answer state;
/// identical inputs always produce an identical report.
#[must_use]
pub fn score(bank: &QuestionBank, answers: &AnswerBook) -> Report {
    let reading_writing = section_stats(
        bank.section(Section::ReadingWriting),
        answers.sheet(Section::ReadingWriting),
    );
    let math = section_stats(bank.section(Section::Math), answers.sheet(Section::Math));

    let skills = skill_stats(bank, answers);
    let (weakest_skills, strongest_skills) = surface_skills(&skills);

    let total_correct = reading_writing.correct + math.correct;
    let total_questions = reading_writing.total + math.total;
    let total_percentage = if total_questions == 0 {
        0.0
    } else {
        f64::from(total_correct) / f64::from(total_questions) * 100.0
    };

    Report {
        reading_writing,
        math,
        skills,
        weakest_skills,
        strongest_skills,
        total_correct,
        total_questions,
        total_percentage,
    }
}

fn section_stats(questions: &[Question], sheet: &AnswerSheet) -> SectionStats {
    let mut stats = SectionStats {
        total: questions.len() as u32,
        ..SectionStats::default()
    };

    for (index, question) in questions.iter().enumerate() {
        match sheet.state(index).and_then(|s| s.selected.as_deref()) {
            Some(selected) if question.is_correct(selected) => stats.correct += 1,
            Some(_) => stats.incorrect += 1,
            None => stats.omitted += 1,
        }
    }

    stats.accuracy = if stats.total == 0 {
        0
    } else {
        (f64::from(stats.correct) / f64::from(stats.total) * 100.0).round() as u32
    };
    stats
}

fn skill_stats(bank: &QuestionBank, answers: &AnswerBook) -> Vec<SkillStats> {
    let mut groups: Vec<SkillStats> = Vec::new();
    let mut index_by_skill: HashMap<String, usize> = HashMap::new();

    for section in Section::ORDER {
        let sheet = answers.sheet(section);
        for (index, question) in bank.section(section).iter().enumerate() {
            let slot = *index_by_skill
                .entry(question.skill().to_owned())
                .or_insert_with(|| {
                    groups.push(SkillStats {
                        skill: question.skill().to_owned(),
                        correct: 0,
                        total: 0,
                        accuracy: 0.0,
                    });
                    groups.len() - 1
                });

            groups[slot].total += 1;
            let answered_correctly = sheet
                .state(index)
                .and_then(|s| s.selected.as_deref())
                .is_some_and(|selected| question.is_correct(selected));
            if answered_correctly {
                groups[slot].correct += 1;
            }
        }
    }

    for group in &mut groups {
        group.accuracy = f64::from(group.correct) / f64::from(group.total) * 100.0;
    }
    groups
}

/// Rank skills by accuracy and surface both ends of the ordering.
///
/// The sort is stable, so skills with equal accuracy keep their
/// first-encountered order.
fn surface_skills(skills: &[SkillStats]) -> (Vec<String>, Vec<String>) {
    let mut ranked: Vec<&SkillStats> = skills.iter().collect();
    ranked.sort_by(|a, b| a.accuracy.total_cmp(&b.accuracy));

    let weakest = ranked
        .iter()
        .take(SURFACED_SKILLS)
        .map(|s| s.skill.clone())
        .collect();
    let strongest = ranked
        .iter()
        .rev()
        .take(SURFACED_SKILLS)
        .map(|s| s.skill.clone())
        .collect();
    (weakest, strongest)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
