use crate::quiz::{OptionLabel, Quiz};

/// Result bucket derived from the score percentage, named after race
/// finishing positions as the bot presents them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Tier {
    /// 100%
    PoleToWin,
    /// >= 80%
    Podium,
    /// >= 60%
    Points,
    /// anything below
    PitStop,
}

impl Tier {
    pub fn from_percentage(percentage: u32) -> Tier {
        if percentage == 100 {
            Tier::PoleToWin
        } else if percentage >= 80 {
            Tier::Podium
        } else if percentage >= 60 {
            Tier::Points
        } else {
            Tier::PitStop
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Tier::PoleToWin => "🥇 P1! 폴 투 윈! - 완벽해요!",
            Tier::Podium => "🥈 포디움 피니시! - 훌륭한 레이스였습니다.",
            Tier::Points => "🥉 포인트 획득! - 잘했습니다.",
            Tier::PitStop => "🔧 피트인 필요! - 더 연습해보세요!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QuestionGrade {
    pub correct: bool,
    pub user_label: OptionLabel,
    pub correct_label: OptionLabel,
}

/// Derived once per submission and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GradeResult {
    pub score: usize,
    pub total: usize,
    pub per_question: Vec<QuestionGrade>,
}

impl GradeResult {
    pub fn tier(&self) -> Tier {
        Tier::from_percentage((self.score * 100 / self.total) as u32)
    }
}

/// Compares each user label against the question's answer label. Labels are
/// canonicalised at construction, so equality here already ignores
/// whitespace and trailing punctuation. Pure: identical inputs always yield
/// identical results.
///
/// The caller (the session state machine) guarantees one answer per
/// question; a mismatch is a programming error.
pub fn grade(quiz: &Quiz, answers: &[OptionLabel]) -> GradeResult {
    assert_eq!(
        answers.len(),
        quiz.questions.len(),
        "grading requires one answer per question"
    );

    let per_question: Vec<QuestionGrade> = quiz
        .questions
        .iter()
        .zip(answers)
        .map(|(question, user_label)| QuestionGrade {
            correct: *user_label == question.answer_label,
            user_label: user_label.clone(),
            correct_label: question.answer_label.clone(),
        })
        .collect();

    let score = per_question.iter().filter(|grade| grade.correct).count();

    GradeResult {
        score,
        total: quiz.questions.len(),
        per_question,
    }
}
