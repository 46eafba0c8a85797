use crate::quiz::grader::{self, GradeResult};
use crate::quiz::{OptionLabel, Quiz};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SessionPhase {
    #[default]
    Idle,
    Generating,
    AwaitingAnswers,
    Graded,
}

/// Outcome of a submission attempt. An incomplete answer set is an expected
/// user-facing result, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Graded(GradeResult),
    Incomplete { unanswered: usize },
}

/// One user's quiz attempt: at most one quiz, its in-progress answers and
/// its grade. There is no terminal phase; a session restarts any number of
/// times, each restart discarding prior state.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct QuizSession {
    phase: SessionPhase,
    quiz: Option<Quiz>,
    answers: Vec<Option<OptionLabel>>,
    result: Option<GradeResult>,
}

impl QuizSession {
    pub fn new() -> QuizSession {
        QuizSession::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    pub fn result(&self) -> Option<&GradeResult> {
        self.result.as_ref()
    }

    /// Enters `Generating`, discarding any previous quiz, answers and grade.
    /// Returns `false` without touching anything when a generation is
    /// already in flight, so a duplicate start never resets the attempt.
    pub fn start_generation(&mut self) -> bool {
        if self.phase == SessionPhase::Generating {
            return false;
        }
        self.quiz = None;
        self.answers.clear();
        self.result = None;
        self.phase = SessionPhase::Generating;
        true
    }

    /// Stores the generated quiz and sizes an empty answer set to it.
    pub fn on_success(&mut self, quiz: Quiz) {
        assert_eq!(
            self.phase,
            SessionPhase::Generating,
            "quiz delivered outside of generation"
        );
        self.answers = vec![None; quiz.questions.len()];
        self.quiz = Some(quiz);
        self.phase = SessionPhase::AwaitingAnswers;
    }

    /// A failed generation leaves the session empty and re-triggerable.
    pub fn on_failure(&mut self) {
        assert_eq!(
            self.phase,
            SessionPhase::Generating,
            "failure reported outside of generation"
        );
        self.quiz = None;
        self.answers.clear();
        self.phase = SessionPhase::Idle;
    }

    /// Upserts one answer. An out-of-range index is a programming error.
    pub fn record_answer(&mut self, index: usize, label: OptionLabel) {
        assert_eq!(
            self.phase,
            SessionPhase::AwaitingAnswers,
            "answers can only be recorded while a quiz is displayed"
        );
        self.answers[index] = Some(label);
    }

    /// Index of the first question without an answer, if any.
    pub fn next_unanswered(&self) -> Option<usize> {
        self.answers.iter().position(|answer| answer.is_none())
    }

    /// Grades the attempt if every question has an answer; otherwise stays
    /// in `AwaitingAnswers` and reports how many are still open.
    pub fn submit(&mut self) -> SubmitOutcome {
        assert_eq!(
            self.phase,
            SessionPhase::AwaitingAnswers,
            "submit is only valid while answers are being collected"
        );

        let unanswered = self.answers.iter().filter(|answer| answer.is_none()).count();
        if unanswered > 0 {
            return SubmitOutcome::Incomplete { unanswered };
        }

        let quiz = self.quiz.as_ref().expect("awaiting answers without a quiz");
        let answers: Vec<OptionLabel> = self.answers.iter().flatten().cloned().collect();
        let result = grader::grade(quiz, &answers);

        self.result = Some(result.clone());
        self.phase = SessionPhase::Graded;
        SubmitOutcome::Graded(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::grader::Tier;
    use crate::quiz::{QuizQuestion, QUESTION_COUNT};

    fn quiz() -> Quiz {
        let questions = (0..QUESTION_COUNT)
            .map(|idx| QuizQuestion {
                text: format!("질문 {}?", idx + 1),
                options: vec![
                    "1. 하나".to_string(),
                    "2. 둘".to_string(),
                    "3. 셋".to_string(),
                    "4. 넷".to_string(),
                ],
                answer_label: OptionLabel::new("1"),
                explanation: "해설".to_string(),
            })
            .collect();
        Quiz {
            title: "테스트".to_string(),
            intro: "인트로".to_string(),
            questions,
        }
    }

    fn session_awaiting_answers() -> QuizSession {
        let mut session = QuizSession::new();
        assert!(session.start_generation());
        session.on_success(quiz());
        session
    }

    #[test]
    fn successful_generation_sizes_an_empty_answer_set() {
        let session = session_awaiting_answers();
        assert_eq!(session.phase(), SessionPhase::AwaitingAnswers);
        assert_eq!(session.next_unanswered(), Some(0));
        assert!(session.quiz().is_some());
        assert!(session.result().is_none());
    }

    #[test]
    fn duplicate_start_generation_is_a_no_op() {
        let mut session = QuizSession::new();
        assert!(session.start_generation());
        assert!(!session.start_generation());
        assert_eq!(session.phase(), SessionPhase::Generating);
        // the in-flight attempt still completes normally
        session.on_success(quiz());
        assert_eq!(session.phase(), SessionPhase::AwaitingAnswers);
    }

    #[test]
    fn failed_generation_returns_to_idle_empty() {
        let mut session = QuizSession::new();
        assert!(session.start_generation());
        session.on_failure();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.quiz().is_none());
        // the session stays re-triggerable
        assert!(session.start_generation());
    }

    #[test]
    fn incomplete_submission_never_grades() {
        let mut session = session_awaiting_answers();
        session.record_answer(0, OptionLabel::new("1"));
        session.record_answer(2, OptionLabel::new("3"));

        let outcome = session.submit();
        assert_eq!(outcome, SubmitOutcome::Incomplete { unanswered: 3 });
        assert_eq!(session.phase(), SessionPhase::AwaitingAnswers);
        assert!(session.result().is_none());
    }

    #[test]
    fn complete_submission_grades_and_stores_the_result() {
        let mut session = session_awaiting_answers();
        for idx in 0..QUESTION_COUNT {
            session.record_answer(idx, OptionLabel::new("1"));
        }

        match session.submit() {
            SubmitOutcome::Graded(result) => {
                assert_eq!(result.score, 5);
                assert_eq!(result.tier(), Tier::PoleToWin);
            }
            other => panic!("expected a graded outcome, got {:?}", other),
        }
        assert_eq!(session.phase(), SessionPhase::Graded);
        assert!(session.result().is_some());
    }

    #[test]
    fn answers_can_be_revised_before_submission() {
        let mut session = session_awaiting_answers();
        for idx in 0..QUESTION_COUNT {
            session.record_answer(idx, OptionLabel::new("2"));
        }
        session.record_answer(0, OptionLabel::new("1"));

        match session.submit() {
            SubmitOutcome::Graded(result) => assert_eq!(result.score, 1),
            other => panic!("expected a graded outcome, got {:?}", other),
        }
    }

    #[test]
    fn restarting_a_graded_session_discards_everything() {
        let mut session = session_awaiting_answers();
        for idx in 0..QUESTION_COUNT {
            session.record_answer(idx, OptionLabel::new("1"));
        }
        session.submit();
        assert_eq!(session.phase(), SessionPhase::Graded);

        assert!(session.start_generation());
        assert_eq!(session.phase(), SessionPhase::Generating);
        assert!(session.quiz().is_none());
        assert!(session.result().is_none());
        assert_eq!(session.next_unanswered(), None);
    }

    #[test]
    #[should_panic]
    fn out_of_range_answer_index_panics() {
        let mut session = session_awaiting_answers();
        session.record_answer(QUESTION_COUNT, OptionLabel::new("1"));
    }
}
