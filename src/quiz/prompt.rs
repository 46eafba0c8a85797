use crate::quiz::{DifficultyTier, QuizRequest, QuizTopic, YearFilter, QUESTION_COUNT};

/// Quiz content language. A build-time constant rather than a user setting;
/// `build_prompt_in` takes an override for other deployments.
pub const DEFAULT_LANGUAGE: &str = "Korean (한국어)";

fn difficulty_guide(difficulty: DifficultyTier) -> &'static str {
    match difficulty {
        DifficultyTier::Rookie => {
            "Easy questions for beginners. Focus on famous drivers, teams, and basic rules."
        }
        DifficultyTier::Driver => {
            "Medium difficulty. Specific stats, historical events, track details, and technology."
        }
        DifficultyTier::WorldChampion => {
            "Very Hard. Obscure records, specific year details, technical regulations, and deep history."
        }
    }
}

fn topic_instruction(topic: QuizTopic) -> String {
    match topic {
        QuizTopic::RandomMix => {
            "Mix questions from various categories: Drivers, History, Technology, Circuits, and Rules."
                .to_string()
        }
        other => other.label().to_string(),
    }
}

fn year_instruction(year: YearFilter) -> String {
    match year {
        YearFilter::AllTime => "Include questions from all F1 seasons.".to_string(),
        YearFilter::Season(season) => {
            format!("Focus on events and facts from the {} F1 season.", season)
        }
    }
}

/// Builds the instruction payload for one generation attempt. Pure and
/// deterministic: the same request always yields the same prompt.
pub fn build_prompt(request: &QuizRequest) -> String {
    build_prompt_in(request, DEFAULT_LANGUAGE)
}

pub fn build_prompt_in(request: &QuizRequest, language: &str) -> String {
    format!(
        r#"You are an F1 (Formula 1) Expert and Commentator. You are creating a quiz for a 12-year-old fan who loves F1 history, drivers, and technology.

**Task**: Create a fun and challenging F1 Quiz Set.

**Parameters**:
- **Topic**: {topic}
- **Year**: {year}
- **Difficulty**: {difficulty}
- **Format**: {count} Multiple Choice Questions.

**Requirements**:
1. **Context/Intro**: Start with a "Did you know?" style short paragraph related to the topic. It should be interesting and educational (approx 3-5 sentences).
2. **Questions**: Create exactly {count} multiple-choice questions.
   - Make them fun and engaging.
   - Ensure options are plausible.
3. **Language**: **{language}**. The content must be in {language}, friendly and exciting for a 12-year-old.
4. **Explanation**: Provide a clear explanation for the correct answer.

**Output Format**:
Return ONLY a valid JSON object with the following structure, and nothing else:
{{
    "title": "Quiz Title (e.g., 'Senna vs Prost', 'The 2021 Season')",
    "intro": "Interesting intro text...",
    "questions": [
        {{
            "question": "Question text...",
            "options": ["1. Option A", "2. Option B", "3. Option C", "4. Option D"],
            "answer": "1",
            "explanation": "Explanation text..."
        }}
    ]
}}"#,
        topic = topic_instruction(request.topic),
        year = year_instruction(request.year),
        difficulty = difficulty_guide(request.difficulty),
        count = QUESTION_COUNT,
        language = language,
    )
}
