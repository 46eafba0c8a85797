pub mod generator;
pub mod grader;
pub mod prompt;
pub mod session;

/// Every quiz has exactly this many questions.
pub const QUESTION_COUNT: usize = 5;
/// Every question has exactly this many answer options.
pub const OPTION_COUNT: usize = 4;

pub const MIN_SEASON: u16 = 1950;
pub const MAX_SEASON: u16 = 2025;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum QuizTopic {
    /// Special-cased: expands to a "mix all categories" instruction.
    RandomMix,
    Legends,
    CurrentGrid,
    HistoryAndRecords,
    TechAndRegulations,
    Circuits,
    DramaticMoments,
}

impl QuizTopic {
    pub fn all() -> [QuizTopic; 7] {
        [
            QuizTopic::RandomMix,
            QuizTopic::Legends,
            QuizTopic::CurrentGrid,
            QuizTopic::HistoryAndRecords,
            QuizTopic::TechAndRegulations,
            QuizTopic::Circuits,
            QuizTopic::DramaticMoments,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuizTopic::RandomMix => "🎲 랜덤 믹스 (Random Mix - All Topics)",
            QuizTopic::Legends => "전설적인 드라이버 (Legends: Senna, Schumacher, etc.)",
            QuizTopic::CurrentGrid => "현역 드라이버 (Current Grid: Verstappen, Hamilton, etc.)",
            QuizTopic::HistoryAndRecords => "F1 역사와 기록 (History & Records)",
            QuizTopic::TechAndRegulations => "F1 기술과 규칙 (Tech & Regulations)",
            QuizTopic::Circuits => "서킷과 그랑프리 (Circuits & Grand Prix)",
            QuizTopic::DramaticMoments => "드라마틱한 순간들 (Dramatic Moments & Rivalries)",
        }
    }

    pub fn from_label(label: &str) -> Option<QuizTopic> {
        QuizTopic::all()
            .into_iter()
            .find(|topic| topic.label() == label.trim())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DifficultyTier {
    Rookie,
    #[default]
    Driver,
    WorldChampion,
}

impl DifficultyTier {
    pub fn all() -> [DifficultyTier; 3] {
        [
            DifficultyTier::Rookie,
            DifficultyTier::Driver,
            DifficultyTier::WorldChampion,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            DifficultyTier::Rookie => "Rookie (입문)",
            DifficultyTier::Driver => "Driver (중급)",
            DifficultyTier::WorldChampion => "World Champion (상급)",
        }
    }

    pub fn from_label(label: &str) -> Option<DifficultyTier> {
        DifficultyTier::all()
            .into_iter()
            .find(|tier| tier.label() == label.trim())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum YearFilter {
    #[default]
    AllTime,
    Season(u16),
}

impl YearFilter {
    pub const ALL_TIME_LABEL: &'static str = "All Time (전체 연도)";

    /// All-Time first, then every season newest-first.
    pub fn catalogue() -> Vec<YearFilter> {
        let mut years = vec![YearFilter::AllTime];
        years.extend((MIN_SEASON..=MAX_SEASON).rev().map(YearFilter::Season));
        years
    }

    pub fn label(&self) -> String {
        match self {
            YearFilter::AllTime => YearFilter::ALL_TIME_LABEL.to_string(),
            YearFilter::Season(year) => year.to_string(),
        }
    }

    /// Accepts the All-Time label or a 4-digit season within bounds.
    pub fn parse(text: &str) -> Option<YearFilter> {
        let text = text.trim();
        if text == YearFilter::ALL_TIME_LABEL {
            return Some(YearFilter::AllTime);
        }
        let year: u16 = text.parse().ok()?;
        if (MIN_SEASON..=MAX_SEASON).contains(&year) {
            Some(YearFilter::Season(year))
        } else {
            None
        }
    }
}

/// Settings for one generation attempt. Built once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QuizRequest {
    pub topic: QuizTopic,
    pub difficulty: DifficultyTier,
    pub year: YearFilter,
}

impl QuizRequest {
    pub fn new(topic: QuizTopic, difficulty: DifficultyTier, year: YearFilter) -> Self {
        Self {
            topic,
            difficulty,
            year,
        }
    }
}

/// The stable "1".."4" index label of an answer option, used for correctness
/// comparison independent of the option's display text.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub struct OptionLabel(String);

impl OptionLabel {
    /// Canonicalises the raw label: surrounding whitespace and trailing
    /// punctuation ("1.", "1)", " 1 ") all compare equal to "1".
    pub fn new(raw: &str) -> Self {
        let trimmed = raw
            .trim()
            .trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace());
        Self(trimmed.to_string())
    }

    /// Extracts the index label from option display text such as
    /// "1. Option A".
    pub fn from_display(display: &str) -> Self {
        let token = display.split('.').next().unwrap_or(display);
        Self::new(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for OptionLabel {
    // The model sometimes answers with the full option text ("1. ...")
    // instead of the bare index label.
    fn from(raw: String) -> Self {
        Self::from_display(&raw)
    }
}

impl From<OptionLabel> for String {
    fn from(label: OptionLabel) -> Self {
        label.0
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QuizQuestion {
    #[serde(rename = "question")]
    pub text: String,
    /// Exactly four options, each prefixed with its index label ("1. ...").
    /// Author-given order is preserved.
    pub options: Vec<String>,
    #[serde(rename = "answer")]
    pub answer_label: OptionLabel,
    pub explanation: String,
}

impl QuizQuestion {
    pub fn option_labels(&self) -> Vec<OptionLabel> {
        self.options
            .iter()
            .map(|option| OptionLabel::from_display(option))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Quiz {
    pub title: String,
    pub intro: String,
    pub questions: Vec<QuizQuestion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_catalogue_is_all_time_then_newest_first() {
        let years = YearFilter::catalogue();
        assert_eq!(years[0], YearFilter::AllTime);
        assert_eq!(years[1], YearFilter::Season(2025));
        assert_eq!(*years.last().unwrap(), YearFilter::Season(1950));
        assert_eq!(years.len(), 1 + (2025 - 1950 + 1) as usize);
    }

    #[test]
    fn year_parse_rejects_out_of_range_seasons() {
        assert_eq!(YearFilter::parse("2003"), Some(YearFilter::Season(2003)));
        assert_eq!(
            YearFilter::parse(YearFilter::ALL_TIME_LABEL),
            Some(YearFilter::AllTime)
        );
        assert_eq!(YearFilter::parse("1949"), None);
        assert_eq!(YearFilter::parse("2026"), None);
        assert_eq!(YearFilter::parse("next year"), None);
    }

    #[test]
    fn random_mix_is_an_explicit_variant_not_a_label_match() {
        let topic = QuizTopic::from_label("🎲 랜덤 믹스 (Random Mix - All Topics)").unwrap();
        assert_eq!(topic, QuizTopic::RandomMix);
        assert!(QuizTopic::from_label("랜덤").is_none());
    }

    #[test]
    fn option_label_canonicalisation_is_robust() {
        assert_eq!(OptionLabel::new(" 1 "), OptionLabel::new("1"));
        assert_eq!(OptionLabel::new("1."), OptionLabel::new("1"));
        assert_eq!(OptionLabel::new("1)"), OptionLabel::new("1"));
        assert_eq!(
            OptionLabel::from_display("3. 미하엘 슈마허"),
            OptionLabel::new("3")
        );
        assert_ne!(OptionLabel::new("1"), OptionLabel::new("2"));
    }

    #[test]
    fn quiz_round_trips_through_its_json_shape() {
        let quiz = Quiz {
            title: "2021 시즌".to_string(),
            intro: "알고 계셨나요?".to_string(),
            questions: vec![QuizQuestion {
                text: "2021년 챔피언은 누구일까요?".to_string(),
                options: vec![
                    "1. 막스 베르스타펜".to_string(),
                    "2. 루이스 해밀턴".to_string(),
                    "3. 세르히오 페레스".to_string(),
                    "4. 랜도 노리스".to_string(),
                ],
                answer_label: OptionLabel::new("1"),
                explanation: "아부다비 마지막 랩!".to_string(),
            }],
        };

        let json = serde_json::to_string(&quiz).unwrap();
        assert!(json.contains("\"question\""));
        assert!(json.contains("\"answer\":\"1\""));

        let parsed: Quiz = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, quiz);
    }
}
