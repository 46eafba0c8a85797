use std::time::Duration;

use chatgpt::client::ChatGPT;
use chatgpt::config::ChatGPTEngine;
use chatgpt::types::CompletionResponse;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::quiz::{prompt, Quiz, QuizRequest, OPTION_COUNT, QUESTION_COUNT};

/// Enumerates failures of one generation attempt. None of these are fatal to
/// the session; the caller may retry with the same or different settings.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Missing API credential, or one the service rejected.
    #[error("API key missing or rejected: {message}")]
    Auth { message: String },

    /// Network or service failure, passed through verbatim. Not retried.
    #[error("generation service failure: {message}")]
    Transport { message: String },

    /// The service responded, but the content did not satisfy the quiz
    /// schema even after repair.
    #[error("malformed quiz response: {detail}")]
    MalformedResponse { detail: String },
}

fn classify(err: chatgpt::err::Error) -> GenerationError {
    match err {
        // The service reports a rejected key as an invalid_request_error;
        // v1.2 exposes no status code, so the message disambiguates it from
        // other request errors.
        chatgpt::err::Error::BackendError {
            message,
            error_type,
        } => {
            if error_type == "invalid_request_error"
                && message.to_lowercase().contains("api key")
            {
                GenerationError::Auth { message }
            } else {
                GenerationError::Transport {
                    message: format!("{}: {}", error_type, message),
                }
            }
        }
        other => GenerationError::Transport {
            message: other.to_string(),
        },
    }
}

pub struct QuizGenerator {
    client: ChatGPT,
}

impl QuizGenerator {
    /// An empty key is rejected up front; a syntactically present but wrong
    /// key only surfaces once the service refuses it.
    pub fn new(api_key: &str) -> Result<QuizGenerator, GenerationError> {
        if api_key.trim().is_empty() {
            return Err(GenerationError::Auth {
                message: "no API key provided".to_string(),
            });
        }

        let mut client = ChatGPT::new(api_key).map_err(classify)?;
        client.config.engine = ChatGPTEngine::Gpt35Turbo;
        client.config.timeout = Duration::from_secs(60);

        Ok(QuizGenerator { client })
    }

    /// One blocking call to the service, then extraction, repair, parsing
    /// and invariant validation. Returns a fully valid quiz or an error,
    /// never a partial quiz.
    pub async fn generate(&self, request: &QuizRequest) -> Result<Quiz, GenerationError> {
        let prompt = prompt::build_prompt(request);
        log::debug!("requesting quiz: {:?}", request);

        let response: CompletionResponse =
            self.client.send_message(&prompt).await.map_err(classify)?;
        let raw = response.message().content.clone();
        log::debug!("raw quiz response: {}", raw);

        parse_quiz(&raw)
    }
}

/// The prompt asks for bare JSON, but the service is not trusted to honor
/// that: a fenced code block, if present, wins over the surrounding prose.
fn extract_candidate(raw: &str) -> &str {
    let inner_start = if let Some(idx) = raw.find("```json") {
        idx + "```json".len()
    } else if let Some(idx) = raw.find("```") {
        idx + "```".len()
    } else {
        return raw;
    };

    let inner = &raw[inner_start..];
    match inner.find("```") {
        Some(end) => &inner[..end],
        None => inner,
    }
}

lazy_static! {
    static ref TRAILING_COMMA: Regex = Regex::new(r",\s*([\]}])").unwrap();
}

/// Strips trailing commas before a closing `]` or `}`, a common artifact of
/// model output. Runs to a fixpoint, so applying it twice changes nothing.
/// Purely textual and applied before parsing, never as a fallback after a
/// failed parse.
pub fn repair_trailing_commas(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = TRAILING_COMMA.replace_all(&current, "$1").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

fn validate(quiz: &Quiz) -> Result<(), String> {
    if quiz.title.trim().is_empty() {
        return Err("quiz title is empty".to_string());
    }
    if quiz.intro.trim().is_empty() {
        return Err("quiz intro is empty".to_string());
    }
    if quiz.questions.len() != QUESTION_COUNT {
        return Err(format!(
            "expected {} questions, got {}",
            QUESTION_COUNT,
            quiz.questions.len()
        ));
    }

    for (idx, question) in quiz.questions.iter().enumerate() {
        if question.text.trim().is_empty() {
            return Err(format!("question {} has empty text", idx + 1));
        }
        if question.options.len() != OPTION_COUNT {
            return Err(format!(
                "question {} has {} options, expected {}",
                idx + 1,
                question.options.len(),
                OPTION_COUNT
            ));
        }
        if question.options.iter().any(|option| option.trim().is_empty()) {
            return Err(format!("question {} has an empty option", idx + 1));
        }
        if question.explanation.trim().is_empty() {
            return Err(format!("question {} has no explanation", idx + 1));
        }
        if !question.option_labels().contains(&question.answer_label) {
            return Err(format!(
                "question {}: answer label {:?} is not among its options",
                idx + 1,
                question.answer_label.as_str()
            ));
        }
    }

    Ok(())
}

/// Turns the raw model response into a validated quiz, or a
/// `MalformedResponse` carrying enough detail to diagnose the failure.
pub fn parse_quiz(raw: &str) -> Result<Quiz, GenerationError> {
    let candidate = extract_candidate(raw);
    let repaired = repair_trailing_commas(candidate);

    let quiz: Quiz =
        serde_json::from_str(&repaired).map_err(|err| GenerationError::MalformedResponse {
            detail: format!("{}; raw response: {}", err, raw.trim()),
        })?;

    validate(&quiz).map_err(|detail| GenerationError::MalformedResponse { detail })?;
    Ok(quiz)
}
