mod quiz;

use std::sync::Arc;

use dotenv::dotenv;
use quiz::generator::QuizGenerator;
use quiz::grader::GradeResult;
use quiz::session::{QuizSession, SubmitOutcome};
use quiz::{DifficultyTier, OptionLabel, Quiz, QuizRequest, QuizTopic, YearFilter};
use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
    types::{ChatAction, KeyboardButton, KeyboardMarkup},
};

type QuizDialogue = Dialogue<State, InMemStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    ReceiveTopic,
    ReceiveYear {
        topic: QuizTopic,
    },
    ReceiveDifficulty {
        topic: QuizTopic,
        year: YearFilter,
    },
    InQuiz {
        session: QuizSession,
    },
}

#[tokio::main]
async fn main() {
    dotenv().expect("Failed to load .env file");
    let api_key = std::env::var("CHATGPT_API_KEY").expect("CHATGPT_API_KEY is not set");

    pretty_env_logger::init();
    log::info!("Starting F1 quiz bot...");

    let bot = Bot::from_env();

    let generator =
        Arc::new(QuizGenerator::new(&api_key).expect("Unable to configure the quiz generator"));

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, InMemStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::ReceiveTopic].endpoint(receive_topic))
            .branch(dptree::case![State::ReceiveYear { topic }].endpoint(receive_year))
            .branch(
                dptree::case![State::ReceiveDifficulty { topic, year }].endpoint(
                    move |bot: Bot,
                          dialogue: QuizDialogue,
                          (topic, year): (QuizTopic, YearFilter),
                          msg: Message| {
                        receive_difficulty(generator.clone(), bot, dialogue, (topic, year), msg)
                    },
                ),
            )
            .branch(dptree::case![State::InQuiz { session }].endpoint(in_quiz)),
    )
    .dependencies(dptree::deps![InMemStorage::<State>::new()])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

const GREETING_TEXT: &str = "🏎️ F1 Racing Genius Quiz\n\nF1의 역사, 기술, 전설적인 드라이버들에 대해 얼마나 알고 있나요? 당신의 지식을 테스트해보세요!";

fn topic_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(
        QuizTopic::all()
            .iter()
            .map(|topic| vec![KeyboardButton::new(topic.label())])
            .collect::<Vec<_>>(),
    )
}

async fn start(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT).await?;
    bot.send_message(msg.chat.id, "주제 선택 (Topic)")
        .reply_markup(topic_keyboard())
        .await?;

    dialogue.update(State::ReceiveTopic).await?;
    Ok(())
}

async fn receive_topic(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    let topic = match msg.text().and_then(QuizTopic::from_label) {
        Some(topic) => topic,
        None => {
            bot.send_message(msg.chat.id, "키보드에서 주제를 선택해주세요")
                .reply_markup(topic_keyboard())
                .await?;
            return Ok(());
        }
    };

    // All-Time plus the most recent seasons as buttons; any other season
    // can be typed by hand.
    let mut rows = vec![vec![KeyboardButton::new(YearFilter::ALL_TIME_LABEL)]];
    let recent: Vec<KeyboardButton> = YearFilter::catalogue()
        .into_iter()
        .skip(1)
        .take(6)
        .map(|year| KeyboardButton::new(year.label()))
        .collect();
    rows.extend(recent.chunks(3).map(|chunk| chunk.to_vec()));

    bot.send_message(
        msg.chat.id,
        format!(
            "연도 선택 (Year)\n다른 연도는 직접 입력해주세요 ({}-{})",
            quiz::MIN_SEASON,
            quiz::MAX_SEASON
        ),
    )
    .reply_markup(KeyboardMarkup::new(rows))
    .await?;

    dialogue.update(State::ReceiveYear { topic }).await?;
    Ok(())
}

async fn receive_year(
    bot: Bot,
    dialogue: QuizDialogue,
    topic: QuizTopic,
    msg: Message,
) -> HandlerResult {
    let year = match msg.text().and_then(YearFilter::parse) {
        Some(year) => year,
        None => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "{}-{} 사이의 연도 또는 '{}'를 선택해주세요",
                    quiz::MIN_SEASON,
                    quiz::MAX_SEASON,
                    YearFilter::ALL_TIME_LABEL
                ),
            )
            .await?;
            return Ok(());
        }
    };

    let keyboard = KeyboardMarkup::new(vec![DifficultyTier::all()
        .iter()
        .map(|tier| KeyboardButton::new(tier.label()))
        .collect::<Vec<_>>()]);
    bot.send_message(
        msg.chat.id,
        format!(
            "난이도 (Difficulty)를 선택해주세요 (기본: {})",
            DifficultyTier::default().label()
        ),
    )
    .reply_markup(keyboard)
    .await?;

    dialogue
        .update(State::ReceiveDifficulty { topic, year })
        .await?;
    Ok(())
}

async fn receive_difficulty(
    generator: Arc<QuizGenerator>,
    bot: Bot,
    dialogue: QuizDialogue,
    (topic, year): (QuizTopic, YearFilter),
    msg: Message,
) -> HandlerResult {
    let difficulty = match msg.text().and_then(DifficultyTier::from_label) {
        Some(difficulty) => difficulty,
        None => {
            bot.send_message(msg.chat.id, "키보드에서 난이도를 선택해주세요")
                .await?;
            return Ok(());
        }
    };

    let request = QuizRequest::new(topic, difficulty, year);

    let mut session = QuizSession::new();
    if !session.start_generation() {
        return Ok(());
    }

    bot.send_message(
        msg.chat.id,
        "🚦 엔진 예열 중... F1 데이터를 분석하고 있습니다! 🏎️💨",
    )
    .await?;
    // Just a nicety while the model call is in flight; ignore failures
    let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;

    match generator.generate(&request).await {
        Ok(quiz) => {
            session.on_success(quiz);
            let quiz = session.quiz().expect("quiz stored on success");

            bot.send_message(
                msg.chat.id,
                format!("🏆 {}\n\n💡 Did You Know?\n\n{}", quiz.title, quiz.intro),
            )
            .await?;
            ask_question(&bot, &msg, quiz, 0).await?;

            dialogue.update(State::InQuiz { session }).await?;
        }
        Err(err) => {
            log::warn!("quiz generation failed: {}", err);
            session.on_failure();

            bot.send_message(
                msg.chat.id,
                format!("🔧 Engine Failure! 오류가 발생했습니다: {}", err),
            )
            .await?;
            bot.send_message(msg.chat.id, "주제를 다시 선택하고 재시도해주세요")
                .reply_markup(topic_keyboard())
                .await?;

            dialogue.update(State::ReceiveTopic).await?;
        }
    }
    Ok(())
}

async fn ask_question(bot: &Bot, msg: &Message, quiz: &Quiz, index: usize) -> HandlerResult {
    let question = &quiz.questions[index];
    let keyboard = KeyboardMarkup::new(
        question
            .options
            .iter()
            .map(|option| vec![KeyboardButton::new(option.clone())])
            .collect::<Vec<_>>(),
    );

    bot.send_message(msg.chat.id, format!("Q{}. {}", index + 1, question.text))
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

async fn in_quiz(
    bot: Bot,
    dialogue: QuizDialogue,
    session: QuizSession,
    msg: Message,
) -> HandlerResult {
    let mut session = session;
    let quiz = session.quiz().expect("in-quiz state without a quiz").clone();

    let index = match session.next_unanswered() {
        Some(index) => index,
        None => {
            // every slot already has an answer; grade below
            finish_quiz(&bot, &dialogue, &mut session, &msg, &quiz).await?;
            return Ok(());
        }
    };

    let label = msg.text().map(OptionLabel::from_display);
    let label = match label {
        Some(label) if quiz.questions[index].option_labels().contains(&label) => label,
        _ => {
            bot.send_message(msg.chat.id, "키보드의 보기 중에서 선택해주세요")
                .await?;
            return Ok(());
        }
    };

    session.record_answer(index, label);

    match session.next_unanswered() {
        Some(next) => {
            ask_question(&bot, &msg, &quiz, next).await?;
            dialogue.update(State::InQuiz { session }).await?;
        }
        None => finish_quiz(&bot, &dialogue, &mut session, &msg, &quiz).await?,
    }
    Ok(())
}

async fn finish_quiz(
    bot: &Bot,
    dialogue: &QuizDialogue,
    session: &mut QuizSession,
    msg: &Message,
    quiz: &Quiz,
) -> HandlerResult {
    match session.submit() {
        SubmitOutcome::Graded(result) => {
            bot.send_message(msg.chat.id, render_results(quiz, &result))
                .await?;
            bot.send_message(msg.chat.id, "다음 레이스는 어떤 주제로 할까요?")
                .reply_markup(topic_keyboard())
                .await?;
            dialogue.update(State::ReceiveTopic).await?;
        }
        SubmitOutcome::Incomplete { unanswered } => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "아직 완주하지 못했습니다! 남은 문제 {}개를 풀어주세요.",
                    unanswered
                ),
            )
            .await?;
            if let Some(index) = session.next_unanswered() {
                ask_question(bot, msg, quiz, index).await?;
            }
            dialogue
                .update(State::InQuiz {
                    session: session.clone(),
                })
                .await?;
        }
    }
    Ok(())
}

fn render_results(quiz: &Quiz, result: &GradeResult) -> String {
    let mut out = format!(
        "📊 레이스 결과 (Race Results)\n\n{} (점수: {}/{})\n\n📝 상세 해설 (Telemetry Data)\n",
        result.tier().headline(),
        result.score,
        result.total
    );

    for (idx, (question, grade)) in quiz
        .questions
        .iter()
        .zip(&result.per_question)
        .enumerate()
    {
        if grade.correct {
            out.push_str(&format!("\n✅ Q{}: 정답!\n", idx + 1));
        } else {
            out.push_str(&format!(
                "\n❌ Q{}: 오답 (당신의 선택: {} / 정답: {})\n",
                idx + 1,
                grade.user_label.as_str(),
                grade.correct_label.as_str()
            ));
        }
        out.push_str(&format!("해설: {}\n", question.explanation));
    }
    out
}
