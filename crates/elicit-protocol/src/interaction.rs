//! The four task kinds
//!
//! Every operation follows the same pipeline: anchor → agent description →
//! template selection by cardinality → generation → parse/coerce →
//! optional memory commit. Parse failures are absorbed into each task's
//! declared fail-safe value; only mis-specified questions and memory
//! subsystem failures surface as errors.

use crate::assemble::{main_agent_desc, question_anchor, render_dialogue, utterance_agent_desc};
use crate::error::{ParseError, ProtocolError};
use crate::generator::{safe_generate, CompletionRequest, Generator, TemplateRef};
use crate::parser::{
    coerce_float, coerce_int, extract_first_json, extract_utterance, questionnaire_entries,
    value_to_text, ResponseValue,
};
use crate::questions::{normalize, AskQuestion, NormalizedQuestion, ResponseType};
use elicit_agent::Agent;
use indexmap::IndexMap;
use serde_json::Value;

/// Fail-safe text substituted for an unparseable response or utterance
pub const FAIL_SAFE_TEXT: &str = "response error";

/// Result of a categorical or numerical questionnaire
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionnaireOutput {
    /// One response per question, in question order
    pub responses: Vec<ResponseValue>,
    /// One reasoning string per question, in question order
    pub reasonings: Vec<String>,
}

/// One answered `ask` question
#[derive(Debug, Clone, PartialEq)]
pub struct AskAnswer {
    /// The (possibly coerced) response
    pub response: ResponseValue,
    /// The stated reasoning
    pub reasoning: String,
}

impl AskAnswer {
    /// The per-question fail-safe entry
    #[must_use]
    pub fn fail_safe() -> Self {
        Self {
            response: ResponseValue::Text(FAIL_SAFE_TEXT.to_string()),
            reasoning: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum NumericMode {
    None,
    Int,
    Float,
}

fn coerce(mode: NumericMode, value: &Value) -> Result<ResponseValue, ParseError> {
    match mode {
        NumericMode::None => Ok(ResponseValue::Text(value_to_text(value))),
        NumericMode::Int => coerce_int(value).map(ResponseValue::Int),
        NumericMode::Float => coerce_float(value).map(ResponseValue::Float),
    }
}

fn parse_questionnaire(
    raw: &str,
    count: usize,
    mode: NumericMode,
) -> Result<QuestionnaireOutput, ParseError> {
    let map = extract_first_json(raw)?;
    let entries = questionnaire_entries(&map, count)?;

    let mut responses = Vec::with_capacity(count);
    let mut reasonings = Vec::with_capacity(count);
    for (value, reasoning) in entries {
        responses.push(coerce(mode, &value)?);
        reasonings.push(reasoning);
    }
    Ok(QuestionnaireOutput {
        responses,
        reasonings,
    })
}

/// Administer multiple-choice questions
///
/// `questions` maps question text to its allowed option set, in question
/// order. Returns one response and one reasoning per question; the
/// fail-safe is `None`.
///
/// # Errors
/// Memory subsystem failures during prompt assembly.
pub async fn categorical_resp(
    agent: &Agent,
    generator: &dyn Generator,
    questions: &IndexMap<String, Vec<String>>,
) -> Result<Option<QuestionnaireOutput>, ProtocolError> {
    let anchor = question_anchor(questions.keys().map(String::as_str));
    let desc = main_agent_desc(agent, &anchor).await?;

    let mut str_questions = String::new();
    for (question, options) in questions {
        str_questions.push_str(&format!("Q: {question}\nOptions: {}\n\n", options.join(", ")));
    }

    let request = CompletionRequest::new(
        TemplateRef::categorical(questions.len() > 1),
        vec![desc, str_questions.trim().to_string()],
    );
    let count = questions.len();
    Ok(safe_generate(generator, request, None, |raw| {
        parse_questionnaire(raw, count, NumericMode::None).map(Some)
    })
    .await)
}

/// Administer numeric questions
///
/// `questions` maps question text to its numeric range. Responses are
/// coerced to int unless `float_resp` is set; a coercion failure anywhere
/// in the batch yields the fail-safe `None`.
///
/// # Errors
/// Memory subsystem failures during prompt assembly.
pub async fn numerical_resp(
    agent: &Agent,
    generator: &dyn Generator,
    questions: &IndexMap<String, String>,
    float_resp: bool,
) -> Result<Option<QuestionnaireOutput>, ProtocolError> {
    let anchor = question_anchor(questions.keys().map(String::as_str));
    let desc = main_agent_desc(agent, &anchor).await?;

    let mut str_questions = String::new();
    for (question, range) in questions {
        str_questions.push_str(&format!("Q: {question}\nRange: {range}\n\n"));
    }
    let resp_type = if float_resp { "float" } else { "integer" };

    let request = CompletionRequest::new(
        TemplateRef::numerical(questions.len() > 1),
        vec![
            desc,
            str_questions.trim().to_string(),
            resp_type.to_string(),
        ],
    );
    let count = questions.len();
    let mode = if float_resp {
        NumericMode::Float
    } else {
        NumericMode::Int
    };
    Ok(safe_generate(generator, request, None, |raw| {
        parse_questionnaire(raw, count, mode).map(Some)
    })
    .await)
}

fn render_ask_questions(questions: &[NormalizedQuestion]) -> String {
    let mut rendered = String::new();
    for (i, q) in questions.iter().enumerate() {
        rendered.push_str(&format!("Q{}: {}\n", i + 1, q.question));
        rendered.push_str(&format!("Type: {}\n", q.response_type.name()));
        match q.response_type {
            ResponseType::Categorical => {
                rendered.push_str(&format!("Options: {}\n", q.options.join(", ")));
            }
            ResponseType::Int | ResponseType::Float => {
                rendered.push_str(&format!("Range: {}\n", q.scale));
            }
            ResponseType::Open => {
                rendered.push_str(&format!("Character Limit: {}\n", q.char_limit));
            }
        }
        rendered.push('\n');
    }
    rendered.trim().to_string()
}

/// Administer an ordered, mixed-type question list
///
/// Questions are validated and normalized before any generation call.
/// Returns one [`AskAnswer`] per question, aligned with input order. A
/// question whose value fails coercion gets the per-question fail-safe
/// entry; output with no extractable JSON gets a full fail-safe list.
///
/// When `remember` is set and parsing succeeded, each question/response
/// pair is committed to the agent's memory as a synthetic observation.
///
/// # Errors
/// - [`ProtocolError::Validation`] for a mis-specified question (before
///   any generation)
/// - Memory subsystem failures during assembly or the memory commit
pub async fn ask(
    agent: &Agent,
    generator: &dyn Generator,
    questions: &[AskQuestion],
    remember: bool,
) -> Result<Vec<AskAnswer>, ProtocolError> {
    let normalized = normalize(questions)?;
    let anchor = question_anchor(normalized.iter().map(|q| q.question.as_str()));
    let desc = main_agent_desc(agent, &anchor).await?;

    let request = CompletionRequest::new(
        TemplateRef::AskBatch,
        vec![desc, render_ask_questions(&normalized)],
    );

    let count = normalized.len();
    let types: Vec<ResponseType> = normalized.iter().map(|q| q.response_type).collect();
    let parsed: Option<Vec<AskAnswer>> = safe_generate(generator, request, None, move |raw| {
        let map = extract_first_json(raw)?;
        let entries = questionnaire_entries(&map, count)?;

        let answers = entries
            .into_iter()
            .zip(types)
            .enumerate()
            .map(|(i, ((value, reasoning), response_type))| {
                let mode = match response_type {
                    ResponseType::Int => NumericMode::Int,
                    ResponseType::Float => NumericMode::Float,
                    ResponseType::Open | ResponseType::Categorical => NumericMode::None,
                };
                match coerce(mode, &value) {
                    Ok(response) => AskAnswer {
                        response,
                        reasoning,
                    },
                    Err(err) => {
                        tracing::warn!(
                            question_index = i + 1,
                            error = %err,
                            "response failed coercion; substituting per-question fail-safe"
                        );
                        AskAnswer::fail_safe()
                    }
                }
            })
            .collect();
        Ok(Some(answers))
    })
    .await;

    match parsed {
        Some(answers) => {
            if remember {
                for (q, answer) in normalized.iter().zip(&answers) {
                    agent
                        .remember(
                            &format!(
                                "You were asked: '{}'\n You replied: '{}'",
                                q.question, answer.response
                            ),
                            0,
                        )
                        .await?;
                }
            }
            Ok(answers)
        }
        None => Ok((0..count).map(|_| AskAnswer::fail_safe()).collect()),
    }
}

/// Produce the agent's next turn in a dialogue
///
/// The dialogue so far is rendered as `[speaker]: text` lines with a
/// trailing placeholder for the responding agent; that rendering is also
/// the retrieval anchor. The fail-safe is [`FAIL_SAFE_TEXT`].
///
/// # Errors
/// Memory subsystem failures during prompt assembly.
pub async fn utterance(
    agent: &Agent,
    generator: &dyn Generator,
    dialogue: &[(String, String)],
    context: &str,
) -> Result<String, ProtocolError> {
    let rendered = render_dialogue(dialogue, &agent.fullname());
    let desc = utterance_agent_desc(agent, &rendered).await?;

    let request = CompletionRequest::new(
        TemplateRef::Utterance,
        vec![desc, context.to_string(), rendered],
    );
    Ok(safe_generate(
        generator,
        request,
        FAIL_SAFE_TEXT.to_string(),
        |raw| extract_first_json(raw).and_then(|map| extract_utterance(&map)),
    )
    .await)
}
