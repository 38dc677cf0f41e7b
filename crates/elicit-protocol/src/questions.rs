//! Question specifications for the `ask` task
//!
//! Questions arrive loosely specified (JSON-friendly, hyphenated keys) and
//! are normalized before any generation call: a missing response type
//! defaults to open with a 200-character limit, while a categorical
//! question without options or a numeric question without a scale is a
//! fatal validation error.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Default character limit for open questions
pub const DEFAULT_CHAR_LIMIT: u32 = 200;

/// Declared response type of one question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Free text with a character limit
    #[default]
    Open,
    /// One of a fixed option set
    Categorical,
    /// Integer within a scale
    Int,
    /// Float within a scale
    Float,
}

impl ResponseType {
    /// Wire name of the type
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Categorical => "categorical",
            Self::Int => "int",
            Self::Float => "float",
        }
    }
}

/// One loosely-specified question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskQuestion {
    /// Question text
    pub question: String,
    /// Response type; defaults to open when unspecified
    #[serde(rename = "response-type", skip_serializing_if = "Option::is_none")]
    pub response_type: Option<ResponseType>,
    /// Option set for categorical questions
    #[serde(rename = "response-options", skip_serializing_if = "Option::is_none")]
    pub response_options: Option<Vec<String>>,
    /// Scale for numeric questions, e.g. `"1-10"`
    #[serde(rename = "response-scale", skip_serializing_if = "Option::is_none")]
    pub response_scale: Option<String>,
    /// Character limit for open questions
    #[serde(rename = "response-char-limit", skip_serializing_if = "Option::is_none")]
    pub response_char_limit: Option<u32>,
}

impl AskQuestion {
    /// Open question with the default character limit
    #[must_use]
    pub fn open(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            response_type: Some(ResponseType::Open),
            response_options: None,
            response_scale: None,
            response_char_limit: None,
        }
    }

    /// Categorical question
    #[must_use]
    pub fn categorical(
        question: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            question: question.into(),
            response_type: Some(ResponseType::Categorical),
            response_options: Some(options.into_iter().map(Into::into).collect()),
            response_scale: None,
            response_char_limit: None,
        }
    }

    /// Integer question on a scale
    #[must_use]
    pub fn int(question: impl Into<String>, scale: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            response_type: Some(ResponseType::Int),
            response_options: None,
            response_scale: Some(scale.into()),
            response_char_limit: None,
        }
    }

    /// Float question on a scale
    #[must_use]
    pub fn float(question: impl Into<String>, scale: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            response_type: Some(ResponseType::Float),
            response_options: None,
            response_scale: Some(scale.into()),
            response_char_limit: None,
        }
    }
}

/// A question after validation, with every default resolved
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedQuestion {
    /// Question text
    pub question: String,
    /// Resolved response type
    pub response_type: ResponseType,
    /// Option set (categorical only)
    pub options: Vec<String>,
    /// Scale (numeric only)
    pub scale: String,
    /// Character limit (open only)
    pub char_limit: u32,
}

/// Validate and normalize an ordered question list
///
/// Runs before any generation call; a failure here means no partial work
/// was performed.
///
/// # Errors
/// [`ValidationError`] for a categorical question without options or a
/// numeric question without a scale.
pub fn normalize(questions: &[AskQuestion]) -> Result<Vec<NormalizedQuestion>, ValidationError> {
    questions
        .iter()
        .map(|q| {
            let response_type = q.response_type.unwrap_or_default();
            match response_type {
                ResponseType::Categorical => {
                    let options = q.response_options.clone().filter(|o| !o.is_empty()).ok_or(
                        ValidationError::MissingOptions {
                            question: q.question.clone(),
                        },
                    )?;
                    Ok(NormalizedQuestion {
                        question: q.question.clone(),
                        response_type,
                        options,
                        scale: String::new(),
                        char_limit: 0,
                    })
                }
                ResponseType::Int | ResponseType::Float => {
                    let scale = q.response_scale.clone().filter(|s| !s.is_empty()).ok_or(
                        ValidationError::MissingScale {
                            question: q.question.clone(),
                        },
                    )?;
                    Ok(NormalizedQuestion {
                        question: q.question.clone(),
                        response_type,
                        options: Vec::new(),
                        scale,
                        char_limit: 0,
                    })
                }
                ResponseType::Open => Ok(NormalizedQuestion {
                    question: q.question.clone(),
                    response_type,
                    options: Vec::new(),
                    scale: String::new(),
                    char_limit: q.response_char_limit.unwrap_or(DEFAULT_CHAR_LIMIT),
                }),
            }
        })
        .collect()
}
