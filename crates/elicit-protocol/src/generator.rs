//! Text-generation boundary
//!
//! The backend (prompt-template rendering, model invocation, retry and
//! backoff) is an external collaborator behind the [`Generator`] trait.
//! The protocol layer pairs every call with a parser and a fail-safe value
//! via [`safe_generate`], so interaction operations always receive a value
//! from this boundary, never an error.

use crate::error::ParseError;
use async_trait::async_trait;

/// Prompt template selector
///
/// Templates are selected by task kind and cardinality: a batch template
/// when more than one question or turn is involved, a singular template
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateRef {
    /// Multiple-choice questions, batch form
    CategoricalBatch,
    /// Multiple-choice question, singular form
    CategoricalSingular,
    /// Numeric questions, batch form
    NumericalBatch,
    /// Numeric question, singular form
    NumericalSingular,
    /// Mixed-type ordered question list
    AskBatch,
    /// Next dialogue turn
    Utterance,
}

impl TemplateRef {
    /// Categorical template for the given cardinality
    #[inline]
    #[must_use]
    pub fn categorical(batch: bool) -> Self {
        if batch {
            Self::CategoricalBatch
        } else {
            Self::CategoricalSingular
        }
    }

    /// Numerical template for the given cardinality
    #[inline]
    #[must_use]
    pub fn numerical(batch: bool) -> Self {
        if batch {
            Self::NumericalBatch
        } else {
            Self::NumericalSingular
        }
    }

    /// Stable template name (for lookup and logging)
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CategoricalBatch => "categorical_resp/batch_v1",
            Self::CategoricalSingular => "categorical_resp/singular_v1",
            Self::NumericalBatch => "numerical_resp/batch_v1",
            Self::NumericalSingular => "numerical_resp/singular_v1",
            Self::AskBatch => "ask/batch_v1",
            Self::Utterance => "utterance/utterance_v1",
        }
    }
}

impl std::fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One generation call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Prompt template to render
    pub template: TemplateRef,
    /// Ordered structured inputs for the template's slots
    pub inputs: Vec<String>,
    /// Model version identifier
    pub model_version: String,
    /// Number of candidates to request
    pub candidate_count: u32,
}

impl CompletionRequest {
    /// Create a request with default model version and one candidate
    #[must_use]
    pub fn new(template: TemplateRef, inputs: Vec<String>) -> Self {
        Self {
            template,
            inputs,
            model_version: "default".to_string(),
            candidate_count: 1,
        }
    }

    /// With an explicit model version
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model_version: impl Into<String>) -> Self {
        self.model_version = model_version.into();
        self
    }

    /// With a candidate count
    #[inline]
    #[must_use]
    pub fn with_candidates(mut self, count: u32) -> Self {
        self.candidate_count = count;
        self
    }
}

/// Unrecoverable generation failure
///
/// Implementations retry internally; this error means the attempt budget
/// is exhausted. `safe_generate` converts it into the fail-safe value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("generation failed: {0}")]
pub struct GeneratorError(pub String);

/// Text-generation capability
#[async_trait]
pub trait Generator: Send + Sync {
    /// Render the template with the given inputs and return raw model text
    async fn complete(&self, request: CompletionRequest) -> Result<String, GeneratorError>;
}

/// Generate, parse, and fall back
///
/// Runs one generation call, applies `clean_up` to the raw output, and
/// substitutes `fail_safe` when either the generator or the parser fails.
/// Fail-safe substitution is logged at warn and is not retried.
pub async fn safe_generate<T>(
    generator: &dyn Generator,
    request: CompletionRequest,
    fail_safe: T,
    clean_up: impl FnOnce(&str) -> Result<T, ParseError> + Send,
) -> T {
    let template = request.template;
    match generator.complete(request).await {
        Ok(raw) => match clean_up(&raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(
                    template = %template,
                    error = %err,
                    "generator output failed to parse; substituting fail-safe"
                );
                fail_safe
            }
        },
        Err(err) => {
            tracing::warn!(
                template = %template,
                error = %err,
                "generation failed; substituting fail-safe"
            );
            fail_safe
        }
    }
}
