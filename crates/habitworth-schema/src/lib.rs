pub mod config;

use serde::{Deserialize, Serialize};

pub use config::{ChromaConfig, EngineConfig, GeminiConfig};

/// How a single-shot question expects to be answered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnswerKind {
    Number,
    Text,
    Choice,
}

impl AnswerKind {
    /// Permissive mapping from model-emitted type tags. Anything
    /// unrecognized falls back to free text.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "number" => AnswerKind::Number,
            "choice" => AnswerKind::Choice,
            _ => AnswerKind::Text,
        }
    }
}

/// One typed question in the single-shot analysis flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSpec {
    pub id: String,
    pub question: String,
    #[serde(rename = "type")]
    pub answer_kind: AnswerKind,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

/// First-stage reply of the single-shot flow: the questions the caller
/// still has to answer before a valuation can be made.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeReply {
    pub need_more_info: bool,
    pub questions: Vec<QuestionSpec>,
}

/// Per-occurrence cost split into the four valuation categories.
/// The parts are not required to sum to the reported total; the model
/// estimates both independently and may round.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub direct_cost: i64,
    pub health_cost: i64,
    pub opportunity_cost: i64,
    pub psychological_cost: i64,
}

/// Structured valuation of one occurrence of the habit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValueResult {
    pub value: i64,
    pub breakdown: CostBreakdown,
    pub explanation: String,
    /// Citations backing the estimate. Never empty: a placeholder entry is
    /// substituted when the model omits them.
    pub sources: Vec<String>,
}

/// Reply to starting a conversational valuation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStartReply {
    pub session_id: String,
    pub message: String,
    pub question_number: usize,
    pub total_questions: usize,
    pub is_complete: bool,
}

/// Reply to a single conversational turn. Carries either the next question
/// or, on the final turn, the completed valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnReply {
    pub message: String,
    pub question_number: usize,
    pub total_questions: usize,
    pub is_complete: bool,
    #[serde(default)]
    pub value_result: Option<ValueResult>,
}
