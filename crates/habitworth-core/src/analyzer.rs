//! The conversation orchestrator.
//!
//! Drives both flows: the multi-turn chat (generate questions, collect
//! answers one message at a time, value at the end) and the single-shot
//! analyze/finalize pair. Generation and parsing failures degrade to fixed
//! default payloads; only the raw completion pass-through surfaces a hard
//! error, because it has no sensible default.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::extract::{
    default_analyze_reply, default_chat_questions, default_value_result, parse_analyze_reply,
    parse_chat_questions, parse_value_result,
};
use crate::prompts;
use crate::session::{ChatSession, SessionStore};
use habitworth_provider::{ModelResult, TextModel};
use habitworth_retrieval::FactSource;
use habitworth_schema::{AnalyzeReply, ChatStartReply, ChatTurnReply, ValueResult};

/// Grounding facts pulled for question generation.
const QUESTION_FACTS: usize = 3;
/// Grounding facts pulled for the final valuation.
const VALUATION_FACTS: usize = 5;

pub struct ValueAnalyzer {
    model: Arc<dyn TextModel>,
    facts: Arc<dyn FactSource>,
    sessions: Arc<SessionStore>,
}

impl ValueAnalyzer {
    pub fn new(model: Arc<dyn TextModel>, facts: Arc<dyn FactSource>) -> Self {
        Self::with_sessions(model, facts, Arc::new(SessionStore::new()))
    }

    pub fn with_sessions(
        model: Arc<dyn TextModel>,
        facts: Arc<dyn FactSource>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            model,
            facts,
            sessions,
        }
    }

    /// The session registry, for wiring up the expiry sweeper.
    pub fn sessions(&self) -> Arc<SessionStore> {
        self.sessions.clone()
    }

    /// Single-shot step 1: generate the typed follow-up questions.
    pub async fn analyze(
        &self,
        habit_name: &str,
        category: &str,
        reason: Option<&str>,
    ) -> AnalyzeReply {
        let facts = self
            .facts
            .search(habit_name, QUESTION_FACTS, Some(category))
            .await;
        let prompt = prompts::typed_questions_prompt(habit_name, category, reason, &facts);

        match self.model.complete(&prompt).await {
            Ok(raw) => parse_analyze_reply(&raw),
            Err(e) => {
                warn!(error = %e, "question generation failed, using default questions");
                default_analyze_reply()
            }
        }
    }

    /// Single-shot step 2: value the habit from a keyed answer map.
    pub async fn finalize(
        &self,
        habit_name: &str,
        category: &str,
        reason: Option<&str>,
        answers: &HashMap<String, Value>,
    ) -> ValueResult {
        let facts = self
            .facts
            .search(habit_name, VALUATION_FACTS, Some(category))
            .await;
        let prompt =
            prompts::valuation_prompt_from_answers(habit_name, category, reason, answers, &facts);
        self.run_valuation(&prompt).await
    }

    /// Start a conversational session: generate the question list, store it,
    /// hand back the first question. Never fails; a broken generation path
    /// degrades to the fixed default questions.
    pub async fn start_chat(
        &self,
        habit_name: &str,
        category: &str,
        reason: Option<&str>,
    ) -> ChatStartReply {
        let facts = self
            .facts
            .search(habit_name, QUESTION_FACTS, Some(category))
            .await;
        let prompt = prompts::conversational_questions_prompt(habit_name, category, reason, &facts);

        let questions = match self.model.complete(&prompt).await {
            Ok(raw) => parse_chat_questions(&raw),
            Err(e) => {
                warn!(error = %e, "chat question generation failed");
                Vec::new()
            }
        };
        let questions = if questions.is_empty() {
            default_chat_questions()
        } else {
            questions
        };

        let session = self
            .sessions
            .create(habit_name, category, reason, questions);
        let first = session
            .questions
            .first()
            .cloned()
            .unwrap_or_default();

        ChatStartReply {
            session_id: session.id,
            message: first,
            question_number: 1,
            total_questions: session.questions.len(),
            is_complete: false,
        }
    }

    /// Accept one answer. Returns the next question, or the completed
    /// valuation once every question is answered, or a terminal
    /// session-expired reply. Expiry is a normal condition, not an error.
    pub async fn post_message(&self, session_id: &str, message: &str) -> ChatTurnReply {
        if self.sessions.get(session_id).is_none() {
            return expired_reply();
        }

        let Some(session) = self.sessions.add_answer(session_id, message) else {
            // expired between lookup and append
            return expired_reply();
        };

        if session.is_complete() {
            let result = self.value_conversation(&session).await;
            self.sessions.remove(session_id);
            info!(session_id, value = result.value, "conversation valued");
            return ChatTurnReply {
                message: "Analysis complete!".to_string(),
                question_number: session.total_questions(),
                total_questions: session.total_questions(),
                is_complete: true,
                value_result: Some(result),
            };
        }

        let next = session.next_question().unwrap_or_default().to_string();
        ChatTurnReply {
            message: next,
            question_number: session.cursor() + 1,
            total_questions: session.total_questions(),
            is_complete: false,
            value_result: None,
        }
    }

    /// Direct completion pass-through. The one path with no safe default:
    /// generation failures propagate to the caller.
    pub async fn raw_complete(&self, prompt: &str) -> ModelResult<String> {
        self.model.complete(prompt).await
    }

    async fn value_conversation(&self, session: &ChatSession) -> ValueResult {
        let facts = self
            .facts
            .search(&session.habit_name, VALUATION_FACTS, Some(&session.category))
            .await;
        let prompt = prompts::valuation_prompt_from_transcript(session, &facts);
        self.run_valuation(&prompt).await
    }

    async fn run_valuation(&self, prompt: &str) -> ValueResult {
        match self.model.complete(prompt).await {
            Ok(raw) => parse_value_result(&raw),
            Err(e) => {
                warn!(error = %e, "valuation generation failed, using default result");
                default_value_result()
            }
        }
    }
}

fn expired_reply() -> ChatTurnReply {
    ChatTurnReply {
        message: "Your session has expired. Please start over.".to_string(),
        question_number: 0,
        total_questions: 0,
        is_complete: true,
        value_result: None,
    }
}
