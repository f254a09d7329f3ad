//! Turning unreliable model output into structured results.
//!
//! The model is instructed to answer with pure JSON but frequently wraps it
//! in code fences or prose, or drops fields. This layer is a total function
//! from arbitrary text to a valid payload: salvage what parses, default the
//! rest, never raise.

use serde_json::Value;
use tracing::warn;

use habitworth_schema::{AnalyzeReply, AnswerKind, CostBreakdown, QuestionSpec, ValueResult};

/// Placeholder citation used whenever the model omits its sources.
pub const FALLBACK_SOURCE: &str = "AI estimate";

/// Slice the JSON object out of a raw model reply. Strips Markdown code
/// fences, then takes the span from the first `{` to the last `}`. Anything
/// unusable collapses to the empty object literal.
pub fn extract_json(raw: &str) -> String {
    let cleaned = raw.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if end > start => cleaned[start..=end].to_string(),
        _ => {
            if !cleaned.is_empty() {
                warn!("no JSON object found in model reply");
            }
            "{}".to_string()
        }
    }
}

/// Parse a conversational question list (`{"questions": ["...", ...]}`).
/// Returns an empty list on any failure; the caller substitutes defaults.
pub fn parse_chat_questions(raw: &str) -> Vec<String> {
    let json = extract_json(raw);
    let Ok(root) = serde_json::from_str::<Value>(&json) else {
        warn!("question list reply is not valid JSON");
        return Vec::new();
    };

    let Some(items) = root.get("questions").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_str)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse the typed-question payload of the single-shot flow. A missing or
/// empty `questions` array, or unparseable input, yields the fixed default
/// question set.
pub fn parse_analyze_reply(raw: &str) -> AnalyzeReply {
    let json = extract_json(raw);
    let Ok(root) = serde_json::from_str::<Value>(&json) else {
        warn!("analyze reply is not valid JSON, using default questions");
        return default_analyze_reply();
    };

    let Some(items) = root.get("questions").and_then(Value::as_array) else {
        warn!("analyze reply has no questions array, using default questions");
        return default_analyze_reply();
    };
    if items.is_empty() {
        return default_analyze_reply();
    }

    let questions = items
        .iter()
        .map(|item| QuestionSpec {
            id: str_or(item, "id", "unknown"),
            question: str_or(item, "question", "Question unavailable"),
            answer_kind: AnswerKind::from_tag(&str_or(item, "type", "text")),
            options: item.get("options").and_then(Value::as_array).map(|opts| {
                opts.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            }),
        })
        .collect();

    AnalyzeReply {
        need_more_info: true,
        questions,
    }
}

/// Parse a valuation payload. The top-level `value` field is required;
/// without it (or without parseable JSON) the fixed default result is
/// returned. Every other field is optional with a type-appropriate default.
pub fn parse_value_result(raw: &str) -> ValueResult {
    let json = extract_json(raw);
    let Ok(root) = serde_json::from_str::<Value>(&json) else {
        warn!("valuation reply is not valid JSON, using default result");
        return default_value_result();
    };

    let Some(value) = root.get("value") else {
        warn!("valuation reply has no value field, using default result");
        return default_value_result();
    };
    let value = as_whole_number(value).unwrap_or(0);

    let breakdown = root.get("breakdown");
    let breakdown = CostBreakdown {
        direct_cost: sub_cost(breakdown, "directCost"),
        health_cost: sub_cost(breakdown, "healthCost"),
        opportunity_cost: sub_cost(breakdown, "opportunityCost"),
        psychological_cost: sub_cost(breakdown, "psychologicalCost"),
    };

    let mut sources: Vec<String> = root
        .get("sources")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    if sources.is_empty() {
        sources.push(FALLBACK_SOURCE.to_string());
    }

    ValueResult {
        value,
        breakdown,
        explanation: str_or(&root, "explanation", "Result estimated by the model."),
        sources,
    }
}

/// Fixed conversational question set used when generation or parsing fails.
/// Covers amount, frequency, time spent and feelings, so the valuation step
/// still has something to work with.
pub fn default_chat_questions() -> Vec<String> {
    vec![
        "Hi! To start, roughly how much do you usually spend each time?".to_string(),
        "How many times a week would you say you do it?".to_string(),
        "How much time does one occasion usually take?".to_string(),
        "How do you feel afterwards?".to_string(),
    ]
}

/// Fixed typed-question set for the single-shot flow.
pub fn default_analyze_reply() -> AnalyzeReply {
    let number = |id: &str, question: &str| QuestionSpec {
        id: id.to_string(),
        question: question.to_string(),
        answer_kind: AnswerKind::Number,
        options: None,
    };
    AnalyzeReply {
        need_more_info: true,
        questions: vec![
            number("cost", "Roughly how much do you spend per occurrence?"),
            number("frequency", "How many times a week do you do it?"),
            number("duration", "How many hours does one occurrence take?"),
        ],
    }
}

/// Fixed valuation used when generation or parsing fails. A nominal total
/// with a placeholder explanation; callers always get a structurally valid
/// result.
pub fn default_value_result() -> ValueResult {
    ValueResult {
        value: 10000,
        breakdown: CostBreakdown {
            direct_cost: 7000,
            health_cost: 1000,
            opportunity_cost: 1000,
            psychological_cost: 1000,
        },
        explanation: "Estimated with fallback defaults. Please try again.".to_string(),
        sources: vec!["default".to_string()],
    }
}

fn str_or(value: &Value, key: &str, default: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Sub-costs are clamped non-negative; a malformed or missing field reads
/// as zero rather than failing the whole parse.
fn sub_cost(breakdown: Option<&Value>, key: &str) -> i64 {
    breakdown
        .and_then(|b| b.get(key))
        .and_then(as_whole_number)
        .map(|v| v.max(0))
        .unwrap_or(0)
}

fn as_whole_number(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN_VALUATION: &str = r#"{
        "value": 15000,
        "breakdown": {
            "directCost": 10000,
            "healthCost": 2000,
            "opportunityCost": 2000,
            "psychologicalCost": 1000
        },
        "explanation": "Average delivery order plus health and stress costs.",
        "sources": ["Statistics Korea, 2023", "AI estimate"]
    }"#;

    #[test]
    fn extract_json_is_idempotent_on_clean_json() {
        let extracted = extract_json(CLEAN_VALUATION);
        assert_eq!(extracted, CLEAN_VALUATION.trim());
        assert_eq!(extract_json(&extracted), extracted);
    }

    #[test]
    fn extract_json_strips_fences_and_prose() {
        let raw = "Sure! Here is the JSON you asked for:\n```json\n{\"value\": 1}\n```\nHope that helps.";
        let extracted = extract_json(raw);
        assert!(extracted.starts_with('{'));
        assert!(extracted.ends_with('}'));
        let parsed: Value = serde_json::from_str(&extracted).unwrap();
        assert_eq!(parsed["value"], 1);
    }

    #[test]
    fn extract_json_on_garbage_yields_empty_object() {
        assert_eq!(extract_json("no json here at all"), "{}");
        assert_eq!(extract_json(""), "{}");
        assert_eq!(extract_json("} backwards {"), "{}");
    }

    #[test]
    fn parse_chat_questions_reads_string_array() {
        let raw = r#"```json
        {"questions": ["How much per time?", "How often?", "", "How long?"]}
        ```"#;
        let questions = parse_chat_questions(raw);
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0], "How much per time?");
    }

    #[test]
    fn parse_chat_questions_on_prose_is_empty() {
        assert!(parse_chat_questions("I cannot answer in JSON, sorry.").is_empty());
        assert!(parse_chat_questions("{\"answer\": 42}").is_empty());
    }

    #[test]
    fn parse_analyze_reply_reads_typed_questions() {
        let raw = r#"{
            "needMoreInfo": true,
            "questions": [
                {"id": "price", "question": "How much do you spend?", "type": "number", "options": null},
                {"id": "time", "question": "What time of day?", "type": "choice",
                 "options": ["morning", "noon", "evening", "night"]}
            ]
        }"#;
        let reply = parse_analyze_reply(raw);
        assert!(reply.need_more_info);
        assert_eq!(reply.questions.len(), 2);
        assert_eq!(reply.questions[0].answer_kind, AnswerKind::Number);
        assert!(reply.questions[0].options.is_none());
        assert_eq!(
            reply.questions[1].options.as_ref().unwrap(),
            &vec!["morning", "noon", "evening", "night"]
        );
    }

    #[test]
    fn parse_analyze_reply_defaults_malformed_sub_fields() {
        let raw = r#"{"questions": [{"question": 42, "type": ["weird"]}]}"#;
        let reply = parse_analyze_reply(raw);
        assert_eq!(reply.questions.len(), 1);
        assert_eq!(reply.questions[0].id, "unknown");
        assert_eq!(reply.questions[0].question, "Question unavailable");
        assert_eq!(reply.questions[0].answer_kind, AnswerKind::Text);
    }

    #[test]
    fn parse_analyze_reply_without_questions_falls_back() {
        let reply = parse_analyze_reply("total garbage");
        assert_eq!(reply.questions.len(), 3);
        assert!(reply.need_more_info);

        let reply = parse_analyze_reply(r#"{"questions": []}"#);
        assert_eq!(reply.questions.len(), 3);
    }

    #[test]
    fn parse_value_result_reads_complete_payload() {
        let result = parse_value_result(CLEAN_VALUATION);
        assert_eq!(result.value, 15000);
        assert_eq!(result.breakdown.direct_cost, 10000);
        assert_eq!(result.sources.len(), 2);
    }

    #[test]
    fn parse_value_result_missing_sources_gets_placeholder() {
        let result = parse_value_result(r#"{"value": 5000, "breakdown": {"directCost": 5000}}"#);
        assert_eq!(result.value, 5000);
        assert_eq!(result.sources, vec![FALLBACK_SOURCE]);
        assert_eq!(result.breakdown.health_cost, 0);
    }

    #[test]
    fn parse_value_result_clamps_negative_sub_costs() {
        let result =
            parse_value_result(r#"{"value": 1000, "breakdown": {"healthCost": -300}}"#);
        assert_eq!(result.breakdown.health_cost, 0);
    }

    #[test]
    fn parse_value_result_accepts_fractional_numbers() {
        let result = parse_value_result(r#"{"value": 12500.4}"#);
        assert_eq!(result.value, 12500);
    }

    #[test]
    fn parse_value_result_without_value_falls_back() {
        let result = parse_value_result(r#"{"breakdown": {"directCost": 10}}"#);
        assert_eq!(result, default_value_result());

        let result = parse_value_result("the model rambled instead");
        assert_eq!(result, default_value_result());
    }

    #[test]
    fn defaults_are_structurally_valid() {
        assert_eq!(default_chat_questions().len(), 4);
        let default = default_value_result();
        assert!(default.value > 0);
        assert!(!default.sources.is_empty());
    }
}
