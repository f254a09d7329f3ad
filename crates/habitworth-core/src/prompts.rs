//! Prompt builders for question generation and valuation.
//!
//! Every prompt embeds the retrieved grounding facts (when any) and ends
//! with a strict JSON-only response-format block; the extraction layer
//! handles the cases where the model ignores it anyway.

use std::collections::HashMap;

use serde_json::Value;

use crate::session::ChatSession;
use habitworth_retrieval::RetrievedFact;

/// Reference hourly wage used to convert wasted time into opportunity cost.
pub const REFERENCE_HOURLY_WAGE: i64 = 25_000;

fn grounding_block(facts: &[RetrievedFact]) -> String {
    if facts.is_empty() {
        return "(no reference data available)".to_string();
    }
    let mut block = String::new();
    for fact in facts {
        block.push_str("- ");
        block.push_str(&fact.content);
        if let Some(source) = &fact.metadata.source {
            block.push_str(&format!(" ({source})"));
        }
        block.push('\n');
    }
    block
}

fn reason_or_none(reason: Option<&str>) -> String {
    reason
        .filter(|r| !r.is_empty())
        .unwrap_or("not given")
        .to_string()
}

/// Questions for the conversational flow: open-ended, empathetic, strictly
/// JSON-listed.
pub fn conversational_questions_prompt(
    habit_name: &str,
    category: &str,
    reason: Option<&str>,
    facts: &[RetrievedFact],
) -> String {
    format!(
        r#"You are a counselor having a friendly conversation with someone about a bad habit, gathering the information needed to estimate what it costs them.

[User]
- Habit: {habit_name}
- Category: {category}
- Reason for wanting to quit: {reason}

[Reference data]
{grounding}

[Rules]
1. Generate 3 to 5 questions that gather what is needed to estimate the habit's cost.
2. Write them in a natural, warm, empathetic conversational tone.
3. Keep them open-ended so the user can answer freely.
4. Between them, the questions must cover: cost per occurrence, frequency, time spent, and health or emotional impact.
5. Respond with the JSON below and nothing else. No text outside the JSON.

[Response format]
{{
  "questions": [
    "Hi! To start, roughly how much do you usually spend each time? A ballpark figure is fine.",
    "How many times a week would you say you do it?",
    "How much time does one occasion usually take?",
    "How do you feel afterwards? Any regret, or physical discomfort?"
  ]
}}"#,
        reason = reason_or_none(reason),
        grounding = grounding_block(facts),
    )
}

/// Typed questions for the single-shot flow.
pub fn typed_questions_prompt(
    habit_name: &str,
    category: &str,
    reason: Option<&str>,
    facts: &[RetrievedFact],
) -> String {
    format!(
        r#"You are an expert who asks follow-up questions needed to estimate the cost of a bad habit.

[User]
- Habit: {habit_name}
- Category: {category}
- Reason for wanting to quit: {reason}

[Reference data]
{grounding}

[Rules]
1. Generate 3 to 5 follow-up questions needed for the valuation.
2. Cover direct spending, frequency, time of day, quantity and similar facts.
3. Respond with the JSON below and nothing else. No text outside the JSON.

[Response format]
{{
  "needMoreInfo": true,
  "questions": [
    {{"id": "price", "question": "How much do you usually spend?", "type": "number", "options": null}},
    {{"id": "frequency", "question": "How many times a week do you do it?", "type": "number", "options": null}},
    {{"id": "time", "question": "What time of day does it usually happen?", "type": "choice", "options": ["morning", "noon", "evening", "night"]}}
  ]
}}"#,
        reason = reason_or_none(reason),
        grounding = grounding_block(facts),
    )
}

fn valuation_rules_and_format() -> String {
    format!(
        r#"[Valuation criteria]
1. Direct cost (directCost): actual money spent.
2. Health cost (healthCost): health deterioration converted to money.
3. Opportunity cost (opportunityCost): time wasted, valued at a reference hourly wage of {REFERENCE_HOURLY_WAGE}.
4. Psychological cost (psychologicalCost): stress, guilt and similar, in the 1,000 to 5,000 range.

[Rules]
1. Use the reference data where available; otherwise estimate from general knowledge.
2. Interpret vague wording as a single number and commit to it (e.g. "about ten thousand" -> 10000, "two or three times a week" -> 2.5). Do not ask again.
3. Calculate the cost of one occurrence.
4. Respond with the JSON below and nothing else. No text outside the JSON.

[Response format]
{{
  "value": 15000,
  "breakdown": {{
    "directCost": 10000,
    "healthCost": 2000,
    "opportunityCost": 2000,
    "psychologicalCost": 1000
  }},
  "explanation": "One delivery order averages 15,000 including health and psychological costs.",
  "sources": ["Statistics Korea, 2023", "AI estimate"]
}}"#
    )
}

/// Valuation prompt over a keyed answer map (single-shot flow).
pub fn valuation_prompt_from_answers(
    habit_name: &str,
    category: &str,
    reason: Option<&str>,
    answers: &HashMap<String, Value>,
    facts: &[RetrievedFact],
) -> String {
    let mut answer_lines = String::new();
    for (key, value) in answers {
        answer_lines.push_str(&format!("- {key}: {value}\n"));
    }

    format!(
        r#"You are an expert who estimates the economic cost of bad habits.

[User]
- Habit: {habit_name}
- Category: {category}
- Reason for wanting to quit: {reason}

[User answers]
{answer_lines}
[Reference data]
{grounding}

{tail}"#,
        reason = reason_or_none(reason),
        grounding = grounding_block(facts),
        tail = valuation_rules_and_format(),
    )
}

/// Valuation prompt over the full conversational transcript.
pub fn valuation_prompt_from_transcript(session: &ChatSession, facts: &[RetrievedFact]) -> String {
    let mut transcript = String::new();
    for (i, question) in session.questions.iter().enumerate() {
        transcript.push_str(&format!("Q: {question}\n"));
        if let Some(answer) = session.answers.get(i) {
            transcript.push_str(&format!("A: {answer}\n"));
        }
        transcript.push('\n');
    }

    format!(
        r#"You are an expert who estimates the economic cost of bad habits.
Analyze the conversation below and estimate the cost.

[User]
- Habit: {habit_name}
- Category: {category}
- Reason for wanting to quit: {reason}

[Conversation]
{transcript}
[Reference data]
{grounding}

{tail}"#,
        habit_name = session.habit_name,
        category = session.category,
        reason = reason_or_none(session.reason.as_deref()),
        grounding = grounding_block(facts),
        tail = valuation_rules_and_format(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use habitworth_retrieval::FactMetadata;

    fn fact(content: &str, source: Option<&str>) -> RetrievedFact {
        RetrievedFact {
            content: content.to_string(),
            metadata: FactMetadata {
                category: Some("EATING".into()),
                source: source.map(str::to_string),
                cost_type: Some("direct".into()),
            },
            distance: 0.2,
            similarity: 0.8,
        }
    }

    #[test]
    fn question_prompt_embeds_grounding_and_habit() {
        let facts = vec![fact(
            "The average food delivery order costs 15,000",
            Some("Statistics Korea, 2023"),
        )];
        let prompt =
            conversational_questions_prompt("late-night snacking", "EATING", None, &facts);
        assert!(prompt.contains("late-night snacking"));
        assert!(prompt.contains("- The average food delivery order costs 15,000 (Statistics Korea, 2023)"));
        assert!(prompt.contains("Reason for wanting to quit: not given"));
        assert!(prompt.contains("nothing else"));
    }

    #[test]
    fn empty_grounding_is_stated_not_blank() {
        let prompt = typed_questions_prompt("doomscrolling", "DIGITAL", Some("sleep"), &[]);
        assert!(prompt.contains("(no reference data available)"));
        assert!(prompt.contains("Reason for wanting to quit: sleep"));
    }

    #[test]
    fn transcript_prompt_pairs_questions_and_answers() {
        let session = ChatSession {
            id: "s".into(),
            habit_name: "late-night snacking".into(),
            category: "EATING".into(),
            reason: None,
            questions: vec!["How much each time?".into(), "How often?".into()],
            answers: vec!["about 10,000".into(), "two or three times a week".into()],
            created_at: Utc::now(),
            expires_at: Utc::now(),
        };
        let prompt = valuation_prompt_from_transcript(&session, &[]);
        assert!(prompt.contains("Q: How much each time?\nA: about 10,000"));
        assert!(prompt.contains("Q: How often?\nA: two or three times a week"));
        assert!(prompt.contains(&REFERENCE_HOURLY_WAGE.to_string()));
    }

    #[test]
    fn answer_map_prompt_lists_keyed_answers() {
        let mut answers = HashMap::new();
        answers.insert("price".to_string(), serde_json::json!(12000));
        let prompt = valuation_prompt_from_answers("snacking", "EATING", None, &answers, &[]);
        assert!(prompt.contains("- price: 12000"));
        assert!(prompt.contains("psychologicalCost"));
    }
}
