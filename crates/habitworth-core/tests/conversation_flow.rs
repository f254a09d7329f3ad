use std::sync::Arc;

use async_trait::async_trait;
use habitworth_core::{SessionStore, ValueAnalyzer};
use habitworth_provider::{FailingModel, StubModel, TextModel};
use habitworth_retrieval::{EmptyFactSource, FactMetadata, FactSource, RetrievedFact};

/// Fixed grounding facts, standing in for a live vector store.
struct StaticFacts;

#[async_trait]
impl FactSource for StaticFacts {
    async fn search(&self, _query: &str, k: usize, category: Option<&str>) -> Vec<RetrievedFact> {
        assert!(k > 0);
        vec![RetrievedFact {
            content: "The average food delivery order costs 15,000".to_string(),
            metadata: FactMetadata {
                category: category.map(str::to_string),
                source: Some("Statistics Korea, 2023".to_string()),
                cost_type: Some("direct".to_string()),
            },
            distance: 0.1,
            similarity: 0.9,
        }]
    }
}

fn questions_reply() -> String {
    serde_json::json!({
        "questions": [
            "Hi! Roughly how much do you spend each time?",
            "How many times a week does it happen?",
            "How long does one occasion take?",
            "How do you feel afterwards?"
        ]
    })
    .to_string()
}

fn valuation_reply() -> String {
    r#"```json
{
  "value": 15000,
  "breakdown": {
    "directCost": 10000,
    "healthCost": 2000,
    "opportunityCost": 2000,
    "psychologicalCost": 1000
  },
  "explanation": "One late-night delivery order averages 15,000 all in.",
  "sources": ["Statistics Korea, 2023"]
}
```"#
        .to_string()
}

fn analyzer_with(model: Arc<dyn TextModel>) -> ValueAnalyzer {
    ValueAnalyzer::new(model, Arc::new(StaticFacts))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("habitworth_core=debug")
        .with_test_writer()
        .try_init();
}

#[tokio::test]
async fn full_conversation_reaches_a_grounded_valuation() {
    init_tracing();
    let model = Arc::new(StubModel::new(vec![questions_reply(), valuation_reply()]));
    let analyzer = analyzer_with(model);

    let start = analyzer
        .start_chat("late-night snacking", "EATING", Some("I want to sleep better"))
        .await;
    assert_eq!(start.question_number, 1);
    assert_eq!(start.total_questions, 4);
    assert!(!start.is_complete);
    assert!(start.message.contains("how much"));

    let answers = ["about 10,000", "two or three times a week", "half an hour", "guilty"];
    let mut last = None;
    for (i, answer) in answers.iter().enumerate() {
        let turn = analyzer.post_message(&start.session_id, answer).await;
        if i < answers.len() - 1 {
            assert!(!turn.is_complete);
            assert_eq!(turn.question_number, i + 2);
            assert_eq!(turn.total_questions, 4);
            assert!(turn.value_result.is_none());
        }
        last = Some(turn);
    }

    let finish = last.unwrap();
    assert!(finish.is_complete);
    assert_eq!(finish.question_number, 4);
    let result = finish.value_result.expect("valuation present");
    assert_eq!(result.value, 15000);
    assert_eq!(result.breakdown.direct_cost, 10000);
    assert_eq!(result.sources, vec!["Statistics Korea, 2023"]);

    // completed exactly once: the session id no longer resolves
    let after = analyzer.post_message(&start.session_id, "hello?").await;
    assert!(after.is_complete);
    assert!(after.value_result.is_none());
    assert!(after.message.contains("expired"));
}

#[tokio::test]
async fn prose_question_reply_falls_back_to_four_defaults() {
    let model = Arc::new(StubModel::single(
        "I'd be happy to help! Here are some thoughts on your habit...",
    ));
    let analyzer = analyzer_with(model);

    let start = analyzer.start_chat("doomscrolling", "DIGITAL", None).await;
    assert_eq!(start.total_questions, 4);
    assert_eq!(start.question_number, 1);
    assert!(!start.message.is_empty());
}

#[tokio::test]
async fn generation_outage_still_yields_valid_replies() {
    let analyzer = ValueAnalyzer::new(Arc::new(FailingModel), Arc::new(EmptyFactSource));

    let start = analyzer.start_chat("smoking", "SMOKING", None).await;
    assert_eq!(start.total_questions, 4);

    for i in 0..4 {
        let turn = analyzer.post_message(&start.session_id, "an answer").await;
        if i == 3 {
            assert!(turn.is_complete);
            let result = turn.value_result.expect("default valuation present");
            assert_eq!(result.value, 10000);
            assert!(!result.sources.is_empty());
        }
    }
}

#[tokio::test]
async fn empty_retrieval_does_not_block_either_step() {
    let model = Arc::new(StubModel::new(vec![questions_reply(), valuation_reply()]));
    let analyzer = ValueAnalyzer::new(model, Arc::new(EmptyFactSource));

    let start = analyzer.start_chat("snacking", "EATING", None).await;
    assert_eq!(start.total_questions, 4);

    for _ in 0..3 {
        analyzer.post_message(&start.session_id, "answer").await;
    }
    let finish = analyzer.post_message(&start.session_id, "answer").await;
    assert!(finish.is_complete);
    assert_eq!(finish.value_result.unwrap().value, 15000);
}

#[tokio::test]
async fn valuation_without_sources_gets_placeholder() {
    let model = Arc::new(StubModel::new(vec![
        questions_reply(),
        r#"{"value": 8000, "breakdown": {"directCost": 8000}}"#.to_string(),
    ]));
    let analyzer = analyzer_with(model);

    let start = analyzer.start_chat("coffee runs", "CAFFEINE", None).await;
    for _ in 0..3 {
        analyzer.post_message(&start.session_id, "answer").await;
    }
    let finish = analyzer.post_message(&start.session_id, "answer").await;
    let result = finish.value_result.unwrap();
    assert_eq!(result.sources, vec!["AI estimate"]);
}

#[tokio::test]
async fn expired_session_gets_terminal_restart_reply() {
    let model = Arc::new(StubModel::single(questions_reply()));
    let sessions = Arc::new(SessionStore::new().with_ttl(chrono::Duration::milliseconds(-1)));
    let analyzer = ValueAnalyzer::with_sessions(model, Arc::new(EmptyFactSource), sessions);

    let start = analyzer.start_chat("snacking", "EATING", None).await;
    let turn = analyzer.post_message(&start.session_id, "answer").await;
    assert!(turn.is_complete);
    assert!(turn.value_result.is_none());
    assert!(turn.message.contains("expired"));
}

#[tokio::test]
async fn unknown_session_id_is_treated_as_expired() {
    let analyzer = ValueAnalyzer::new(Arc::new(FailingModel), Arc::new(EmptyFactSource));
    let turn = analyzer.post_message("no-such-session", "hello").await;
    assert!(turn.is_complete);
    assert_eq!(turn.question_number, 0);
    assert_eq!(turn.total_questions, 0);
}

#[tokio::test]
async fn raw_complete_propagates_outage() {
    let analyzer = ValueAnalyzer::new(Arc::new(FailingModel), Arc::new(EmptyFactSource));
    assert!(analyzer.raw_complete("ping").await.is_err());

    let analyzer = ValueAnalyzer::new(
        Arc::new(StubModel::single("pong")),
        Arc::new(EmptyFactSource),
    );
    assert_eq!(analyzer.raw_complete("ping").await.unwrap(), "pong");
}
