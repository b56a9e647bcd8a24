//! End-to-end guardrail behaviour over the static index and scripted generator.

use super::fakes::{external, fact, Reply, ScriptedClient, StaticIndex};
use crate::config::KnowledgeConfig;
use crate::rag::respond::{
    GENERATION_FAILED_MESSAGE, SENSITIVE_NO_CONTEXT_MESSAGE, SENSITIVE_NO_FACTS_MESSAGE,
};
use crate::rag::{ResponsePolicy, Retriever};
use crate::types::{Citation, ResponseStatus, RetrievalOutcome, SourceKind};
use crate::GuardedAssistant;
use factguard_core::AppError;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn config() -> KnowledgeConfig {
    KnowledgeConfig {
        product: "the BYD SEAL".to_string(),
        ..KnowledgeConfig::default()
    }
}

fn assistant(
    workspace: &TempDir,
    config: &KnowledgeConfig,
    index: Arc<StaticIndex>,
    client: Arc<ScriptedClient>,
) -> GuardedAssistant {
    GuardedAssistant::from_config(workspace.path(), config, index, client, "llama3.2")
}

fn clean_external() -> Vec<crate::types::PassageResult> {
    vec![
        external("E001", "The cabin is quiet at highway speed", 0.3),
        external("E002:c1", "Ride comfort is excellent on rough roads", 0.35),
        external("E003", "Seats are supportive on long trips", 0.4),
    ]
}

#[tokio::test]
async fn test_sensitive_without_context_is_refused() {
    let workspace = TempDir::new().unwrap();
    let index = Arc::new(StaticIndex::new(Vec::new(), clean_external()));
    let client = Arc::new(ScriptedClient::text("unused"));

    let response = assistant(&workspace, &config(), index.clone(), client.clone())
        .ask("What is the price of the SEAL?")
        .await
        .unwrap();

    assert_eq!(response.status, ResponseStatus::Refused);
    assert_eq!(response.answer, SENSITIVE_NO_CONTEXT_MESSAGE);
    assert!(response.citations.is_empty());
    assert_eq!(client.calls(), 0);
    assert!(!index.searched(SourceKind::External));
}

#[tokio::test]
async fn test_no_context_is_no_data() {
    let workspace = TempDir::new().unwrap();
    let index = Arc::new(StaticIndex::new(Vec::new(), Vec::new()));
    let client = Arc::new(ScriptedClient::text("unused"));

    let response = assistant(&workspace, &config(), index.clone(), client.clone())
        .ask("How does it handle snow?")
        .await
        .unwrap();

    assert_eq!(response.status, ResponseStatus::NoData);
    assert_eq!(
        response.answer,
        "I don't have sufficient information to answer your question about the BYD SEAL."
    );
    assert!(response.citations.is_empty());
    assert_eq!(client.calls(), 0);
    assert!(index.searched(SourceKind::External));
}

#[tokio::test]
async fn test_sensitive_without_facts_is_refused_even_with_context() {
    let workspace = TempDir::new().unwrap();
    let client = Arc::new(ScriptedClient::text("unused"));
    let policy = ResponsePolicy::new(
        client.clone(),
        "llama3.2",
        "the BYD SEAL",
        workspace.path(),
        config().generation,
    );

    let outcome = RetrievalOutcome {
        context: "[EXTERNAL] Dealers quote a good price".to_string(),
        citations: vec![Citation {
            source: SourceKind::External,
            doc_id: "E009".to_string(),
            chunk_id: "E009".to_string(),
        }],
        facts_count: 0,
        external_count: 1,
        is_sensitive: true,
        used_external: true,
    };

    let response = policy.respond("What is the price?", &outcome).await;

    assert_eq!(response.status, ResponseStatus::Refused);
    assert_eq!(response.answer, SENSITIVE_NO_FACTS_MESSAGE);
    assert!(response.citations.is_empty());
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_answer_gets_citation_markers_appended() {
    let workspace = TempDir::new().unwrap();
    let index = Arc::new(StaticIndex::new(
        vec![fact("F001", "Suspension: adaptive dampers", 0.5)],
        clean_external(),
    ));
    let client = Arc::new(ScriptedClient::text("  The ride is smooth and composed.  "));

    let response = assistant(&workspace, &config(), index, client.clone())
        .ask("How comfortable is the ride?")
        .await
        .unwrap();

    assert_eq!(response.status, ResponseStatus::Answered);
    assert_eq!(
        response.answer,
        "The ride is smooth and composed. [facts:F001:F001] [external:E001:E001] [external:E002:E002:c1]"
    );

    let ids: Vec<&str> = response.citations.iter().map(|c| c.chunk_id.as_str()).collect();
    assert_eq!(ids, vec!["F001", "E001", "E002:c1"]);
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_generator_citations_are_kept_verbatim() {
    let workspace = TempDir::new().unwrap();
    let index = Arc::new(StaticIndex::new(
        vec![fact("F002", "Driving range: 570 km", 0.1)],
        Vec::new(),
    ));
    let client = Arc::new(ScriptedClient::text("It goes 570 km [facts:F002:F002]."));

    let response = assistant(&workspace, &config(), index, client)
        .ask("What is the driving range?")
        .await
        .unwrap();

    assert_eq!(response.answer, "It goes 570 km [facts:F002:F002].");
    assert_eq!(response.citations.len(), 1);
}

#[tokio::test]
async fn test_generator_failure_is_refused() {
    let workspace = TempDir::new().unwrap();
    let index = Arc::new(StaticIndex::new(
        vec![fact("F001", "Driving range: 570 km", 0.1)],
        Vec::new(),
    ));
    let client = Arc::new(ScriptedClient::new(Reply::Fail));

    let response = assistant(&workspace, &config(), index, client.clone())
        .ask("What is the driving range?")
        .await
        .unwrap();

    assert_eq!(response.status, ResponseStatus::Refused);
    assert_eq!(response.answer, GENERATION_FAILED_MESSAGE);
    assert!(response.citations.is_empty());
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_generator_timeout_is_refused() {
    let workspace = TempDir::new().unwrap();
    let mut config = config();
    config.generation.timeout_secs = 1;

    let index = Arc::new(StaticIndex::new(
        vec![fact("F001", "Driving range: 570 km", 0.1)],
        Vec::new(),
    ));
    let client = Arc::new(ScriptedClient::new(Reply::Hang(Duration::from_secs(30))));

    let response = assistant(&workspace, &config, index, client)
        .ask("What is the driving range?")
        .await
        .unwrap();

    assert_eq!(response.status, ResponseStatus::Refused);
    assert_eq!(response.answer, GENERATION_FAILED_MESSAGE);
    assert!(response.citations.is_empty());
}

#[tokio::test]
async fn test_blank_generator_output_is_refused() {
    let workspace = TempDir::new().unwrap();
    let index = Arc::new(StaticIndex::new(
        vec![fact("F001", "Driving range: 570 km", 0.1)],
        Vec::new(),
    ));
    let client = Arc::new(ScriptedClient::text("   \n"));

    let response = assistant(&workspace, &config(), index, client)
        .ask("What is the driving range?")
        .await
        .unwrap();

    assert_eq!(response.status, ResponseStatus::Refused);
    assert!(response.citations.is_empty());
}

#[tokio::test]
async fn test_sensitive_query_answers_from_facts_only() {
    let workspace = TempDir::new().unwrap();
    let index = Arc::new(StaticIndex::new(
        vec![fact("F004", "Warranty: 6 years or 150,000 km", 0.6)],
        clean_external(),
    ));
    let client = Arc::new(ScriptedClient::text("The warranty is 6 years."));

    let response = assistant(&workspace, &config(), index.clone(), client.clone())
        .ask("What warranty does it come with?")
        .await
        .unwrap();

    assert_eq!(response.status, ResponseStatus::Answered);
    assert!(response
        .citations
        .iter()
        .all(|c| c.source == SourceKind::Facts));
    assert!(!index.searched(SourceKind::External));

    let request = client.last_request().unwrap();
    let system = request.system.unwrap();
    assert!(system.contains("ONLY use [FACTS] sources"));
    assert!(system.contains("the BYD SEAL"));
    assert!(request.prompt.contains("[FACTS] Warranty: 6 years"));
    assert!(request.prompt.contains("Question: What warranty does it come with?"));
}

#[tokio::test]
async fn test_facts_precede_external_in_context() {
    let workspace = TempDir::new().unwrap();
    let index = Arc::new(StaticIndex::new(
        vec![
            fact("F001", "Suspension: adaptive dampers", 0.5),
            fact("F002", "Wheelbase: 2920 mm", 0.55),
            fact("F003", "Tyres: 19-inch", 0.6),
            fact("F004", "Weight: 2150 kg", 0.65),
        ],
        clean_external(),
    ));
    let retriever = Retriever::new(index.clone(), &config());

    let outcome = retriever.retrieve("How comfortable is the ride?").await.unwrap();

    let ids: Vec<&str> = outcome.citations.iter().map(|c| c.chunk_id.as_str()).collect();
    assert_eq!(ids, vec!["F001", "F002", "F003", "E001", "E002:c1"]);

    let last_fact = outcome.context.rfind("[FACTS]").unwrap();
    let first_external = outcome.context.find("[EXTERNAL]").unwrap();
    assert!(last_fact < first_external);

    assert_eq!(outcome.facts_count, 4);
    assert_eq!(outcome.external_count, 3);
    assert!(outcome.used_external);
    assert_eq!(
        index.searches(),
        vec![(SourceKind::Facts, 5), (SourceKind::External, 3)]
    );
}

#[tokio::test]
async fn test_confident_facts_skip_external() {
    let index = Arc::new(StaticIndex::new(
        vec![fact("F002", "Driving range: 570 km", 0.2)],
        clean_external(),
    ));
    let retriever = Retriever::new(index.clone(), &config());

    let outcome = retriever.retrieve("What is the driving range?").await.unwrap();

    assert!(!index.searched(SourceKind::External));
    assert!(!outcome.used_external);
    assert_eq!(outcome.external_count, 0);
}

#[tokio::test]
async fn test_protected_external_passages_never_reach_context() {
    let index = Arc::new(StaticIndex::new(
        Vec::new(),
        vec![
            external("E001", "At 150,000 AED it is a bargain", 0.2),
            external("E002", "Quiet and smooth", 0.3),
            external("E003", "The warranty covers the battery", 0.35),
        ],
    ));
    let retriever = Retriever::new(index, &config());

    let outcome = retriever.retrieve("How does it drive?").await.unwrap();

    assert_eq!(outcome.context, "[EXTERNAL] Quiet and smooth");
    assert_eq!(outcome.external_count, 3);
    assert_eq!(outcome.citations.len(), 1);
    assert!(outcome.used_external);
}

#[tokio::test]
async fn test_sensitive_queries_never_use_external() {
    let index = Arc::new(StaticIndex::new(
        vec![fact("F009", "Charging: 150 kW DC", 0.9)],
        clean_external(),
    ));
    let retriever = Retriever::new(index, &config());

    for query in [
        "Is it available for purchase?",
        "How much does it cost?",
        "Is financing offered?",
        "What is the delivery time?",
    ] {
        let outcome = retriever.retrieve(query).await.unwrap();
        assert!(outcome.is_sensitive, "{}", query);
        assert!(!outcome.used_external, "{}", query);
    }
}

#[tokio::test]
async fn test_external_failure_degrades_to_facts() {
    let mut index = StaticIndex::new(vec![fact("F001", "Suspension: adaptive", 0.5)], Vec::new());
    index.fail_external = true;
    let retriever = Retriever::new(Arc::new(index), &config());

    let outcome = retriever.retrieve("How comfortable is the ride?").await.unwrap();

    assert_eq!(outcome.context, "[FACTS] Suspension: adaptive");
    assert_eq!(outcome.external_count, 0);
    assert!(!outcome.used_external);
}

#[tokio::test]
async fn test_facts_failure_is_index_error() {
    let workspace = TempDir::new().unwrap();
    let mut index = StaticIndex::new(Vec::new(), clean_external());
    index.facts_error = Some(|| AppError::Index("facts partition unavailable".to_string()));
    let client = Arc::new(ScriptedClient::text("unused"));

    let result = assistant(&workspace, &config(), Arc::new(index), client)
        .ask("How does it drive?")
        .await;

    assert!(matches!(result, Err(AppError::Index(_))));
}

#[tokio::test]
async fn test_facts_failure_of_any_kind_is_index_error() {
    let workspace = TempDir::new().unwrap();
    let mut index = StaticIndex::new(Vec::new(), clean_external());
    index.facts_error = Some(|| AppError::Serialization("bad metadata row".to_string()));
    let index = Arc::new(index);
    let client = Arc::new(ScriptedClient::text("unused"));

    let result = assistant(&workspace, &config(), index.clone(), client.clone())
        .ask("How does it drive?")
        .await;

    match result {
        Err(AppError::Index(message)) => assert!(message.contains("bad metadata row")),
        other => panic!("expected index error, got {:?}", other),
    }
    assert!(!index.searched(SourceKind::External));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_blank_question_rejected() {
    let workspace = TempDir::new().unwrap();
    let index = Arc::new(StaticIndex::new(Vec::new(), Vec::new()));
    let client = Arc::new(ScriptedClient::text("unused"));

    let result = assistant(&workspace, &config(), index.clone(), client)
        .ask("   ")
        .await;

    assert!(matches!(result, Err(AppError::Config(_))));
    assert!(index.searches().is_empty());
}

#[tokio::test]
async fn test_retrieve_is_repeatable() {
    let index = Arc::new(StaticIndex::new(
        vec![fact("F001", "Suspension: adaptive dampers", 0.5)],
        clean_external(),
    ));
    let retriever = Retriever::new(index, &config());

    let first = retriever.retrieve("How is the ride?").await.unwrap();
    let second = retriever.retrieve("How is the ride?").await.unwrap();

    assert_eq!(first.context, second.context);
    assert_eq!(first.citations, second.citations);
}
