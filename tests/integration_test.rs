//! Integration tests for the summarization pipeline
//!
//! The orchestrator runs against a scripted in-memory generator and a
//! word-based model profile so token counts are predictable. The HTTP path
//! is exercised against a local mockito server.

use async_trait::async_trait;
use input_summarizer::{
    batch::{BatchOrchestrator, ExampleRecord, NoProgress, RecordStatus},
    budget::ReductionSpec,
    config::GenerationConfig,
    error::{GenerationError, Result, SummarizerError},
    generation::{ChatCompletionClient, Generation, GenerationRequest, TextGenerator, TokenUsage},
    models::{ModelProfile, ModelRegistry},
    summarizer::{Summarizer, SummarizerOptions},
    tokenizer::{TokenizerAdapter, TokenizerKind},
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Summarizes by truncating to the requested cap; fails on texts with "FAIL"
struct ScriptedGenerator {
    calls: AtomicUsize,
    caps: Mutex<Vec<Option<usize>>>,
}

impl ScriptedGenerator {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            caps: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.caps.lock().unwrap().push(request.max_output_tokens);

        let user = &request.messages[1].content;
        let text = user.rsplit("\n\n").next().unwrap_or_default();
        if text.contains("FAIL") {
            return Err(GenerationError::ApiError("simulated outage".to_string()).into());
        }

        let words: Vec<&str> = text.split_whitespace().collect();
        let keep = words.len() * 2 / 5;
        Ok(Generation {
            text: words[..keep].join(" "),
            usage: Some(TokenUsage {
                prompt_tokens: words.len() + 30,
                completion_tokens: keep,
            }),
        })
    }
}

fn word_profile() -> ModelProfile {
    ModelProfile::new(
        "word-model",
        TokenizerKind::WordBased { words_per_token: 1.0 },
        0.001,
        0.002,
        8192,
    )
}

fn orchestrator(generator: Arc<ScriptedGenerator>) -> BatchOrchestrator {
    let mut registry = ModelRegistry::with_builtin_profiles();
    registry.register(word_profile()).unwrap();
    let registry = Arc::new(registry);

    let summarizer = Summarizer::new(
        generator,
        Arc::new(TokenizerAdapter::new(registry)),
        SummarizerOptions::default(),
    );
    BatchOrchestrator::new(Arc::new(summarizer))
}

fn words(n: usize) -> String {
    (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
}

#[tokio::test]
async fn test_end_to_end_budgets_and_zero_token_bypass() {
    let generator = ScriptedGenerator::new();
    let records = vec![
        ExampleRecord::new(words(100)),
        ExampleRecord::new(words(50)),
        ExampleRecord::new(""),
    ];

    let outcome = orchestrator(generator.clone())
        .run_batch(&records, "word-model", &ReductionSpec::KeepRatio(0.5), None, &NoProgress)
        .await
        .unwrap();

    let originals: Vec<usize> = outcome.results.iter().map(|r| r.original_tokens).collect();
    let targets: Vec<usize> = outcome.results.iter().map(|r| r.target_tokens).collect();
    assert_eq!(originals, vec![100, 50, 0]);
    assert_eq!(targets, vec![50, 25, 0]);

    // only the two non-empty records reach the service, capped at target + 50
    assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
    assert_eq!(*generator.caps.lock().unwrap(), vec![Some(100), Some(75)]);

    let first = &outcome.results[0];
    assert_eq!(first.summary_tokens, 40);
    assert_eq!(first.reduction_pct, 60.0);
    assert_eq!(first.prompt_tokens, 130);

    let empty = &outcome.results[2];
    assert_eq!(empty.output, "");
    assert_eq!(empty.reduction_pct, 0.0);
    assert_eq!(empty.status, RecordStatus::Skipped);

    assert_eq!(outcome.metrics.total_completion_tokens, 40 + 20);
    assert_eq!(outcome.metrics.total_prompt_tokens, 130 + 80);
    assert_eq!(outcome.metrics.processed, 3);
}

#[tokio::test]
async fn test_failing_record_does_not_stop_batch() {
    let generator = ScriptedGenerator::new();
    let records = vec![
        ExampleRecord::new(words(10)),
        ExampleRecord::new("FAIL this one please"),
        ExampleRecord::new(words(20)),
    ];

    let outcome = orchestrator(generator.clone())
        .run_batch(&records, "word-model", &ReductionSpec::RemovePercent(50.0), None, &NoProgress)
        .await
        .unwrap();

    assert_eq!(outcome.results.len(), 3);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 3);

    let failed = &outcome.results[1];
    assert_eq!(failed.status, RecordStatus::Failed);
    assert_eq!(failed.summary_tokens, 0);
    assert!(failed.output.starts_with("[ERROR:"));
    assert!(failed.error.as_deref().unwrap().contains("simulated outage"));

    assert_eq!(outcome.results[2].status, RecordStatus::Summarized);
    assert_eq!(outcome.metrics.succeeded, 2);
    assert_eq!(outcome.metrics.failed, 1);
}

#[tokio::test]
async fn test_records_without_input_are_excluded() {
    let records = vec![
        ExampleRecord::new("one two three four five"),
        ExampleRecord {
            input: None,
            output: Some(serde_json::json!("orphan")),
        },
        ExampleRecord {
            input: Some("six seven eight nine ten".to_string()),
            output: Some(serde_json::json!("reference")),
        },
    ];

    let outcome = orchestrator(ScriptedGenerator::new())
        .run_batch(&records, "word-model", &ReductionSpec::KeepRatio(0.6), None, &NoProgress)
        .await
        .unwrap();

    assert_eq!(outcome.results.len(), 2);
    assert!(outcome.results.iter().all(|r| r.reference_output != Some(serde_json::json!("orphan"))));
    assert_eq!(outcome.results[1].reference_output, Some(serde_json::json!("reference")));
}

#[tokio::test]
async fn test_empty_collection_is_input_format_error() {
    let generator = ScriptedGenerator::new();
    let records = vec![ExampleRecord::default(), ExampleRecord::default()];

    let err = orchestrator(generator.clone())
        .run_batch(&records, "word-model", &ReductionSpec::KeepRatio(0.5), None, &NoProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, SummarizerError::InputFormat(_)));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);

    let err = orchestrator(generator.clone())
        .run_batch(&[], "word-model", &ReductionSpec::KeepRatio(0.5), None, &NoProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, SummarizerError::InputFormat(_)));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_model_is_configuration_error() {
    let generator = ScriptedGenerator::new();
    let records = vec![ExampleRecord::new("some text")];

    let err = orchestrator(generator.clone())
        .run_batch(&records, "gpt-99", &ReductionSpec::KeepRatio(0.5), None, &NoProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, SummarizerError::Configuration(_)));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_pipeline_over_http_client() {
    let mut server = mockito::Server::new_async().await;
    let ok = server
        .mock("POST", "/v1/chat/completions")
        .match_body(mockito::Matcher::Regex("first".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "First, shortened."}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 60, "completion_tokens": 4, "total_tokens": 64}
        }"#)
        .create_async()
        .await;
    let outage = server
        .mock("POST", "/v1/chat/completions")
        .match_body(mockito::Matcher::Regex("second".to_string()))
        .with_status(503)
        .with_body("overloaded")
        .create_async()
        .await;

    let client = ChatCompletionClient::new(GenerationConfig {
        api_url: format!("{}/v1/chat/completions", server.url()),
        api_key: secrecy::Secret::new("sk-test".to_string()),
        timeout_secs: 5,
        temperature: 0.3,
        max_tokens_margin: 50,
    })
    .unwrap();

    let registry = Arc::new(ModelRegistry::with_builtin_profiles());
    let summarizer = Summarizer::new(
        Arc::new(client),
        Arc::new(TokenizerAdapter::new(registry)),
        SummarizerOptions::default(),
    );
    let orchestrator = BatchOrchestrator::new(Arc::new(summarizer));

    let records = vec![
        ExampleRecord::new("The first document talks at length about many different things."),
        ExampleRecord::new("The second document is also fairly long and rambling."),
    ];

    let outcome = orchestrator
        .run_batch(&records, "gpt-4", &ReductionSpec::RemovePercent(50.0), None, &NoProgress)
        .await
        .unwrap();

    ok.assert_async().await;
    outage.assert_async().await;

    let first = &outcome.results[0];
    assert_eq!(first.output, "First, shortened.");
    assert_eq!(first.prompt_tokens, 60);
    assert_eq!(first.summary_tokens, 4);
    // (60 * 0.03 + 4 * 0.06) / 1000
    assert_eq!(first.estimated_cost, 0.002);

    let second = &outcome.results[1];
    assert_eq!(second.status, RecordStatus::Failed);
    assert!(second.error.as_deref().unwrap().contains("overloaded"));

    assert_eq!(outcome.metrics.succeeded, 1);
    assert_eq!(outcome.metrics.failed, 1);
}

/// Accepts connections and never answers
async fn stalled_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });
    format!("http://{}/v1/chat/completions", addr)
}

/// Sends texts mentioning "slow" to a real HTTP client, everything else to
/// the scripted generator
struct SplitGenerator {
    slow: ChatCompletionClient,
    fast: Arc<ScriptedGenerator>,
}

#[async_trait]
impl TextGenerator for SplitGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation> {
        if request.messages[1].content.contains("slow") {
            self.slow.generate(request).await
        } else {
            self.fast.generate(request).await
        }
    }
}

#[tokio::test]
async fn test_timed_out_record_fails_and_batch_completes() {
    let slow = ChatCompletionClient::new(GenerationConfig {
        api_url: stalled_endpoint().await,
        api_key: secrecy::Secret::new("sk-test".to_string()),
        timeout_secs: 1,
        temperature: 0.3,
        max_tokens_margin: 50,
    })
    .unwrap();
    let generator = Arc::new(SplitGenerator {
        slow,
        fast: ScriptedGenerator::new(),
    });

    let mut registry = ModelRegistry::new();
    registry.register(word_profile()).unwrap();
    let summarizer = Summarizer::new(
        generator,
        Arc::new(TokenizerAdapter::new(Arc::new(registry))),
        SummarizerOptions::default(),
    );
    let orchestrator = BatchOrchestrator::new(Arc::new(summarizer)).with_max_concurrency(2);

    let records = vec![
        ExampleRecord::new(words(20)),
        ExampleRecord::new(format!("slow {}", words(20))),
        ExampleRecord::new(words(10)),
    ];

    let outcome = orchestrator
        .run_batch(&records, "word-model", &ReductionSpec::RemovePercent(50.0), None, &NoProgress)
        .await
        .unwrap();

    assert_eq!(outcome.results.len(), 3);

    let timed_out = &outcome.results[1];
    assert!(timed_out.is_failure());
    assert_eq!(timed_out.error.as_deref(), Some("Timeout after 1 seconds"));
    assert_eq!(timed_out.output, "[ERROR: Timeout after 1 seconds]");
    assert_eq!(timed_out.estimated_cost, 0.0);

    assert_eq!(outcome.results[0].status, RecordStatus::Summarized);
    assert_eq!(outcome.results[2].status, RecordStatus::Summarized);
    assert_eq!(outcome.metrics.failed, 1);
    assert!((outcome.metrics.success_rate() - 2.0 / 3.0).abs() < 1e-12);
}
