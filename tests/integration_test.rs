use async_trait::async_trait;
use quiz_generate::config::{Config, GeneratorSettings};
use quiz_generate::error::{GenerationError, ServiceError};
use quiz_generate::models::catalog::Catalog;
use quiz_generate::models::request::{Difficulty, GenerationRequest, RequestSpec};
use quiz_generate::orchestrator::{process_request, App, QuizGenerator};
use quiz_generate::services::OutcomeWriter;
use quiz_generate::workflow::MAX_ATTEMPTS;
use quiz_generate::{GenerationClient, OpenAiGenerationClient};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const CATALOG: &str = r#"
[[subjects]]
id = 33
name = "Mathematics"
level = "10th Grade"
category = "Academics"

[[saved_configs]]
id = 1
subject_id = 33
difficulty = "easy"
number_of_questions = 20

[[topics]]
category = "Academics"
level = "10th Grade"
subject = "Mathematics"
difficulty = "easy"
labels = [
    "T01", "T02", "T03", "T04", "T05", "T06", "T07", "T08", "T09", "T10",
    "T11", "T12", "T13", "T14", "T15", "T16", "T17", "T18", "T19", "T20",
]

[[topics]]
category = "Academics"
level = "10th Grade"
subject = "Mathematics"
difficulty = "hard"
labels = ["Algebra", "Broken", "Geometry"]
"#;

/// 按提示词里要求的数量返回题目；主题名为 "Broken" 时一直返回服务错误
struct StubClient {
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StubClient {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn requested_count(prompt: &str) -> usize {
    let lower = prompt.to_lowercase();
    lower
        .split("generate ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

fn topic_of(prompt: &str) -> String {
    prompt
        .lines()
        .find_map(|line| line.strip_prefix("Topic: "))
        .unwrap_or("material")
        .to_string()
}

#[async_trait]
impl GenerationClient for StubClient {
    async fn complete(&self, user: &str, _: Option<&str>, _: u32) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(user.to_string());

        let topic = topic_of(user);
        if topic == "Broken" {
            return Err(ServiceError::api_call_failed("stub", "service unavailable"));
        }

        let items: Vec<serde_json::Value> = (0..requested_count(user))
            .map(|i| {
                serde_json::json!({
                    "question": format!("{} #{}", topic, i),
                    "options": ["A", "B", "C", "D"],
                    "correct_answer": i % 4,
                    "explanation": "stub"
                })
            })
            .collect();
        Ok(serde_json::to_string(&items).unwrap())
    }
}

fn settings(seed: u64) -> GeneratorSettings {
    GeneratorSettings {
        retry_delay: Duration::ZERO,
        shuffle_seed: Some(seed),
        ..GeneratorSettings::default()
    }
}

fn catalog() -> Catalog {
    Catalog::from_toml_str(CATALOG).unwrap()
}

fn generator(client: Arc<StubClient>, seed: u64) -> QuizGenerator {
    QuizGenerator::new(client, Arc::new(catalog().topics().clone()), settings(seed))
}

fn request(difficulty: Difficulty, count: usize) -> GenerationRequest {
    GenerationRequest::new("Academics", "10th Grade", "Mathematics", difficulty, count, None).unwrap()
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("quiz_generate_it_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[tokio::test]
async fn test_twenty_topics_one_question_each() {
    let client = StubClient::new();
    let outcome = generator(client.clone(), 11)
        .generate(&request(Difficulty::Easy, 20), 1)
        .await;

    assert_eq!(client.calls(), 20);
    assert_eq!(outcome.effective_count(), 20);
    assert_eq!(outcome.total_count, 20);
    assert_eq!(outcome.attempts_consumed, 20);
    assert!(outcome.failed_topics.is_empty());

    // 每个主题恰好 1 道题，打乱后仍是同一组题目
    let got: HashSet<String> = outcome.records.iter().map(|r| r.question.clone()).collect();
    let expected: HashSet<String> = (1..=20).map(|i| format!("T{:02} #0", i)).collect();
    assert_eq!(got, expected);

    for prompt in client.prompts.lock().unwrap().iter() {
        assert!(prompt.starts_with("Generate 1 multiple-choice questions"));
    }
}

#[tokio::test]
async fn test_same_seed_gives_same_order() {
    let first = generator(StubClient::new(), 5)
        .generate(&request(Difficulty::Easy, 20), 1)
        .await;
    let second = generator(StubClient::new(), 5)
        .generate(&request(Difficulty::Easy, 20), 1)
        .await;

    assert_eq!(first.records, second.records);
}

#[tokio::test]
async fn test_exhausted_topic_does_not_affect_others() {
    let client = StubClient::new();
    let outcome = generator(client.clone(), 1)
        .generate(&request(Difficulty::Hard, 9), 1)
        .await;

    assert_eq!(outcome.failed_topics, vec!["Broken".to_string()]);
    assert_eq!(outcome.effective_count(), 6);
    assert!(!outcome.is_complete());
    assert_eq!(client.calls(), 2 + MAX_ATTEMPTS);
    assert_eq!(outcome.attempts_consumed, 2 + MAX_ATTEMPTS);
}

#[tokio::test]
async fn test_oversized_request_is_clamped() {
    let client = StubClient::new();
    let request = request(Difficulty::Easy, 500);
    assert_eq!(request.total_count(), 100);
    assert!(request.was_clamped());

    let outcome = generator(client.clone(), 2).generate(&request, 1).await;

    assert_eq!(outcome.total_count, 100);
    assert_eq!(outcome.effective_count(), 100);
    assert_eq!(client.calls(), 20);
}

#[tokio::test]
async fn test_material_mode_keeps_order() {
    let client = StubClient::new();
    let material = "Photosynthesis converts light energy into chemical energy stored in glucose. ".repeat(3);

    let outcome = generator(client.clone(), 9)
        .generate_from_material(&request(Difficulty::Easy, 4), &material, 1)
        .await
        .unwrap();

    assert_eq!(client.calls(), 1);
    let questions: Vec<&str> = outcome.records.iter().map(|r| r.question.as_str()).collect();
    assert_eq!(questions, vec!["material #0", "material #1", "material #2", "material #3"]);
}

#[tokio::test]
async fn test_process_request_writes_quiz_file() {
    let out = temp_dir("write");
    let client = StubClient::new();
    let writer = OutcomeWriter::new(&out);
    let spec = RequestSpec {
        config_id: Some(1),
        file_path: Some("requests/maths.toml".into()),
        ..Default::default()
    };

    let report = process_request(&generator(client, 4), &catalog(), &writer, &spec, 1)
        .await
        .unwrap();

    assert_eq!(report.title, "Mathematics - Easy Quiz");
    assert_eq!(report.effective_count, 20);

    let path = report.output_path.unwrap();
    assert!(path.file_name().unwrap().to_string_lossy().ends_with("-maths.json"));
    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["mode"], "topic_planned");
    assert_eq!(json["time_limit_secs"], 1200);
    assert_eq!(json["questions"].as_array().unwrap().len(), 20);
    assert_eq!(json["questions"][0]["order"], 1);

    std::fs::remove_dir_all(&out).unwrap();
}

#[tokio::test]
async fn test_structural_errors_reach_no_client() {
    let out = temp_dir("structural");
    let client = StubClient::new();
    let generator = generator(client.clone(), 4);
    let writer = OutcomeWriter::new(&out);

    let missing_config = RequestSpec {
        config_id: Some(404),
        ..Default::default()
    };
    let err = process_request(&generator, &catalog(), &writer, &missing_config, 1)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GenerationError>(),
        Some(GenerationError::ConfigurationNotFound { config_id: 404 })
    ));

    let missing_subject = RequestSpec {
        subject_id: Some(99),
        ..Default::default()
    };
    let err = process_request(&generator, &catalog(), &writer, &missing_subject, 2)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GenerationError>(),
        Some(GenerationError::SubjectNotFound { subject_id: 99 })
    ));

    let zero = RequestSpec {
        subject_id: Some(33),
        num_questions: 0,
        ..Default::default()
    };
    let err = process_request(&generator, &catalog(), &writer, &zero, 3)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<GenerationError>(),
        Some(GenerationError::InvalidQuestionCount)
    ));

    assert_eq!(client.calls(), 0);
    std::fs::remove_dir_all(&out).unwrap();
}

#[tokio::test]
async fn test_app_processes_request_folder() {
    let root = temp_dir("app");
    let requests = root.join("requests");
    std::fs::create_dir_all(requests.join("materials")).unwrap();
    std::fs::write(requests.join("a.toml"), "config_id = 1\n").unwrap();
    std::fs::write(
        requests.join("b.toml"),
        "material_file = \"materials/notes.txt\"\nnum_questions = 3\n",
    )
    .unwrap();
    std::fs::write(requests.join("c.toml"), "subject_id = 12345\n").unwrap();
    std::fs::write(
        requests.join("materials/notes.txt"),
        "The mitochondria is the powerhouse of the cell and produces ATP through respiration.",
    )
    .unwrap();

    let config = Config {
        requests_folder: requests.to_string_lossy().to_string(),
        output_folder: root.join("output").to_string_lossy().to_string(),
        output_log_file: root.join("output.txt").to_string_lossy().to_string(),
        max_concurrent_requests: 2,
        retry_delay_ms: 0,
        shuffle_seed: Some(1),
        ..Config::default()
    };
    let log_file = config.output_log_file.clone();
    quiz_generate::utils::logging::init_log_file(&log_file).unwrap();

    let client = StubClient::new();
    let stats = App::with_client(config, catalog(), client.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(stats.total, 3);
    assert_eq!(stats.succeeded, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.questions, 23);
    assert_eq!(client.calls(), 21);

    let outputs = std::fs::read_dir(root.join("output")).unwrap().count();
    assert_eq!(outputs, 2);

    let log = std::fs::read_to_string(&log_file).unwrap();
    assert!(log.contains("[请求 1] ✅"));
    assert!(log.contains("[请求 3] ❌"));

    std::fs::remove_dir_all(&root).unwrap();
}

#[tokio::test]
async fn test_unwritable_run_log_does_not_fail_the_run() {
    let root = temp_dir("bad_log");
    let requests = root.join("requests");
    std::fs::create_dir_all(&requests).unwrap();
    std::fs::write(requests.join("a.toml"), "config_id = 1\n").unwrap();
    std::fs::write(requests.join("b.toml"), "config_id = 1\n").unwrap();

    // 日志路径是一个目录，追加写入必然失败
    let config = Config {
        requests_folder: requests.to_string_lossy().to_string(),
        output_folder: root.join("output").to_string_lossy().to_string(),
        output_log_file: root.to_string_lossy().to_string(),
        max_concurrent_requests: 2,
        retry_delay_ms: 0,
        ..Config::default()
    };

    let client = StubClient::new();
    let stats = App::with_client(config, catalog(), client.clone())
        .run()
        .await
        .unwrap();

    assert_eq!(stats.succeeded, 2);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.questions, 40);
    assert_eq!(client.calls(), 40);
    assert_eq!(std::fs::read_dir(root.join("output")).unwrap().count(), 2);

    std::fs::remove_dir_all(&root).unwrap();
}

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_live_generation() {
    quiz_generate::utils::logging::init(true);

    let config = Config::from_env();
    let client = Arc::new(OpenAiGenerationClient::new(&config));
    let generator = QuizGenerator::new(client, Arc::new(catalog().topics().clone()), config.generator_settings());

    let outcome = generator.generate(&request(Difficulty::Easy, 3), 1).await;

    println!("生成 {} 道题", outcome.effective_count());
    for record in &outcome.records {
        println!("{}", record);
    }
    assert!(outcome.effective_count() > 0, "应该至少生成一道题");
}
