// src/util/testing.rs

use anyhow::Result;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::env;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{ContentRepository, KeyValueStore, TopicLocator};
use crate::constants::{MODULES_DIR, TOPIC_INFO_FILE};
use crate::domain::{Difficulty, DomainError, Question, QuestionType, TopicData, TopicInfo};

// Common test environment variables
pub const TEST_ENV_VARS: &[&str] = &["RUST_LOG", "NO_CLEANUP"];

type Tree = BTreeMap<String, BTreeMap<String, BTreeSet<String>>>;

/// Shared in-memory content tree for testing use cases that depend on
/// ContentRepository.
///
/// # Examples
///
/// ```
/// use medquiz::application::ContentRepository;
/// use medquiz::util::testing::{sample_topic_info, MockContentRepository};
///
/// let mock = MockContentRepository::builder()
///     .with_topic_info("HEM", "Pathology", "anemia", sample_topic_info("HEM", "Anemia", "Pathology"))
///     .with_module("CARDIO")
///     .build();
///
/// assert_eq!(mock.list_modules().unwrap(), vec!["CARDIO", "HEM"]);
/// ```
pub struct MockContentRepository {
    root_exists: bool,
    tree: Tree,
    infos: HashMap<(String, String, String), TopicInfo>,
    topics: HashMap<String, TopicData>,
}

impl MockContentRepository {
    pub fn builder() -> MockContentRepositoryBuilder {
        MockContentRepositoryBuilder::new()
    }

    fn path(segments: &[&str]) -> PathBuf {
        segments
            .iter()
            .fold(PathBuf::from(MODULES_DIR), |path, segment| path.join(segment))
    }
}

impl ContentRepository for MockContentRepository {
    fn list_modules(&self) -> Result<Vec<String>, DomainError> {
        if !self.root_exists {
            return Err(DomainError::PathNotFound(PathBuf::from(MODULES_DIR)));
        }
        Ok(self.tree.keys().cloned().collect())
    }

    fn list_subjects(&self, module: &str) -> Result<Vec<String>, DomainError> {
        self.tree
            .get(module)
            .filter(|_| self.root_exists)
            .map(|subjects| subjects.keys().cloned().collect())
            .ok_or_else(|| DomainError::PathNotFound(Self::path(&[module])))
    }

    fn list_topics(&self, module: &str, subject: &str) -> Result<Vec<String>, DomainError> {
        self.tree
            .get(module)
            .and_then(|subjects| subjects.get(subject))
            .filter(|_| self.root_exists)
            .map(|topics| topics.iter().cloned().collect())
            .ok_or_else(|| DomainError::PathNotFound(Self::path(&[module, subject])))
    }

    fn read_topic_info(
        &self,
        module: &str,
        subject: &str,
        topic_folder: &str,
    ) -> Result<TopicInfo, DomainError> {
        let key = (module.to_string(), subject.to_string(), topic_folder.to_string());
        self.infos.get(&key).cloned().ok_or_else(|| {
            DomainError::PathNotFound(Self::path(&[module, subject, topic_folder, TOPIC_INFO_FILE]))
        })
    }

    fn read_topic_data(&self, locator: &TopicLocator) -> Result<TopicData, DomainError> {
        self.topics
            .get(&locator.to_string())
            .cloned()
            .ok_or_else(|| DomainError::TopicNotFound(locator.url_path()))
    }
}

/// Builder for MockContentRepository
///
/// Adding a deeper level creates the levels above it.
pub struct MockContentRepositoryBuilder {
    root_exists: bool,
    tree: Tree,
    infos: HashMap<(String, String, String), TopicInfo>,
    topics: HashMap<String, TopicData>,
}

impl MockContentRepositoryBuilder {
    pub fn new() -> Self {
        Self {
            root_exists: true,
            tree: Tree::new(),
            infos: HashMap::new(),
            topics: HashMap::new(),
        }
    }

    /// Add an empty module directory
    pub fn with_module(mut self, module: &str) -> Self {
        self.tree.entry(module.to_string()).or_default();
        self
    }

    /// Add an empty subject directory
    pub fn with_subject(mut self, module: &str, subject: &str) -> Self {
        self.tree
            .entry(module.to_string())
            .or_default()
            .entry(subject.to_string())
            .or_default();
        self
    }

    /// Add a topic folder without `info.json`
    pub fn with_topic_folder(mut self, module: &str, subject: &str, topic_folder: &str) -> Self {
        self.tree
            .entry(module.to_string())
            .or_default()
            .entry(subject.to_string())
            .or_default()
            .insert(topic_folder.to_string());
        self
    }

    /// Add a topic folder with its `info.json`
    pub fn with_topic_info(
        self,
        module: &str,
        subject: &str,
        topic_folder: &str,
        info: TopicInfo,
    ) -> Self {
        let mut builder = self.with_topic_folder(module, subject, topic_folder);
        builder.infos.insert(
            (module.to_string(), subject.to_string(), topic_folder.to_string()),
            info,
        );
        builder
    }

    /// Add the question-set file a locator resolves to
    pub fn with_topic_data(self, locator: TopicLocator, data: TopicData) -> Self {
        let mut builder =
            self.with_topic_folder(&locator.module, &locator.subject, &locator.topic_folder);
        builder.topics.insert(locator.to_string(), data);
        builder
    }

    /// Make every lookup fail as if the `Modules` directory were absent
    pub fn without_root(mut self) -> Self {
        self.root_exists = false;
        self
    }

    pub fn build(self) -> MockContentRepository {
        MockContentRepository {
            root_exists: self.root_exists,
            tree: self.tree,
            infos: self.infos,
            topics: self.topics,
        }
    }
}

impl Default for MockContentRepositoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory stand-in for the JSON file store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Topic metadata with easy difficulty and no exam types.
pub fn sample_topic_info(id: &str, title: &str, subject: &str) -> TopicInfo {
    TopicInfo {
        id: id.to_string(),
        title: title.to_string(),
        subject: subject.to_string(),
        difficulty: Some(Difficulty::Easy),
        exam_type: vec![],
        year: 1,
        solved_count: 0,
        xp: 100,
        rating: 4.0,
        url: String::new(),
    }
}

/// A question set of `count` questions. Each offers "Option A" to "Option D"
/// and "Option A" is correct.
pub fn sample_topic_data(title: &str, count: usize) -> TopicData {
    let questions = (1..=count)
        .map(|i| Question {
            id: format!("q{i}"),
            kind: QuestionType::Standard,
            question_text: format!("Question {i} about {title}?"),
            image_url: None,
            image_alt: None,
            options: ["A", "B", "C", "D"]
                .iter()
                .map(|o| format!("Option {o}"))
                .collect(),
            correct_answer: "Option A".to_string(),
            explanation: format!("Explanation {i}"),
            references: vec![],
            difficulty: None,
        })
        .collect();

    TopicData {
        title: title.to_string(),
        module: "HEM".to_string(),
        subject: "Pathology".to_string(),
        difficulty: Some(Difficulty::Medium),
        exam_types: vec!["USMLE".to_string()],
        description: None,
        questions,
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Create a filter for noisy modules
    let noisy_modules = ["hyper", "h2", "tower", "mio"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // Set up the subscriber with environment filter
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    // Build and set the subscriber
    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}
