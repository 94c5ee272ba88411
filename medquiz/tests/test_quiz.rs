mod helpers;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use helpers::ContentTree;
use medquiz::application::{TopicLoader, TopicLocator};
use medquiz::domain::{AnswerOutcome, DomainError, QuizPhase, QuizRunner, Verdict};

fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn load(tree: &ContentTree, slug: &str) -> Result<QuizRunner> {
    let loader = TopicLoader::new(tree.repository());
    let mut runner = QuizRunner::new();
    let result = slug
        .parse::<TopicLocator>()
        .and_then(|locator| loader.load(&locator));
    runner.load(result)?;
    Ok(runner)
}

#[test]
fn given_topic_on_disk_when_playing_through_then_completes_with_score() -> Result<()> {
    // Arrange
    let tree = ContentTree::golden()?;
    let mut runner = load(&tree, "CARDIO/Anatomy/heart/heart")?;
    runner.start(t0())?;

    // Act: right, wrong, right
    for (i, answer) in ["Right", "Wrong 2", "Right"].iter().enumerate() {
        runner.answer(answer)?;
        runner.next(t0() + Duration::seconds(30 * (i as i64 + 1)))?;
    }

    // Assert
    assert_eq!(runner.phase(), &QuizPhase::Completed);
    assert_eq!(runner.score(), 2);
    assert_eq!(runner.percentage(), 67);
    assert_eq!(runner.verdict(), Verdict::Good);
    assert_eq!(runner.elapsed_secs(t0() + Duration::hours(1)), 90);
    Ok(())
}

#[test]
fn given_repeated_clicks_when_answering_then_only_first_counts() -> Result<()> {
    let tree = ContentTree::golden()?;
    let mut runner = load(&tree, "HEM/Pathology/anemia/anemia")?;
    runner.start(t0())?;

    let first = runner.answer("Wrong 1")?;
    let second = runner.answer("Right")?;

    assert_eq!(first, AnswerOutcome::Incorrect);
    assert_eq!(second, AnswerOutcome::AlreadyAnswered);
    assert_eq!(runner.score(), 0);
    Ok(())
}

#[test]
fn given_missing_topic_file_when_loading_then_runner_fails_with_path() -> Result<()> {
    let tree = ContentTree::golden()?;

    let runner = load(&tree, "HEM/Pathology/leukemia/leukemia")?;

    assert_eq!(
        runner.phase(),
        &QuizPhase::Failed(
            "Topic file not found: /Modules/HEM/Pathology/leukemia/leukemia.json".to_string()
        )
    );
    Ok(())
}

#[test]
fn given_short_slug_when_loading_then_runner_fails_with_format_message() -> Result<()> {
    let tree = ContentTree::golden()?;

    let runner = load(&tree, "HEM/Pathology/anemia")?;

    match runner.phase() {
        QuizPhase::Failed(message) => assert!(message.starts_with("Invalid URL format")),
        other => panic!("Expected Failed, got {:?}", other),
    }
    Ok(())
}

#[test]
fn given_failed_runner_when_retrying_then_can_load_again() -> Result<()> {
    let tree = ContentTree::golden()?;
    let mut runner = load(&tree, "HEM/Pathology/leukemia/leukemia")?;
    tree.add_topic("HEM", "Pathology", "leukemia", "Leukemia", "hard", &[], 1)?;

    runner.retry()?;
    let locator: TopicLocator = "HEM/Pathology/leukemia/leukemia".parse()?;
    runner.load(TopicLoader::new(tree.repository()).load(&locator))?;

    assert_eq!(runner.phase(), &QuizPhase::Ready);
    assert_eq!(runner.total(), 1);
    Ok(())
}

#[test]
fn given_unanswered_question_when_advancing_then_rejects() -> Result<()> {
    let tree = ContentTree::golden()?;
    let mut runner = load(&tree, "HEM/Pathology/anemia/anemia")?;
    runner.start(t0())?;

    let result = runner.next(t0());

    assert!(matches!(result, Err(DomainError::InvalidTransition { .. })));
    assert_eq!(runner.question_index(), 0);
    Ok(())
}

#[test]
fn given_question_file_without_metadata_when_loading_then_reports_no_questions() -> Result<()> {
    // Arrange
    let tree = ContentTree::new()?;
    let dir = tree.add_folder("HEM", "Pathology", "anemia")?;
    std::fs::write(dir.join("anemia.json"), r#"{"questions": []}"#)?;
    let dir = tree.add_folder("HEM", "Pathology", "leukemia")?;
    std::fs::write(dir.join("leukemia.json"), "{}")?;
    let loader = TopicLoader::new(tree.repository());

    // Act
    let empty_list = loader.load(&"HEM/Pathology/anemia/anemia".parse()?);
    let empty_object = loader.load(&"HEM/Pathology/leukemia/leukemia".parse()?);

    // Assert
    for result in [empty_list, empty_object] {
        match result {
            Err(e @ DomainError::InvalidTopic(_)) => {
                assert_eq!(e.to_string(), "Invalid topic data: No questions found")
            }
            other => panic!("Expected InvalidTopic, got {:?}", other),
        }
    }
    Ok(())
}
