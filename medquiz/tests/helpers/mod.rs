use anyhow::{Context, Result};
use medquiz::application::StructureGenerator;
use medquiz::infrastructure::FsContentRepository;
use medquiz::ports::http::SharedRepository;
use medquiz::ports::AppState;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Test fixture: a public directory with a `Modules/` content tree
#[allow(dead_code)]
pub struct ContentTree {
    _temp_dir: TempDir,
    pub public_dir: PathBuf,
    pub modules_root: PathBuf,
}

#[allow(dead_code)]
impl ContentTree {
    /// Create an empty `public/Modules` tree
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir().context("Failed to create temporary directory")?;
        let public_dir = temp_dir.path().join("public");
        let modules_root = public_dir.join("Modules");
        std::fs::create_dir_all(&modules_root).context("Failed to create Modules directory")?;

        Ok(Self {
            _temp_dir: temp_dir,
            public_dir,
            modules_root,
        })
    }

    /// The golden tree used across integration tests:
    ///
    /// ```text
    /// Modules/
    ///   CARDIO/Anatomy/heart        (info.json, heart.json with 3 questions)
    ///   CARDIO/Physiology/          (empty subject)
    ///   HEM/Pathology/anemia        (info.json, anemia.json with 2 questions)
    ///   HEM/Pathology/leukemia      (folder only)
    ///   NEURO/                      (empty module)
    /// ```
    pub fn golden() -> Result<Self> {
        let tree = Self::new()?;
        tree.add_topic("CARDIO", "Anatomy", "heart", "Heart Chambers", "hard", &["USMLE"], 3)?;
        tree.add_subject("CARDIO", "Physiology")?;
        tree.add_topic("HEM", "Pathology", "anemia", "Anemia", "medium", &["USMLE", "NUB"], 2)?;
        tree.add_folder("HEM", "Pathology", "leukemia")?;
        tree.add_module("NEURO")?;
        Ok(tree)
    }

    pub fn add_module(&self, module: &str) -> Result<PathBuf> {
        let path = self.modules_root.join(module);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }

    pub fn add_subject(&self, module: &str, subject: &str) -> Result<PathBuf> {
        let path = self.modules_root.join(module).join(subject);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }

    pub fn add_folder(&self, module: &str, subject: &str, topic_folder: &str) -> Result<PathBuf> {
        let path = self.modules_root.join(module).join(subject).join(topic_folder);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Topic folder with `info.json` and `<folder>.json` holding `questions`
    /// questions whose correct answer is always the first option.
    #[allow(clippy::too_many_arguments)]
    pub fn add_topic(
        &self,
        module: &str,
        subject: &str,
        topic_folder: &str,
        title: &str,
        difficulty: &str,
        exams: &[&str],
        questions: usize,
    ) -> Result<PathBuf> {
        let dir = self.add_folder(module, subject, topic_folder)?;

        let info = json!({
            "id": module,
            "title": title,
            "subject": subject,
            "difficulty": difficulty,
            "examType": exams,
            "year": 2,
            "solvedCount": 10,
            "xp": 50,
            "rating": 4.5,
            "url": format!("/practice/{module}/{subject}/{topic_folder}/{topic_folder}"),
        });
        write_json(&dir.join("info.json"), &info)?;

        let questions: Vec<_> = (1..=questions)
            .map(|i| {
                json!({
                    "id": format!("q{i}"),
                    "type": "standard",
                    "questionText": format!("{title} question {i}?"),
                    "options": ["Right", "Wrong 1", "Wrong 2", "Wrong 3"],
                    "correctAnswer": "Right",
                    "explanation": format!("Because {i}."),
                })
            })
            .collect();
        let data = json!({
            "title": title,
            "module": module,
            "subject": subject,
            "difficulty": difficulty,
            "examTypes": exams,
            "questions": questions,
        });
        write_json(&dir.join(format!("{topic_folder}.json")), &data)?;
        Ok(dir)
    }

    pub fn repository(&self) -> FsContentRepository {
        FsContentRepository::new(&self.modules_root)
    }

    pub fn index_path(&self) -> PathBuf {
        self.public_dir.join("mst.json")
    }

    /// HTTP state wired the same way `medquiz serve` wires it
    pub fn app_state(&self) -> AppState {
        let repository: SharedRepository = Arc::new(self.repository());
        let generator = Arc::new(StructureGenerator::new(
            Arc::clone(&repository),
            self.index_path(),
        ));
        AppState::new(repository, generator, &self.public_dir)
    }
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}
