// src/domain/content.rs
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Flattened Module → Subject → topic folders mapping, as written to `mst.json`.
pub type ContentStructure = BTreeMap<String, BTreeMap<String, Vec<String>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(label)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}' (expected easy, medium or hard)")),
        }
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Content files are hand-written; an unrecognised difficulty reads as none.
pub(crate) fn lenient_difficulty<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Difficulty>, D::Error> {
    let text = Option::<String>::deserialize(deserializer)?;
    Ok(text.and_then(|t| t.parse().ok()))
}

/// Topic metadata read from a topic folder's `info.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default, deserialize_with = "lenient_difficulty")]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub exam_type: Vec<String>,
    #[serde(default)]
    pub year: u32,
    #[serde(default)]
    pub solved_count: u32,
    #[serde(default)]
    pub xp: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub url: String,
}

/// A discovered topic together with where its question set lives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub info: TopicInfo,
    pub module: String,
    pub topic_folder: String,
    pub path: String,
}

impl CatalogEntry {
    pub fn new(module: &str, subject_dir: &str, topic_folder: &str, info: TopicInfo) -> Self {
        let path = format!(
            "/{}/{module}/{subject_dir}/{topic_folder}/{topic_folder}.json",
            crate::constants::MODULES_DIR
        );
        Self {
            info,
            module: module.to_string(),
            topic_folder: topic_folder.to_string(),
            path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_info_json_when_parsing_then_reads_camel_case_fields() {
        let json = r#"{
            "id": "HEM",
            "title": "Anemia",
            "subject": "Pathology",
            "difficulty": "medium",
            "examType": ["USMLE", "NUB"],
            "year": 3,
            "solvedCount": 1200,
            "xp": 150,
            "rating": 4.5,
            "url": "/practice/HEM/Pathology/anemia/anemia"
        }"#;

        let info: TopicInfo = serde_json::from_str(json).unwrap();

        assert_eq!(info.id, "HEM");
        assert_eq!(info.difficulty, Some(Difficulty::Medium));
        assert_eq!(info.exam_type, vec!["USMLE", "NUB"]);
        assert_eq!(info.solved_count, 1200);
        assert_eq!(info.year, 3);
    }

    #[test]
    fn given_sparse_info_json_when_parsing_then_defaults_optional_fields() {
        let json = r#"{"id": "GI", "title": "Liver", "subject": "Anatomy", "difficulty": "easy"}"#;

        let info: TopicInfo = serde_json::from_str(json).unwrap();

        assert!(info.exam_type.is_empty());
        assert_eq!(info.xp, 0);
        assert_eq!(info.url, "");
    }

    #[test]
    fn given_capitalized_or_unknown_difficulty_when_parsing_info_then_keeps_topic() {
        let capitalized = r#"{"id": "HEM", "title": "Anemia", "subject": "Pathology", "difficulty": "Medium"}"#;
        let unknown = r#"{"title": "Anemia", "difficulty": "expert"}"#;
        let missing = r#"{"title": "Anemia"}"#;

        let capitalized: TopicInfo = serde_json::from_str(capitalized).unwrap();
        let unknown: TopicInfo = serde_json::from_str(unknown).unwrap();
        let missing: TopicInfo = serde_json::from_str(missing).unwrap();

        assert_eq!(capitalized.difficulty, Some(Difficulty::Medium));
        assert_eq!(unknown.difficulty, None);
        assert_eq!(missing.difficulty, None);
        assert_eq!(missing.subject, "");
    }

    #[test]
    fn given_difficulty_text_when_parsing_then_ignores_case() {
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("expert".parse::<Difficulty>().is_err());
    }

    #[test]
    fn given_topic_location_when_building_entry_then_points_at_question_file() {
        let info: TopicInfo = serde_json::from_str(
            r#"{"id": "CARDIO", "title": "Heart", "subject": "Anatomy", "difficulty": "hard"}"#,
        )
        .unwrap();

        let entry = CatalogEntry::new("CARDIO", "Anatomy", "heart", info);

        assert_eq!(entry.path, "/Modules/CARDIO/Anatomy/heart/heart.json");
    }
}
