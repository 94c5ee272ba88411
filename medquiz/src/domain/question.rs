// src/domain/question.rs
use serde::{Deserialize, Serialize};

use crate::domain::content::lenient_difficulty;
use crate::domain::{Difficulty, DomainError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    #[default]
    Standard,
    /// Image-led question; `image_url` carries the slide.
    Datashow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: QuestionType,
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl Question {
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }
}

/// One topic's question set, the `<topicFolder>.json` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub subject: String,
    #[serde(
        default,
        deserialize_with = "lenient_difficulty",
        skip_serializing_if = "Option::is_none"
    )]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub exam_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl TopicData {
    /// A topic without questions cannot be played.
    pub fn validate(self) -> Result<Self, DomainError> {
        if self.questions.is_empty() {
            return Err(DomainError::InvalidTopic("No questions found".to_string()));
        }
        Ok(self)
    }
}
