//! Predefined question catalog for chats between members without a plan.
//!
//! Loaded once at startup and shared read-only afterwards.

use std::collections::BTreeMap;

use sangam_common::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// A question with its allowed answers. Answers are addressed by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredefinedQuestion {
    pub id: i64,
    pub question: String,
    pub answers: Vec<String>,
}

impl PredefinedQuestion {
    /// Answer text at `index`, if in range.
    #[must_use]
    pub fn answer(&self, index: i64) -> Option<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.answers.get(i))
            .map(String::as_str)
    }
}

/// Immutable question catalog keyed by question id.
#[derive(Debug, Clone)]
pub struct PredefinedCatalog {
    questions: BTreeMap<i64, PredefinedQuestion>,
}

const BUILTIN: &[(&str, &[&str])] = &[
    (
        "Hi! I liked your profile. Would you like to talk?",
        &["Yes, happy to talk", "Let me think about it", "Sorry, not interested"],
    ),
    (
        "Where are you currently living?",
        &["Same city as in my profile", "Relocated recently", "Living abroad"],
    ),
    (
        "Are you open to relocating after marriage?",
        &["Yes", "No", "Depends on the situation"],
    ),
    (
        "What kind of family do you prefer?",
        &["Joint family", "Nuclear family", "No preference"],
    ),
    (
        "Do you plan to continue working after marriage?",
        &["Yes", "No", "Not decided yet"],
    ),
    (
        "Would you like our families to talk?",
        &["Yes, please", "Not yet", "I will let you know"],
    ),
    (
        "Shall we upgrade and continue the conversation?",
        &["Sure", "Maybe later"],
    ),
];

impl PredefinedCatalog {
    /// Build a catalog, rejecting duplicate ids and questions without answers.
    pub fn new(questions: Vec<PredefinedQuestion>) -> AppResult<Self> {
        let mut map = BTreeMap::new();
        for question in questions {
            if question.answers.is_empty() {
                return Err(AppError::Config(format!(
                    "Predefined question {} has no answers",
                    question.id
                )));
            }
            let id = question.id;
            if map.insert(id, question).is_some() {
                return Err(AppError::Config(format!(
                    "Duplicate predefined question id {id}"
                )));
            }
        }
        Ok(Self { questions: map })
    }

    /// The catalog shipped with the server.
    #[must_use]
    pub fn builtin() -> Self {
        let questions = BUILTIN
            .iter()
            .zip(1..)
            .map(|((question, answers), id)| {
                (
                    id,
                    PredefinedQuestion {
                        id,
                        question: (*question).to_string(),
                        answers: answers.iter().map(|a| (*a).to_string()).collect(),
                    },
                )
            })
            .collect();
        Self { questions }
    }

    /// Parse a JSON array of questions.
    pub fn from_json_str(json: &str) -> AppResult<Self> {
        let questions: Vec<PredefinedQuestion> = serde_json::from_str(json)
            .map_err(|e| AppError::Config(format!("Invalid predefined catalog: {e}")))?;
        Self::new(questions)
    }

    /// Load from `path`, or fall back to the built-in catalog.
    pub fn load(path: Option<&str>) -> AppResult<Self> {
        let Some(path) = path else {
            return Ok(Self::builtin());
        };

        let json = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Cannot read catalog {path}: {e}")))?;
        let catalog = Self::from_json_str(&json)?;
        tracing::info!(path = %path, questions = catalog.len(), "Loaded predefined catalog");
        Ok(catalog)
    }

    /// Look up a question.
    #[must_use]
    pub fn question(&self, id: i64) -> Option<&PredefinedQuestion> {
        self.questions.get(&id)
    }

    /// All questions in id order.
    pub fn questions(&self) -> impl Iterator<Item = &PredefinedQuestion> {
        self.questions.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_start_at_one() {
        let catalog = PredefinedCatalog::builtin();
        assert_eq!(catalog.len(), BUILTIN.len());
        assert!(catalog.question(0).is_none());
        assert_eq!(
            catalog.question(1).unwrap().question,
            "Hi! I liked your profile. Would you like to talk?"
        );
        assert!(catalog.questions().all(|q| !q.answers.is_empty()));
    }

    #[test]
    fn test_answer_bounds() {
        let catalog = PredefinedCatalog::builtin();
        let question = catalog.question(3).unwrap();
        assert_eq!(question.answer(0), Some("Yes"));
        assert_eq!(question.answer(2), Some("Depends on the situation"));
        assert_eq!(question.answer(3), None);
        assert_eq!(question.answer(-1), None);
    }

    #[test]
    fn test_from_json_str() {
        let catalog = PredefinedCatalog::from_json_str(
            r#"[{"id": 10, "question": "Tea or coffee?", "answers": ["Tea", "Coffee"]}]"#,
        )
        .unwrap();
        assert_eq!(catalog.question(10).unwrap().answer(1), Some("Coffee"));
    }

    #[test]
    fn test_rejects_duplicates_and_empty_answers() {
        let dup = r#"[
            {"id": 1, "question": "a", "answers": ["x"]},
            {"id": 1, "question": "b", "answers": ["y"]}
        ]"#;
        assert!(matches!(
            PredefinedCatalog::from_json_str(dup),
            Err(AppError::Config(_))
        ));

        let empty = r#"[{"id": 1, "question": "a", "answers": []}]"#;
        assert!(matches!(
            PredefinedCatalog::from_json_str(empty),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_load_without_path_is_builtin() {
        assert_eq!(
            PredefinedCatalog::load(None).unwrap().len(),
            PredefinedCatalog::builtin().len()
        );
    }
}
