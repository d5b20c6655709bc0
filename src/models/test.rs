// src/models/test.rs

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::AppError, models::result::serialize_points, store::Timestamp, utils::html::clean_text,
};

/// Points a question is worth when the author did not pick a score.
pub const DEFAULT_QUESTION_SCORE: i64 = 2;
pub const MIN_QUESTION_SCORE: i64 = 1;
pub const MAX_QUESTION_SCORE: i64 = 5;

/// Represents a document of the 'tests' collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Author, absent for tests created by the super-admin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub time: Timestamp,
}

/// A multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub q: String,
    pub options: Vec<String>,
    /// The correct option, verbatim.
    pub correct: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
}

impl Question {
    pub fn points(&self) -> i64 {
        self.score.unwrap_or(DEFAULT_QUESTION_SCORE)
    }
}

impl Test {
    pub fn total_score(&self) -> i64 {
        self.questions.iter().map(Question::points).sum()
    }
}

/// Listing entry of a test (no questions).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub subject: Option<String>,
    pub question_count: usize,
    pub total_score: i64,
    pub time: Timestamp,
}

impl From<&Test> for TestSummary {
    fn from(test: &Test) -> Self {
        TestSummary {
            id: test.id.clone(),
            title: test.title.clone(),
            description: test.description.clone(),
            subject: test.subject.clone(),
            question_count: test.questions.len(),
            total_score: test.total_score(),
            time: test.time,
        }
    }
}

/// DTO for sending a question to a student (excludes the correct answer).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub q: String,
    /// Options in a shuffled display order.
    pub options: Vec<String>,
    pub score: i64,
}

/// DTO for sending a test to a student.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicTest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub subject: Option<String>,
    pub total_score: i64,
    pub questions: Vec<PublicQuestion>,
}

impl PublicTest {
    /// Hides answers and shuffles every question's options.
    pub fn shuffled(test: &Test) -> Self {
        let mut rng = rand::rng();
        let questions = test
            .questions
            .iter()
            .map(|q| {
                let mut options = q.options.clone();
                options.shuffle(&mut rng);
                PublicQuestion {
                    q: q.q.clone(),
                    options,
                    score: q.points(),
                }
            })
            .collect();

        PublicTest {
            id: test.id.clone(),
            title: test.title.clone(),
            description: test.description.clone(),
            subject: test.subject.clone(),
            total_score: test.total_score(),
            questions,
        }
    }
}

/// DTO for authoring a question.
#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionInput {
    pub q: String,
    pub options: Vec<String>,
    pub correct: String,
    pub score: Option<i64>,
}

/// DTO for creating a new test.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTestRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub description: String,
    /// Honoured for the super-admin only; teachers always write into their own subject.
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 200, message = "A test needs between 1 and 200 questions."))]
    pub questions: Vec<QuestionInput>,
}

impl QuestionInput {
    /// Sanitizes the question, drops blank options and checks the answer key.
    pub fn into_question(self, position: usize) -> Result<Question, AppError> {
        let number = position + 1;
        let q = clean_text(&self.q);
        if q.is_empty() || q.len() > 1000 {
            return Err(AppError::BadRequest(format!(
                "Question {} must have between 1 and 1000 characters",
                number
            )));
        }

        let options: Vec<String> = self
            .options
            .iter()
            .map(|o| clean_text(o))
            .filter(|o| !o.is_empty())
            .collect();
        if options.len() < 2 {
            return Err(AppError::BadRequest(format!(
                "Question {} needs at least two options",
                number
            )));
        }
        if options.iter().any(|o| o.len() > 500) {
            return Err(AppError::BadRequest(format!(
                "Question {} has an option longer than 500 characters",
                number
            )));
        }

        let correct = clean_text(&self.correct);
        if !options.contains(&correct) {
            return Err(AppError::BadRequest(format!(
                "Question {}: correct answer must be one of the options",
                number
            )));
        }

        let score = self.score.unwrap_or(DEFAULT_QUESTION_SCORE);
        if !(MIN_QUESTION_SCORE..=MAX_QUESTION_SCORE).contains(&score) {
            return Err(AppError::BadRequest(format!(
                "Question {}: score must be between {} and {}",
                number, MIN_QUESTION_SCORE, MAX_QUESTION_SCORE
            )));
        }

        Ok(Question {
            q,
            options,
            correct,
            score: Some(score),
        })
    }
}

/// DTO for submitting a test attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitTestRequest {
    /// Selected option per question, in question order.
    pub answers: Vec<String>,
}

/// Response after a submission is stored.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTestResponse {
    pub result_id: String,
    pub correct: u32,
    pub wrong_count: u32,
    #[serde(serialize_with = "serialize_points")]
    pub score_gain: f64,
    #[serde(serialize_with = "serialize_points")]
    pub score_total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(options: &[&str], correct: &str, score: Option<i64>) -> QuestionInput {
        QuestionInput {
            q: "She ___ tea.".to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct: correct.to_string(),
            score,
        }
    }

    #[test]
    fn test_create_request_needs_questions() {
        let req = CreateTestRequest {
            title: "Present Simple".to_string(),
            description: String::new(),
            subject: None,
            questions: Vec::new(),
        };
        assert!(req.validate().is_err());

        let req = CreateTestRequest {
            questions: vec![input(&["drink", "drinks"], "drinks", None)],
            ..req
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_into_question_drops_blank_options() {
        let question = input(&["drink", " ", "drinks"], "drinks", None)
            .into_question(0)
            .unwrap();
        assert_eq!(question.options, vec!["drink", "drinks"]);
        assert_eq!(question.points(), DEFAULT_QUESTION_SCORE);
    }

    #[test]
    fn test_into_question_rejects_bad_answer_key() {
        assert!(input(&["drink", "drinks"], "drank", None).into_question(0).is_err());
        assert!(input(&["drink"], "drink", None).into_question(0).is_err());
        assert!(input(&["drink", "drinks"], "drinks", Some(6)).into_question(0).is_err());
    }
}
