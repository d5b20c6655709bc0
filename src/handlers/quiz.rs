// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        result::{ResultRecord, WrongAnswer},
        subject::{DEFAULT_SUBJECT, normalize_subject},
        test::{
            CreateTestRequest, PublicTest, SubmitTestRequest, SubmitTestResponse, Test,
            TestSummary,
        },
    },
    results::scope::{Actor, subject_matches},
    store::{self, Collection, DocumentStore, Timestamp},
    utils::{html::clean_text, jwt::Claims},
};

/// Name recorded for submissions from a token without a usable name.
pub const ANONYMOUS_STUDENT: &str = "Anonymous";

#[derive(Debug, Deserialize)]
pub struct TestListParams {
    pub subject: Option<String>,
}

async fn load_test(store: &dyn DocumentStore, id: &str) -> Result<Test, AppError> {
    store::fetch::<Test>(store, Collection::Tests, id)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))
}

/// Lists tests, newest first, optionally for one subject.
pub async fn list_tests(
    State(store): State<Arc<dyn DocumentStore>>,
    Query(params): Query<TestListParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut tests: Vec<Test> = store::fetch_all(store.as_ref(), Collection::Tests).await?;
    if let Some(subject) = params.subject.as_deref().filter(|s| !s.trim().is_empty()) {
        tests.retain(|t| subject_matches(subject, t.subject.as_deref()));
    }
    tests.sort_by_key(|t| std::cmp::Reverse(t.time.millis()));

    let summaries: Vec<TestSummary> = tests.iter().map(TestSummary::from).collect();
    Ok(Json(summaries))
}

/// Returns a test ready to be solved: answers hidden, options shuffled.
pub async fn get_test(
    State(store): State<Arc<dyn DocumentStore>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let test = load_test(store.as_ref(), &id).await?;
    Ok(Json(PublicTest::shuffled(&test)))
}

/// Creates a new test.
/// Staff only. A teacher's test always belongs to the teacher's subject.
pub async fn create_test(
    State(store): State<Arc<dyn DocumentStore>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (subject, teacher_id) = match Actor::from_claims(&claims) {
        Actor::Teacher { id, subject } => (normalize_subject(&subject), Some(id)),
        _ => (
            payload
                .subject
                .as_deref()
                .map(normalize_subject)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            None,
        ),
    };

    let questions = payload
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| q.into_question(i))
        .collect::<Result<Vec<_>, _>>()?;

    let title = clean_text(&payload.title);
    if title.is_empty() {
        return Err(AppError::BadRequest("Title cannot be empty".to_string()));
    }

    let test = Test {
        id: String::new(),
        title,
        description: clean_text(&payload.description),
        subject: Some(subject),
        teacher_id,
        questions,
        time: Timestamp::Pending,
    };

    let id = store::insert(store.as_ref(), Collection::Tests, &test).await?;
    tracing::info!("Test {} created by {}", id, claims.sub);

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Deletes a test by ID.
/// Staff only; teachers may only delete tests of their own subject.
pub async fn delete_test(
    State(store): State<Arc<dyn DocumentStore>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let test = load_test(store.as_ref(), &id).await?;

    if let Actor::Teacher { subject, .. } = Actor::from_claims(&claims) {
        if !subject_matches(&subject, test.subject.as_deref()) {
            return Err(AppError::Forbidden(
                "Test belongs to another subject".to_string(),
            ));
        }
    }

    if !store.delete(Collection::Tests, &id).await? {
        return Err(AppError::NotFound("Test not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Grades answers given in question order.
///
/// Returns the result without id, name and time. Every question not answered
/// with exactly its correct option becomes a wrong answer.
pub fn grade(test: &Test, answers: &[String]) -> ResultRecord {
    let mut correct = 0;
    let mut score_gain = 0;
    let mut wrong_questions = Vec::new();

    for (index, question) in test.questions.iter().enumerate() {
        let selected = answers.get(index).filter(|a| !a.is_empty());
        if selected == Some(&question.correct) {
            correct += 1;
            score_gain += question.points();
        } else {
            wrong_questions.push(WrongAnswer {
                index: index as u32,
                q: question.q.clone(),
                selected: selected.cloned(),
                correct: question.correct.clone(),
                options: question.options.clone(),
            });
        }
    }

    ResultRecord {
        id: String::new(),
        student_name: String::new(),
        test_id: test.id.clone(),
        test_title: test.title.clone(),
        subject: test.subject.clone(),
        correct,
        score_gain: Some(score_gain as f64),
        score_total: Some(test.total_score() as f64),
        wrong_questions,
        time: Timestamp::Pending,
    }
}

/// Submits a student's answers and stores the scored result.
///
/// * Every question must be answered.
/// * The result is recorded under the token's name.
pub async fn submit_test(
    State(store): State<Arc<dyn DocumentStore>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<SubmitTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    let test = load_test(store.as_ref(), &id).await?;

    if req.answers.len() != test.questions.len() || req.answers.iter().any(|a| a.is_empty()) {
        return Err(AppError::BadRequest(
            "Every question must be answered".to_string(),
        ));
    }

    let mut result = grade(&test, &req.answers);
    let name = claims.name.trim();
    result.student_name = if name.is_empty() {
        ANONYMOUS_STUDENT.to_string()
    } else {
        name.to_string()
    };

    let result_id = store::insert(store.as_ref(), Collection::Results, &result)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save result: {:?}", e);
            e
        })?;

    let score = result.score();
    tracing::info!(
        "Result {} saved for test {}: {}",
        result_id,
        test.id,
        score
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitTestResponse {
            result_id,
            correct: result.correct,
            wrong_count: score.wrong_count,
            score_gain: score.gain,
            score_total: score.total,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test::Question;

    fn question(q: &str, correct: &str, score: Option<i64>) -> Question {
        Question {
            q: q.to_string(),
            options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            correct: correct.to_string(),
            score,
        }
    }

    fn sample_test() -> Test {
        Test {
            id: "t1".to_string(),
            title: "Unit 1".to_string(),
            description: String::new(),
            subject: Some("informatics".to_string()),
            teacher_id: None,
            questions: vec![
                question("1 + 1", "A", None),
                question("2 + 2", "B", Some(5)),
                question("3 + 3", "C", Some(1)),
            ],
            time: Timestamp::Pending,
        }
    }

    fn answers(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_grade_perfect() {
        let record = grade(&sample_test(), &answers(&["A", "B", "C"]));
        assert_eq!(record.correct, 3);
        assert!(record.wrong_questions.is_empty());
        assert_eq!(record.score_gain, Some(8.0));
        assert_eq!(record.score_total, Some(8.0));
        assert_eq!(record.subject.as_deref(), Some("informatics"));
    }

    #[test]
    fn test_grade_records_wrong_answers() {
        let record = grade(&sample_test(), &answers(&["A", "C", "C"]));
        assert_eq!(record.correct, 2);
        assert_eq!(record.score_gain, Some(3.0));
        assert_eq!(record.wrong_questions.len(), 1);

        let wrong = &record.wrong_questions[0];
        assert_eq!(wrong.index, 1);
        assert_eq!(wrong.selected.as_deref(), Some("C"));
        assert_eq!(wrong.correct, "B");
    }

    #[test]
    fn test_grade_missing_answers_count_as_wrong() {
        let record = grade(&sample_test(), &answers(&["A"]));
        assert_eq!(record.correct, 1);
        assert_eq!(record.wrong_questions.len(), 2);
        assert_eq!(record.wrong_questions[1].selected, None);
        assert_eq!(record.score().to_string(), "2 / 8");
    }
}
