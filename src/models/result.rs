// src/models/result.rs

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::store::Timestamp;

/// Points a question is worth when the record carries no stored score.
pub const POINTS_PER_QUESTION: f64 = 2.0;

/// One submission of a test by a student, stored in the `results` collection.
/// Written once, never updated; only deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub test_id: String,
    #[serde(default)]
    pub test_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default)]
    pub correct: u32,
    /// Older records may not carry precomputed scores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_total: Option<f64>,
    #[serde(default)]
    pub wrong_questions: Vec<WrongAnswer>,
    #[serde(default)]
    pub time: Timestamp,
}

/// An incorrectly answered question inside a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrongAnswer {
    /// 0-based question position.
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub selected: Option<String>,
    #[serde(default)]
    pub correct: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// Score of a result with the defaults for missing fields already applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    #[serde(serialize_with = "serialize_points")]
    pub gain: f64,
    #[serde(serialize_with = "serialize_points")]
    pub total: f64,
    pub wrong_count: u32,
}

impl fmt::Display for ScoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", format_points(self.gain), format_points(self.total))
    }
}

/// Formats points the way they were entered: `6`, not `6.0`; `6.5` stays `6.5`.
pub fn format_points(points: f64) -> String {
    if points.fract() == 0.0 && points.abs() < i64::MAX as f64 {
        (points as i64).to_string()
    } else {
        points.to_string()
    }
}

/// Writes whole points as JSON integers.
pub fn serialize_points<S: Serializer>(points: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if points.fract() == 0.0 && points.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*points as i64)
    } else {
        serializer.serialize_f64(*points)
    }
}

impl ResultRecord {
    pub fn wrong_count(&self) -> u32 {
        self.wrong_questions.len() as u32
    }

    /// The only place the score defaults are derived.
    pub fn score(&self) -> ScoreSummary {
        let wrong_count = self.wrong_count();
        let correct = f64::from(self.correct);
        ScoreSummary {
            gain: self
                .score_gain
                .unwrap_or(correct * POINTS_PER_QUESTION),
            total: self
                .score_total
                .unwrap_or((correct + f64::from(wrong_count)) * POINTS_PER_QUESTION),
            wrong_count,
        }
    }

    /// Title for display; falls back to the test id for untitled records.
    pub fn display_title(&self) -> &str {
        if self.test_title.is_empty() {
            &self.test_id
        } else {
            &self.test_title
        }
    }
}

/// Row of the results table.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    pub id: String,
    pub student_name: String,
    pub test_id: String,
    pub test_title: String,
    pub subject: Option<String>,
    pub correct: u32,
    pub wrong_count: u32,
    #[serde(serialize_with = "serialize_points")]
    pub score_gain: f64,
    #[serde(serialize_with = "serialize_points")]
    pub score_total: f64,
    /// Preformatted "gain / total".
    pub score: String,
    pub time: Timestamp,
}

impl From<&ResultRecord> for ResultView {
    fn from(record: &ResultRecord) -> Self {
        let score = record.score();
        ResultView {
            id: record.id.clone(),
            student_name: record.student_name.clone(),
            test_id: record.test_id.clone(),
            test_title: record.display_title().to_string(),
            subject: record.subject.clone(),
            correct: record.correct,
            wrong_count: score.wrong_count,
            score_gain: score.gain,
            score_total: score.total,
            score: score.to_string(),
            time: record.time,
        }
    }
}

/// Detail view of a single result, including the wrong answers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultDetail {
    #[serde(flatten)]
    pub summary: ResultView,
    pub wrong_questions: Vec<WrongAnswer>,
}

impl From<&ResultRecord> for ResultDetail {
    fn from(record: &ResultRecord) -> Self {
        ResultDetail {
            summary: ResultView::from(record),
            wrong_questions: record.wrong_questions.clone(),
        }
    }
}

/// One session of the grouped results table.
#[derive(Debug, Serialize)]
pub struct SessionGroupView {
    /// 1 for the oldest session.
    pub number: usize,
    pub results: Vec<ResultView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_defaults() {
        let record: ResultRecord = serde_json::from_value(serde_json::json!({
            "studentName": "Ali",
            "correct": 3,
            "wrongQuestions": [{"q": "q1", "correct": "A"}, {"index": 4, "correct": "B"}]
        }))
        .unwrap();

        assert_eq!(record.wrong_questions[0].index, 0);
        assert_eq!(record.score().to_string(), "6 / 10");
    }

    #[test]
    fn test_fractional_scores_are_kept() {
        let record: ResultRecord = serde_json::from_value(serde_json::json!({
            "studentName": "Ali",
            "correct": 3,
            "scoreGain": 6.5,
            "scoreTotal": 10
        }))
        .unwrap();

        assert_eq!(record.score().to_string(), "6.5 / 10");
        let view = serde_json::to_value(ResultView::from(&record)).unwrap();
        assert_eq!(view["scoreGain"], 6.5);
        assert_eq!(view["scoreTotal"], 10);
    }
}
