// src/results/export.rs

use chrono::{DateTime, Utc};

use crate::models::result::{ResultRecord, format_points};

/// Byte-order mark so spreadsheet tools detect UTF-8.
pub const BOM: char = '\u{feff}';

pub const HEADERS: [&str; 7] = [
    "studentName",
    "testTitle",
    "correct",
    "wrongCount",
    "scoreGain",
    "scoreTotal",
    "time",
];

/// Renders results as a comma-separated table, one row per record in input order.
pub fn to_csv(records: &[ResultRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(HEADERS.join(","));

    for record in records {
        let score = record.score();
        let fields = [
            record.student_name.clone(),
            record.test_title.clone(),
            record.correct.to_string(),
            score.wrong_count.to_string(),
            format_points(score.gain),
            format_points(score.total),
            record.time.to_iso().unwrap_or_default(),
        ];
        let row: Vec<String> = fields.iter().map(|f| escape_csv(f)).collect();
        lines.push(row.join(","));
    }

    let mut out = String::new();
    out.push(BOM);
    out.push_str(&lines.join("\n"));
    out
}

fn escape_csv(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// `results_2024-05-01-08-00-00.csv`
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("results_{}.csv", now.format("%Y-%m-%d-%H-%M-%S"))
}

/// `results_group_3.csv`
pub fn group_export_filename(number: usize) -> String {
    format!("results_group_{}.csv", number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::result::WrongAnswer;
    use crate::store::Timestamp;

    fn wrong(index: u32) -> WrongAnswer {
        WrongAnswer {
            index,
            q: format!("Question {}", index),
            selected: Some("B".to_string()),
            correct: "A".to_string(),
            options: Vec::new(),
        }
    }

    fn record(student: &str, title: &str) -> ResultRecord {
        ResultRecord {
            id: "r1".to_string(),
            student_name: student.to_string(),
            test_id: "t1".to_string(),
            test_title: title.to_string(),
            subject: None,
            correct: 3,
            score_gain: None,
            score_total: None,
            wrong_questions: vec![wrong(0), wrong(4)],
            time: Timestamp::Committed(DateTime::from_timestamp(1_714_550_400, 0).unwrap()),
        }
    }

    #[test]
    fn test_empty_export_is_bom_and_header() {
        let csv = to_csv(&[]);
        assert_eq!(
            csv,
            "\u{feff}studentName,testTitle,correct,wrongCount,scoreGain,scoreTotal,time"
        );
    }

    #[test]
    fn test_missing_scores_use_defaults() {
        let csv = to_csv(&[record("Ali Valiyev", "Unit 1")]);
        let rows: Vec<&str> = csv.split('\n').collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], "Ali Valiyev,Unit 1,3,2,6,10,2024-05-01T08:00:00.000Z");
    }

    #[test]
    fn test_stored_scores_win_over_defaults() {
        let mut r = record("Ali", "Unit 1");
        r.score_gain = Some(9.0);
        r.score_total = Some(15.0);
        let csv = to_csv(&[r]);
        assert!(csv.ends_with("Ali,Unit 1,3,2,9,15,2024-05-01T08:00:00.000Z"));
    }

    #[test]
    fn test_fractional_scores_export_as_entered() {
        let mut r = record("Ali", "Unit 1");
        r.score_gain = Some(6.5);
        let csv = to_csv(&[r]);
        assert!(csv.ends_with("Ali,Unit 1,3,2,6.5,10,2024-05-01T08:00:00.000Z"));
    }

    #[test]
    fn test_comma_in_field_is_quoted() {
        let csv = to_csv(&[record("Valiyev, Ali", "Unit 1")]);
        assert!(csv.contains("\n\"Valiyev, Ali\",Unit 1,"));
    }

    #[test]
    fn test_quotes_are_doubled() {
        let csv = to_csv(&[record("Ali", "The \"Hard\" One")]);
        assert!(csv.contains(",\"The \"\"Hard\"\" One\","));
    }

    #[test]
    fn test_newline_in_field_is_quoted() {
        let csv = to_csv(&[record("Ali", "Line 1\nLine 2")]);
        assert!(csv.contains(",\"Line 1\nLine 2\","));
    }

    #[test]
    fn test_pending_time_exports_empty() {
        let mut r = record("Ali", "Unit 1");
        r.time = Timestamp::Pending;
        let csv = to_csv(&[r]);
        assert!(csv.ends_with("Ali,Unit 1,3,2,6,10,"));
    }

    #[test]
    fn test_rows_keep_input_order() {
        let csv = to_csv(&[record("B", "x"), record("A", "x")]);
        let students: Vec<&str> = csv
            .split('\n')
            .skip(1)
            .map(|row| row.split(',').next().unwrap())
            .collect();
        assert_eq!(students, vec!["B", "A"]);
    }

    #[test]
    fn test_export_filenames() {
        let at = DateTime::from_timestamp(1_714_550_400, 0).unwrap();
        assert_eq!(export_filename(at), "results_2024-05-01-08-00-00.csv");
        assert_eq!(group_export_filename(3), "results_group_3.csv");
    }
}
