// src/results/scope.rs

use crate::models::{result::ResultRecord, subject::normalize_subject};
use crate::utils::jwt::{Claims, Role};

/// Scope that results without a subject belong to.
/// They were written before results carried a subject, when only this subject existed.
pub const LEGACY_SUBJECT: &str = "english";

/// The viewer whose scope decides which results are visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    SuperAdmin,
    Teacher { id: String, subject: String },
    Student { name: String },
}

impl Actor {
    pub fn from_claims(claims: &Claims) -> Self {
        match claims.role {
            Role::Admin => Actor::SuperAdmin,
            Role::Teacher => Actor::Teacher {
                id: claims.sub.clone(),
                subject: claims.subject.clone().unwrap_or_default(),
            },
            Role::Student => Actor::Student {
                name: claims.name.clone(),
            },
        }
    }

    pub fn is_staff(&self) -> bool {
        !matches!(self, Actor::Student { .. })
    }
}

/// Whether a record with `record_subject` falls under `subject`.
pub fn subject_matches(subject: &str, record_subject: Option<&str>) -> bool {
    let wanted = normalize_subject(subject);
    match record_subject {
        Some(s) => normalize_subject(s) == wanted,
        None => wanted == LEGACY_SUBJECT,
    }
}

pub fn is_visible(actor: &Actor, record: &ResultRecord) -> bool {
    match actor {
        Actor::SuperAdmin => true,
        Actor::Teacher { subject, .. } => subject_matches(subject, record.subject.as_deref()),
        Actor::Student { name } => record.student_name == *name,
    }
}

/// Restricts a collection to what `actor` may see, keeping input order.
pub fn scope_results(actor: &Actor, records: Vec<ResultRecord>) -> Vec<ResultRecord> {
    records
        .into_iter()
        .filter(|record| is_visible(actor, record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Timestamp;

    fn record(student: &str, subject: Option<&str>) -> ResultRecord {
        ResultRecord {
            id: format!("{}-{:?}", student, subject),
            student_name: student.to_string(),
            test_id: "t1".to_string(),
            test_title: "Unit 1".to_string(),
            subject: subject.map(str::to_string),
            correct: 0,
            score_gain: None,
            score_total: None,
            wrong_questions: Vec::new(),
            time: Timestamp::Pending,
        }
    }

    fn teacher(subject: &str) -> Actor {
        Actor::Teacher {
            id: "t".to_string(),
            subject: subject.to_string(),
        }
    }

    #[test]
    fn test_super_admin_sees_everything() {
        let records = vec![record("Ali", Some("informatics")), record("Vali", None)];
        assert_eq!(scope_results(&Actor::SuperAdmin, records).len(), 2);
    }

    #[test]
    fn test_teacher_sees_own_subject_only() {
        let records = vec![
            record("Ali", Some("informatics")),
            record("Vali", Some("english")),
            record("Sami", Some("Informatics ")),
        ];
        let visible = scope_results(&teacher("informatics"), records);
        let names: Vec<&str> = visible.iter().map(|r| r.student_name.as_str()).collect();
        assert_eq!(names, vec!["Ali", "Sami"]);
    }

    #[test]
    fn test_missing_subject_belongs_to_legacy_scope() {
        assert!(subject_matches(LEGACY_SUBJECT, None));
        assert!(subject_matches("English", None));
        assert!(!subject_matches("informatics", None));
    }

    #[test]
    fn test_student_sees_own_results() {
        let actor = Actor::Student {
            name: "Ali".to_string(),
        };
        assert!(is_visible(&actor, &record("Ali", Some("math"))));
        assert!(!is_visible(&actor, &record("Vali", Some("math"))));
        assert!(!actor.is_staff());
    }

    #[test]
    fn test_actor_from_claims() {
        let claims = Claims {
            sub: "42".to_string(),
            role: Role::Teacher,
            name: "Aziza Karimova".to_string(),
            subject: Some("math".to_string()),
            exp: 0,
        };
        assert_eq!(
            Actor::from_claims(&claims),
            Actor::Teacher {
                id: "42".to_string(),
                subject: "math".to_string(),
            }
        );
    }
}
