use serde::Serialize;

/// A grade row joined with its subject, as read for aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct GradeRow {
    pub student_id: i64,
    pub subject_id: i64,
    pub subject_name: String,
    pub value: i32,
    pub weight: f64,
}

/// A grade about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewGrade {
    pub value: i32,
    pub weight: f64,
    pub subject_id: i64,
    pub student_id: i64,
    pub teacher_id: i64,
}

/// The most recent grade of a student, with the teacher assigned to that
/// subject in the student's class
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LatestGrade {
    pub value: i32,
    pub subject_name: String,
    pub teacher_name: Option<String>,
}
