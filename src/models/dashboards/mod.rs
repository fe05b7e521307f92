//! View models rendered by the dashboard templates.
//!
//! Averages are preformatted with two decimals so templates stay dumb.

pub mod requests;

use crate::models::classes::entities::Class;
use crate::models::grades::entities::LatestGrade;
use crate::models::subjects::entities::Subject;
use crate::models::users::entities::StudentSummary;
use serde::Serialize;

pub fn format_average(value: f64) -> String {
    format!("{value:.2}")
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentDashboard {
    pub student_name: String,
    pub class_name: String,
    pub class_profile: String,
    pub class_size: u64,
    /// Alphabetical
    pub subjects: Vec<Subject>,
    pub latest_grade: Option<LatestGrade>,
    pub overall_average: String,
    /// `None` until the student has a grade
    pub rank: Option<usize>,
    /// `data:` URI of the per-subject chart
    pub chart: String,
    pub selected: Option<SubjectSelection>,
}

/// Averages for the subject picked on the student dashboard
#[derive(Debug, Clone, Serialize)]
pub struct SubjectSelection {
    pub subject_id: i64,
    pub subject_name: String,
    pub student_average: String,
    pub class_average: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeacherDashboard {
    pub teacher_name: String,
    pub subject_name: Option<String>,
    /// Alphabetical
    pub classes: Vec<Class>,
    pub report: Option<ClassReport>,
}

/// Statistics for the class picked on the teacher dashboard
#[derive(Debug, Clone, Serialize)]
pub struct ClassReport {
    pub class_id: i64,
    pub class_name: String,
    pub class_average: String,
    /// Formatted value or the reason it could not be computed
    pub median: String,
    pub mode: String,
    pub roster: Vec<StudentSummary>,
    pub ranking: Vec<RankingEntry>,
    pub highest: Option<RankingEntry>,
    pub lowest: Option<RankingEntry>,
    pub chart: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankingEntry {
    pub position: usize,
    pub student_id: i64,
    pub name: String,
    pub average: String,
}
