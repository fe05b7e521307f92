//! Rows of the read-only admin views

use sea_orm::FromQueryResult;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct UserViewRow {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub second_name: String,
    pub role: String,
    pub class_name: Option<String>,
    pub subject_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct SubjectViewRow {
    pub id: i64,
    pub name: String,
    pub teacher_count: i64,
    pub class_count: i64,
}

#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct ClassViewRow {
    pub id: i64,
    pub name: String,
    pub profile: String,
    pub student_count: i64,
}

#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct GradeViewRow {
    pub id: i64,
    pub student_first_name: String,
    pub student_second_name: String,
    pub class_name: String,
    pub subject_name: String,
    pub value: i32,
    pub weight: f64,
    pub teacher_first_name: String,
    pub teacher_second_name: String,
}

#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct AssignViewRow {
    pub id: i64,
    pub class_name: String,
    pub subject_name: String,
    pub teacher_first_name: String,
    pub teacher_second_name: String,
}

/// Everything shown on the admin panel
#[derive(Debug, Clone, Default, Serialize)]
pub struct AdminOverview {
    pub users: Vec<UserViewRow>,
    pub subjects: Vec<SubjectViewRow>,
    pub classes: Vec<ClassViewRow>,
    pub grades: Vec<GradeViewRow>,
    pub assigns: Vec<AssignViewRow>,
}
