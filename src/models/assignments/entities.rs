use serde::{Deserialize, Serialize};

/// A teacher assigned to teach their subject in a class
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    pub id: i64,
    pub teacher_id: i64,
    pub class_id: i64,
    pub subject_id: i64,
}

pub const ASSIGNMENT_EXISTS: &str = "Assignment for this class and subject already exists.";
pub const TEACHER_NOT_QUALIFIED: &str = "Selected teacher does not teach the selected subject.";
