use std::sync::Arc;

use crate::errors::Result;
use crate::models::{
    admin::entities::AdminOverview,
    assignments::entities::Assignment,
    classes::entities::Class,
    grades::entities::{GradeRow, LatestGrade, NewGrade},
    subjects::entities::Subject,
    users::entities::{NewUser, StudentSummary, TeacherSummary, User},
};

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// Users
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn count_users(&self) -> Result<u64>;
    // User row and student row in one transaction
    async fn create_student(&self, user: NewUser, class_id: i64) -> Result<User>;
    // User row and teacher row in one transaction
    async fn create_teacher(&self, user: NewUser, subject_id: i64) -> Result<User>;
    async fn create_admin(&self, user: NewUser) -> Result<User>;

    /// Classes
    async fn create_class(&self, name: &str, profile: &str) -> Result<Class>;
    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>>;
    async fn get_class_by_name(&self, name: &str) -> Result<Option<Class>>;
    async fn list_classes(&self) -> Result<Vec<Class>>;
    async fn get_student_class(&self, student_id: i64) -> Result<Option<Class>>;
    async fn count_students_in_class(&self, class_id: i64) -> Result<u64>;
    // Alphabetical by first name
    async fn list_students_in_class(&self, class_id: i64) -> Result<Vec<StudentSummary>>;

    /// Subjects
    async fn create_subject(&self, name: &str) -> Result<Subject>;
    async fn get_subject_by_id(&self, subject_id: i64) -> Result<Option<Subject>>;
    async fn get_subject_by_name(&self, name: &str) -> Result<Option<Subject>>;
    async fn list_subjects(&self) -> Result<Vec<Subject>>;
    // Subjects taught in the student's class, alphabetical
    async fn list_student_subjects(&self, student_id: i64) -> Result<Vec<Subject>>;

    /// Teachers and assignments
    async fn get_teacher_subject(&self, teacher_id: i64) -> Result<Option<Subject>>;
    async fn list_qualified_teachers(&self, subject_id: i64) -> Result<Vec<TeacherSummary>>;
    // Classes the teacher is assigned to, alphabetical
    async fn list_teacher_classes(&self, teacher_id: i64) -> Result<Vec<Class>>;
    async fn find_assignment(&self, class_id: i64, subject_id: i64)
    -> Result<Option<Assignment>>;
    // Re-checks the pair and the teacher's subject inside the transaction
    async fn create_assignment(
        &self,
        teacher_id: i64,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Assignment>;

    /// Grades
    // All rows in one transaction, returns the number inserted
    async fn insert_grades(&self, grades: Vec<NewGrade>) -> Result<u64>;
    async fn list_student_grades(
        &self,
        student_id: i64,
        subject_id: Option<i64>,
    ) -> Result<Vec<GradeRow>>;
    async fn list_class_grades(
        &self,
        class_id: i64,
        subject_id: Option<i64>,
    ) -> Result<Vec<GradeRow>>;
    async fn latest_student_grade(&self, student_id: i64) -> Result<Option<LatestGrade>>;

    /// Admin views
    async fn admin_overview(&self) -> Result<AdminOverview>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
