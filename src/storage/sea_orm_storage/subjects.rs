//! Subject storage operations

use super::SeaOrmStorage;
use crate::entity::prelude::{TeacherClasses, Teachers, Users};
use crate::entity::subjects::{ActiveModel, Column, Entity as Subjects};
use crate::entity::{teacher_classes, teachers, users};
use crate::errors::{GradebookError, Result};
use crate::models::subjects::entities::{SUBJECT_EXISTS, Subject};
use crate::models::users::entities::TeacherSummary;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    SqlErr,
};

impl SeaOrmStorage {
    pub async fn create_subject_impl(&self, name: &str) -> Result<Subject> {
        let model = ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => GradebookError::conflict(SUBJECT_EXISTS),
            _ => GradebookError::database_operation(format!("Failed to create subject: {e}")),
        })?;

        Ok(result.into_subject())
    }

    pub async fn get_subject_by_id_impl(&self, subject_id: i64) -> Result<Option<Subject>> {
        let result = Subjects::find_by_id(subject_id)
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("Failed to query subject: {e}")))?;

        Ok(result.map(|m| m.into_subject()))
    }

    pub async fn get_subject_by_name_impl(&self, name: &str) -> Result<Option<Subject>> {
        let result = Subjects::find()
            .filter(Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("Failed to query subject: {e}")))?;

        Ok(result.map(|m| m.into_subject()))
    }

    pub async fn list_subjects_impl(&self) -> Result<Vec<Subject>> {
        let subjects = Subjects::find()
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("Failed to list subjects: {e}")))?;

        Ok(subjects.into_iter().map(|m| m.into_subject()).collect())
    }

    pub async fn list_student_subjects_impl(&self, student_id: i64) -> Result<Vec<Subject>> {
        let Some(class) = self.get_student_class_impl(student_id).await? else {
            return Ok(Vec::new());
        };

        let subjects = Subjects::find()
            .inner_join(TeacherClasses)
            .filter(teacher_classes::Column::ClassId.eq(class.id))
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| {
                GradebookError::database_operation(format!("Failed to list student subjects: {e}"))
            })?;

        Ok(subjects.into_iter().map(|m| m.into_subject()).collect())
    }

    pub async fn get_teacher_subject_impl(&self, teacher_id: i64) -> Result<Option<Subject>> {
        let result = Subjects::find()
            .inner_join(Teachers)
            .filter(teachers::Column::Id.eq(teacher_id))
            .one(&self.db)
            .await
            .map_err(|e| {
                GradebookError::database_operation(format!("Failed to query teacher subject: {e}"))
            })?;

        Ok(result.map(|m| m.into_subject()))
    }

    pub async fn list_qualified_teachers_impl(
        &self,
        subject_id: i64,
    ) -> Result<Vec<TeacherSummary>> {
        let rows: Vec<(i64, String, String, String, i64)> = Users::find()
            .inner_join(Teachers)
            .filter(teachers::Column::SubjectId.eq(subject_id))
            .select_only()
            .column(users::Column::Id)
            .column(users::Column::FirstName)
            .column(users::Column::SecondName)
            .column(users::Column::Email)
            .column(teachers::Column::SubjectId)
            .order_by_asc(users::Column::SecondName)
            .order_by_asc(users::Column::FirstName)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| {
                GradebookError::database_operation(format!("Failed to list teachers: {e}"))
            })?;

        Ok(rows
            .into_iter()
            .map(
                |(id, first_name, second_name, email, subject_id)| TeacherSummary {
                    id,
                    first_name,
                    second_name,
                    email,
                    subject_id,
                },
            )
            .collect())
    }
}
