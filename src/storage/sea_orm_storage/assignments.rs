//! Teacher to class assignment storage operations

use super::SeaOrmStorage;
use crate::entity::prelude::{Classes, Subjects, Teachers};
use crate::entity::teacher_classes::{ActiveModel, Column, Entity as TeacherClasses};
use crate::errors::{GradebookError, Result};
use crate::models::assignments::entities::{
    ASSIGNMENT_EXISTS, Assignment, TEACHER_NOT_QUALIFIED,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, SqlErr, TransactionTrait,
};

impl SeaOrmStorage {
    pub async fn find_assignment_impl(
        &self,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Option<Assignment>> {
        let result = TeacherClasses::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::SubjectId.eq(subject_id))
            .one(&self.db)
            .await
            .map_err(|e| {
                GradebookError::database_operation(format!("Failed to query assignment: {e}"))
            })?;

        Ok(result.map(|m| m.into_assignment()))
    }

    pub async fn create_assignment_impl(
        &self,
        teacher_id: i64,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Assignment> {
        let txn = self.db.begin().await?;

        if Classes::find_by_id(class_id).one(&txn).await?.is_none() {
            return Err(GradebookError::not_found("Selected class does not exist."));
        }
        if Subjects::find_by_id(subject_id).one(&txn).await?.is_none() {
            return Err(GradebookError::not_found("Selected subject does not exist."));
        }

        let existing = TeacherClasses::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::SubjectId.eq(subject_id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(GradebookError::conflict(ASSIGNMENT_EXISTS));
        }

        let qualified = Teachers::find_by_id(teacher_id)
            .one(&txn)
            .await?
            .is_some_and(|teacher| teacher.subject_id == subject_id);
        if !qualified {
            return Err(GradebookError::validation(TEACHER_NOT_QUALIFIED));
        }

        let model = ActiveModel {
            teacher_id: Set(teacher_id),
            class_id: Set(class_id),
            subject_id: Set(subject_id),
            ..Default::default()
        };
        // the unique index catches a concurrent insert for the same pair
        let result = model.insert(&txn).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => GradebookError::conflict(ASSIGNMENT_EXISTS),
            _ => GradebookError::database_operation(format!("Failed to create assignment: {e}")),
        })?;

        txn.commit().await?;
        Ok(result.into_assignment())
    }
}
