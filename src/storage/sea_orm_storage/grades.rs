//! Grade storage operations. Grades are only ever inserted.

use super::SeaOrmStorage;
use crate::entity::grades::{ActiveModel, Column, Entity as Grades};
use crate::entity::prelude::{Students, Subjects, TeacherClasses, Users};
use crate::entity::{students, subjects, teacher_classes};
use crate::errors::{GradebookError, Result};
use crate::models::grades::entities::{GradeRow, LatestGrade, NewGrade};
use sea_orm::{
    ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};

type GradeTuple = (i64, i64, String, i32, f64);

/// Selects the columns of a [`GradeRow`]
fn grade_rows(select: Select<Grades>) -> sea_orm::Selector<sea_orm::SelectGetableTuple<GradeTuple>> {
    select
        .inner_join(Subjects)
        .select_only()
        .column(Column::StudentId)
        .column(Column::SubjectId)
        .column(subjects::Column::Name)
        .column(Column::Value)
        .column(Column::Weight)
        .order_by_asc(Column::Id)
        .into_tuple()
}

fn into_grade_row((student_id, subject_id, subject_name, value, weight): GradeTuple) -> GradeRow {
    GradeRow {
        student_id,
        subject_id,
        subject_name,
        value,
        weight,
    }
}

impl SeaOrmStorage {
    pub async fn insert_grades_impl(&self, grades: Vec<NewGrade>) -> Result<u64> {
        if grades.is_empty() {
            return Ok(0);
        }
        let count = grades.len() as u64;
        let now = chrono::Utc::now().timestamp();

        let models = grades.into_iter().map(|grade| ActiveModel {
            value: Set(grade.value),
            weight: Set(grade.weight),
            subject_id: Set(grade.subject_id),
            student_id: Set(grade.student_id),
            teacher_id: Set(grade.teacher_id),
            created_at: Set(now),
            ..Default::default()
        });

        let txn = self.db.begin().await?;
        Grades::insert_many(models)
            .exec(&txn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("Failed to insert grades: {e}")))?;
        txn.commit().await?;

        Ok(count)
    }

    pub async fn list_student_grades_impl(
        &self,
        student_id: i64,
        subject_id: Option<i64>,
    ) -> Result<Vec<GradeRow>> {
        let mut select = Grades::find().filter(Column::StudentId.eq(student_id));
        if let Some(subject_id) = subject_id {
            select = select.filter(Column::SubjectId.eq(subject_id));
        }

        let rows = grade_rows(select).all(&self.db).await.map_err(|e| {
            GradebookError::database_operation(format!("Failed to list student grades: {e}"))
        })?;

        Ok(rows.into_iter().map(into_grade_row).collect())
    }

    pub async fn list_class_grades_impl(
        &self,
        class_id: i64,
        subject_id: Option<i64>,
    ) -> Result<Vec<GradeRow>> {
        let mut select = Grades::find()
            .inner_join(Students)
            .filter(students::Column::ClassId.eq(class_id));
        if let Some(subject_id) = subject_id {
            select = select.filter(Column::SubjectId.eq(subject_id));
        }

        let rows = grade_rows(select).all(&self.db).await.map_err(|e| {
            GradebookError::database_operation(format!("Failed to list class grades: {e}"))
        })?;

        Ok(rows.into_iter().map(into_grade_row).collect())
    }

    pub async fn latest_student_grade_impl(&self, student_id: i64) -> Result<Option<LatestGrade>> {
        let Some(grade) = Grades::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::Id)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let subject_name = Subjects::find_by_id(grade.subject_id)
            .one(&self.db)
            .await?
            .map(|s| s.name)
            .unwrap_or_default();

        // the teacher assigned to this subject in the student's class
        let teacher_name = match self.get_student_class_impl(student_id).await? {
            Some(class) => {
                let assignment = TeacherClasses::find()
                    .filter(teacher_classes::Column::ClassId.eq(class.id))
                    .filter(teacher_classes::Column::SubjectId.eq(grade.subject_id))
                    .one(&self.db)
                    .await?;
                match assignment {
                    Some(assignment) => Users::find_by_id(assignment.teacher_id)
                        .one(&self.db)
                        .await?
                        .map(|u| format!("{} {}", u.first_name, u.second_name)),
                    None => None,
                }
            }
            None => None,
        };

        Ok(Some(LatestGrade {
            value: grade.value,
            subject_name,
            teacher_name,
        }))
    }
}
