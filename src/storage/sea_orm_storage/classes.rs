//! Class storage operations

use super::SeaOrmStorage;
use crate::entity::classes::{ActiveModel, Column, Entity as Classes};
use crate::entity::prelude::{Students, TeacherClasses, Users};
use crate::entity::{students, teacher_classes, users};
use crate::errors::{GradebookError, Result};
use crate::models::{classes::entities::Class, users::entities::StudentSummary};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    pub async fn create_class_impl(&self, name: &str, profile: &str) -> Result<Class> {
        let model = ActiveModel {
            name: Set(name.to_string()),
            profile: Set(profile.to_string()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("Failed to create class: {e}")))?;

        Ok(result.into_class())
    }

    pub async fn get_class_by_id_impl(&self, class_id: i64) -> Result<Option<Class>> {
        let result = Classes::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("Failed to query class: {e}")))?;

        Ok(result.map(|m| m.into_class()))
    }

    pub async fn get_class_by_name_impl(&self, name: &str) -> Result<Option<Class>> {
        let result = Classes::find()
            .filter(Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("Failed to query class: {e}")))?;

        Ok(result.map(|m| m.into_class()))
    }

    pub async fn list_classes_impl(&self) -> Result<Vec<Class>> {
        let classes = Classes::find()
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("Failed to list classes: {e}")))?;

        Ok(classes.into_iter().map(|m| m.into_class()).collect())
    }

    pub async fn get_student_class_impl(&self, student_id: i64) -> Result<Option<Class>> {
        let result = Classes::find()
            .inner_join(Students)
            .filter(students::Column::Id.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| {
                GradebookError::database_operation(format!("Failed to query student class: {e}"))
            })?;

        Ok(result.map(|m| m.into_class()))
    }

    pub async fn count_students_in_class_impl(&self, class_id: i64) -> Result<u64> {
        let count = Students::find()
            .filter(students::Column::ClassId.eq(class_id))
            .count(&self.db)
            .await
            .map_err(|e| {
                GradebookError::database_operation(format!("Failed to count students: {e}"))
            })?;

        Ok(count)
    }

    pub async fn list_students_in_class_impl(&self, class_id: i64) -> Result<Vec<StudentSummary>> {
        let rows: Vec<(i64, String, String)> = Users::find()
            .inner_join(Students)
            .filter(students::Column::ClassId.eq(class_id))
            .select_only()
            .column(users::Column::Id)
            .column(users::Column::FirstName)
            .column(users::Column::SecondName)
            .order_by_asc(users::Column::FirstName)
            .order_by_asc(users::Column::SecondName)
            .order_by_asc(users::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| {
                GradebookError::database_operation(format!("Failed to list students: {e}"))
            })?;

        Ok(rows
            .into_iter()
            .map(|(id, first_name, second_name)| StudentSummary {
                id,
                first_name,
                second_name,
            })
            .collect())
    }

    pub async fn list_teacher_classes_impl(&self, teacher_id: i64) -> Result<Vec<Class>> {
        let classes = Classes::find()
            .inner_join(TeacherClasses)
            .filter(teacher_classes::Column::TeacherId.eq(teacher_id))
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| {
                GradebookError::database_operation(format!("Failed to list taught classes: {e}"))
            })?;

        Ok(classes.into_iter().map(|m| m.into_class()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{memory_storage, school};
    use crate::storage::Storage;

    #[tokio::test]
    async fn test_roster_is_alphabetical() {
        let storage = memory_storage().await;
        let school = school(&storage).await;

        let roster = storage.list_students_in_class(school.class_a).await.unwrap();
        let names: Vec<String> = roster.iter().map(|s| s.full_name()).collect();
        assert_eq!(names, vec!["Anna Mazur", "Jan Nowak", "Zofia Wrona"]);
        assert_eq!(storage.count_students_in_class(school.class_a).await.unwrap(), 3);
        assert_eq!(storage.count_students_in_class(school.class_b).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_teacher_classes() {
        let storage = memory_storage().await;
        let school = school(&storage).await;

        let names: Vec<String> = storage
            .list_teacher_classes(school.math_teacher)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["1A", "1B"]);

        let physics = storage
            .list_teacher_classes(school.physics_teacher)
            .await
            .unwrap();
        assert_eq!(physics.len(), 1);
    }

    #[tokio::test]
    async fn test_class_lookup() {
        let storage = memory_storage().await;
        let school = school(&storage).await;

        let class = storage.get_class_by_name("1B").await.unwrap().unwrap();
        assert_eq!(class.id, school.class_b);
        assert_eq!(class.profile, "Biology");
        assert!(storage.get_class_by_name("9Z").await.unwrap().is_none());
        assert_eq!(storage.list_classes().await.unwrap().len(), 2);
    }
}
