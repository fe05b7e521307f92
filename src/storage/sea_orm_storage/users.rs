//! User storage operations

use super::SeaOrmStorage;
use crate::entity::prelude::{Classes, StudentActiveModel, Subjects, TeacherActiveModel};
use crate::entity::users::{ActiveModel, Column, Entity as Users, Model};
use crate::errors::{GradebookError, Result};
use crate::models::users::entities::{EMAIL_EXISTS, NewUser, User, UserRole};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("Failed to query user: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("Failed to query user: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    pub async fn count_users_impl(&self) -> Result<u64> {
        let count = Users::find()
            .count(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("Failed to count users: {e}")))?;

        Ok(count)
    }

    pub async fn create_student_impl(&self, user: NewUser, class_id: i64) -> Result<User> {
        let txn = self.db.begin().await?;

        if Classes::find_by_id(class_id).one(&txn).await?.is_none() {
            return Err(GradebookError::not_found("Selected class does not exist."));
        }
        let model = insert_user(&txn, user, UserRole::Student).await?;
        StudentActiveModel {
            id: Set(model.id),
            class_id: Set(class_id),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(model.into_user())
    }

    pub async fn create_teacher_impl(&self, user: NewUser, subject_id: i64) -> Result<User> {
        let txn = self.db.begin().await?;

        if Subjects::find_by_id(subject_id).one(&txn).await?.is_none() {
            return Err(GradebookError::not_found("Selected subject does not exist."));
        }
        let model = insert_user(&txn, user, UserRole::Teacher).await?;
        TeacherActiveModel {
            id: Set(model.id),
            subject_id: Set(subject_id),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(model.into_user())
    }

    pub async fn create_admin_impl(&self, user: NewUser) -> Result<User> {
        let txn = self.db.begin().await?;
        let model = insert_user(&txn, user, UserRole::Admin).await?;
        txn.commit().await?;
        Ok(model.into_user())
    }
}

/// Inserts the user row after checking the email is free
async fn insert_user<C: ConnectionTrait>(conn: &C, user: NewUser, role: UserRole) -> Result<Model> {
    let taken = Users::find()
        .filter(Column::Email.eq(user.email.as_str()))
        .one(conn)
        .await?
        .is_some();
    if taken {
        return Err(GradebookError::conflict(EMAIL_EXISTS));
    }

    let model = ActiveModel {
        email: Set(user.email),
        first_name: Set(user.first_name),
        second_name: Set(user.second_name),
        password_hash: Set(user.password_hash),
        role: Set(role.to_string()),
        created_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    };

    model
        .insert(conn)
        .await
        .map_err(|e| GradebookError::database_operation(format!("Failed to create user: {e}")))
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{memory_storage, new_user};
    use crate::errors::GradebookError;
    use crate::models::users::entities::UserRole;
    use crate::storage::Storage;

    #[tokio::test]
    async fn test_create_student_writes_both_rows() {
        let storage = memory_storage().await;
        let class = storage.create_class("1A", "Mathematics").await.unwrap();

        let user = storage
            .create_student(new_user("jan@student.uw.edu.pl", "Jan", "Nowak"), class.id)
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::Student);
        assert_eq!(user.full_name(), "Jan Nowak");

        let found = storage
            .get_user_by_email("jan@student.uw.edu.pl")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(storage.get_student_class(user.id).await.unwrap(), Some(class));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let storage = memory_storage().await;
        let subject = storage.create_subject("Math").await.unwrap();
        storage
            .create_teacher(new_user("anna@uw.edu.pl", "Anna", "Kowalska"), subject.id)
            .await
            .unwrap();

        let err = storage
            .create_teacher(new_user("anna@uw.edu.pl", "Anna", "Nowak"), subject.id)
            .await
            .unwrap_err();
        assert!(matches!(err, GradebookError::Conflict(ref m) if m == "Email already exists."));
        assert_eq!(storage.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_class_leaves_no_user_row() {
        let storage = memory_storage().await;
        let err = storage
            .create_student(new_user("ola@student.uw.edu.pl", "Ola", "Lis"), 999)
            .await
            .unwrap_err();
        assert!(matches!(err, GradebookError::NotFound(_)));
        assert_eq!(storage.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_teacher_subject() {
        let storage = memory_storage().await;
        let subject = storage.create_subject("Physics").await.unwrap();
        let teacher = storage
            .create_teacher(new_user("marek@uw.edu.pl", "Marek", "Lis"), subject.id)
            .await
            .unwrap();
        assert_eq!(
            storage.get_teacher_subject(teacher.id).await.unwrap(),
            Some(subject)
        );

        let admin = storage
            .create_admin(new_user("admin@uw.edu.pl", "Admin", "Admin"))
            .await
            .unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        assert_eq!(storage.get_teacher_subject(admin.id).await.unwrap(), None);
    }
}
