//! Admin panel views

use super::SeaOrmStorage;
use crate::errors::Result;
use crate::models::admin::entities::{
    AdminOverview, AssignViewRow, ClassViewRow, GradeViewRow, SubjectViewRow, UserViewRow,
};
use sea_orm::{FromQueryResult, Statement};

impl SeaOrmStorage {
    async fn read_view<T: FromQueryResult>(&self, sql: &str) -> Result<Vec<T>> {
        let backend = self.db.get_database_backend();
        let rows = T::find_by_statement(Statement::from_string(backend, sql.to_string()))
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    pub async fn admin_overview_impl(&self) -> Result<AdminOverview> {
        Ok(AdminOverview {
            users: self.read_view::<UserViewRow>("SELECT * FROM vw_users ORDER BY id").await?,
            subjects: self
                .read_view::<SubjectViewRow>("SELECT * FROM vw_subjects ORDER BY name")
                .await?,
            classes: self
                .read_view::<ClassViewRow>("SELECT * FROM vw_classes ORDER BY name")
                .await?,
            grades: self
                .read_view::<GradeViewRow>("SELECT * FROM vw_grades ORDER BY id")
                .await?,
            assigns: self
                .read_view::<AssignViewRow>("SELECT * FROM vw_assigns ORDER BY id")
                .await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{grade, memory_storage, new_user, school};
    use crate::storage::Storage;

    #[tokio::test]
    async fn test_views_reflect_the_school() {
        let storage = memory_storage().await;
        let s = school(&storage).await;
        storage
            .create_admin(new_user("admin@uw.edu.pl", "Admin", "Root"))
            .await
            .unwrap();
        storage
            .insert_grades(vec![grade(4, 0.5, s.math, s.jan, s.math_teacher)])
            .await
            .unwrap();

        let overview = storage.admin_overview().await.unwrap();
        assert_eq!(overview.users.len(), 7);

        let jan = overview.users.iter().find(|u| u.id == s.jan).unwrap();
        assert_eq!(jan.class_name.as_deref(), Some("1A"));
        assert_eq!(jan.subject_name, None);

        let math = overview.subjects.iter().find(|r| r.name == "Math").unwrap();
        assert_eq!(math.teacher_count, 1);
        assert_eq!(math.class_count, 2);

        let class_a = overview.classes.iter().find(|c| c.name == "1A").unwrap();
        assert_eq!(class_a.student_count, 3);

        assert_eq!(overview.grades.len(), 1);
        assert_eq!(overview.grades[0].teacher_second_name, "Kowalska");
        assert_eq!(overview.grades[0].weight, 0.5);

        assert_eq!(overview.assigns.len(), 3);
    }
}
