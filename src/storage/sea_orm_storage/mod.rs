//! SeaORM storage implementation
//!
//! One storage layer for SQLite, PostgreSQL and MySQL.

mod admin;
mod assignments;
mod classes;
mod grades;
mod subjects;
mod users;

use crate::config::AppConfig;
use crate::errors::{GradebookError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        Migrator::up(&db, None)
            .await
            .map_err(|e| GradebookError::database_operation(format!("Migration failed: {e}")))?;

        info!("SeaORM storage ready, database: {}", db_url);

        Ok(Self { db })
    }

    /// Wraps an existing connection. Migrations must already be applied.
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// SQLite with WAL and pragma tuning
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| GradebookError::database_config(format!("Invalid SQLite URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| {
                GradebookError::database_connection(format!("SQLite connection failed: {e}"))
            })?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// PostgreSQL, MySQL
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt).await.map_err(|e| {
            GradebookError::database_connection(format!("Cannot connect to database: {e}"))
        })
    }

    /// Infers the backend from the URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(GradebookError::database_config(format!(
                "Cannot infer database type from URL: {url}. Supported: sqlite://, postgres://, mysql://, or a .db/.sqlite file path"
            )))
        }
    }
}

use crate::models::{
    admin::entities::AdminOverview,
    assignments::entities::Assignment,
    classes::entities::Class,
    grades::entities::{GradeRow, LatestGrade, NewGrade},
    subjects::entities::Subject,
    users::entities::{NewUser, StudentSummary, TeacherSummary, User},
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    async fn create_student(&self, user: NewUser, class_id: i64) -> Result<User> {
        self.create_student_impl(user, class_id).await
    }

    async fn create_teacher(&self, user: NewUser, subject_id: i64) -> Result<User> {
        self.create_teacher_impl(user, subject_id).await
    }

    async fn create_admin(&self, user: NewUser) -> Result<User> {
        self.create_admin_impl(user).await
    }

    async fn create_class(&self, name: &str, profile: &str) -> Result<Class> {
        self.create_class_impl(name, profile).await
    }

    async fn get_class_by_id(&self, class_id: i64) -> Result<Option<Class>> {
        self.get_class_by_id_impl(class_id).await
    }

    async fn get_class_by_name(&self, name: &str) -> Result<Option<Class>> {
        self.get_class_by_name_impl(name).await
    }

    async fn list_classes(&self) -> Result<Vec<Class>> {
        self.list_classes_impl().await
    }

    async fn get_student_class(&self, student_id: i64) -> Result<Option<Class>> {
        self.get_student_class_impl(student_id).await
    }

    async fn count_students_in_class(&self, class_id: i64) -> Result<u64> {
        self.count_students_in_class_impl(class_id).await
    }

    async fn list_students_in_class(&self, class_id: i64) -> Result<Vec<StudentSummary>> {
        self.list_students_in_class_impl(class_id).await
    }

    async fn create_subject(&self, name: &str) -> Result<Subject> {
        self.create_subject_impl(name).await
    }

    async fn get_subject_by_id(&self, subject_id: i64) -> Result<Option<Subject>> {
        self.get_subject_by_id_impl(subject_id).await
    }

    async fn get_subject_by_name(&self, name: &str) -> Result<Option<Subject>> {
        self.get_subject_by_name_impl(name).await
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>> {
        self.list_subjects_impl().await
    }

    async fn list_student_subjects(&self, student_id: i64) -> Result<Vec<Subject>> {
        self.list_student_subjects_impl(student_id).await
    }

    async fn get_teacher_subject(&self, teacher_id: i64) -> Result<Option<Subject>> {
        self.get_teacher_subject_impl(teacher_id).await
    }

    async fn list_qualified_teachers(&self, subject_id: i64) -> Result<Vec<TeacherSummary>> {
        self.list_qualified_teachers_impl(subject_id).await
    }

    async fn list_teacher_classes(&self, teacher_id: i64) -> Result<Vec<Class>> {
        self.list_teacher_classes_impl(teacher_id).await
    }

    async fn find_assignment(
        &self,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Option<Assignment>> {
        self.find_assignment_impl(class_id, subject_id).await
    }

    async fn create_assignment(
        &self,
        teacher_id: i64,
        class_id: i64,
        subject_id: i64,
    ) -> Result<Assignment> {
        self.create_assignment_impl(teacher_id, class_id, subject_id)
            .await
    }

    async fn insert_grades(&self, grades: Vec<NewGrade>) -> Result<u64> {
        self.insert_grades_impl(grades).await
    }

    async fn list_student_grades(
        &self,
        student_id: i64,
        subject_id: Option<i64>,
    ) -> Result<Vec<GradeRow>> {
        self.list_student_grades_impl(student_id, subject_id).await
    }

    async fn list_class_grades(
        &self,
        class_id: i64,
        subject_id: Option<i64>,
    ) -> Result<Vec<GradeRow>> {
        self.list_class_grades_impl(class_id, subject_id).await
    }

    async fn latest_student_grade(&self, student_id: i64) -> Result<Option<LatestGrade>> {
        self.latest_student_grade_impl(student_id).await
    }

    async fn admin_overview(&self) -> Result<AdminOverview> {
        self.admin_overview_impl().await
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    //! In-memory SQLite with migrations applied, plus a small school fixture.

    use super::*;
    use crate::models::users::entities::NewUser;

    pub async fn memory_storage() -> SeaOrmStorage {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        // every connection would get its own empty database
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.expect("connect in-memory sqlite");
        Migrator::up(&db, None).await.expect("run migrations");
        SeaOrmStorage::from_connection(db)
    }

    pub fn new_user(email: &str, first_name: &str, second_name: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            first_name: first_name.to_string(),
            second_name: second_name.to_string(),
            password_hash: "not-a-real-hash".to_string(),
        }
    }

    /// Ids created by [`school`]
    pub struct School {
        pub class_a: i64,
        pub class_b: i64,
        pub math: i64,
        pub physics: i64,
        pub math_teacher: i64,
        pub physics_teacher: i64,
        /// class A, alphabetical: Anna, Jan, Zofia
        pub anna: i64,
        pub jan: i64,
        pub zofia: i64,
        /// class B
        pub piotr: i64,
    }

    /// Two classes, two subjects, one teacher per subject assigned to class A,
    /// the math teacher also assigned to class B.
    pub async fn school(storage: &SeaOrmStorage) -> School {
        let class_a = storage.create_class("1A", "Mathematics").await.unwrap().id;
        let class_b = storage.create_class("1B", "Biology").await.unwrap().id;
        let math = storage.create_subject("Math").await.unwrap().id;
        let physics = storage.create_subject("Physics").await.unwrap().id;

        let math_teacher = storage
            .create_teacher(new_user("anna.kowalska@uw.edu.pl", "Anna", "Kowalska"), math)
            .await
            .unwrap()
            .id;
        let physics_teacher = storage
            .create_teacher(new_user("marek.lis@uw.edu.pl", "Marek", "Lis"), physics)
            .await
            .unwrap()
            .id;

        let zofia = storage
            .create_student(new_user("zofia@student.uw.edu.pl", "Zofia", "Wrona"), class_a)
            .await
            .unwrap()
            .id;
        let jan = storage
            .create_student(new_user("jan@student.uw.edu.pl", "Jan", "Nowak"), class_a)
            .await
            .unwrap()
            .id;
        let anna = storage
            .create_student(new_user("anna@student.uw.edu.pl", "Anna", "Mazur"), class_a)
            .await
            .unwrap()
            .id;
        let piotr = storage
            .create_student(new_user("piotr@student.uw.edu.pl", "Piotr", "Zając"), class_b)
            .await
            .unwrap()
            .id;

        storage
            .create_assignment(math_teacher, class_a, math)
            .await
            .unwrap();
        storage
            .create_assignment(physics_teacher, class_a, physics)
            .await
            .unwrap();
        storage
            .create_assignment(math_teacher, class_b, math)
            .await
            .unwrap();

        School {
            class_a,
            class_b,
            math,
            physics,
            math_teacher,
            physics_teacher,
            anna,
            jan,
            zofia,
            piotr,
        }
    }

    pub fn grade(value: i32, weight: f64, subject_id: i64, student_id: i64, teacher_id: i64) -> NewGrade {
        NewGrade {
            value,
            weight,
            subject_id,
            student_id,
            teacher_id,
        }
    }
}
