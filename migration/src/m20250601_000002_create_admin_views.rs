use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Read-only views shown on the admin panel, in creation order.
const VIEWS: &[(&str, &str)] = &[
    (
        "vw_users",
        "SELECT u.id AS id, u.email AS email, u.first_name AS first_name, \
                u.second_name AS second_name, u.role AS role, \
                c.name AS class_name, s.name AS subject_name \
         FROM users u \
         LEFT JOIN students st ON st.id = u.id \
         LEFT JOIN classes c ON c.id = st.class_id \
         LEFT JOIN teachers t ON t.id = u.id \
         LEFT JOIN subjects s ON s.id = t.subject_id",
    ),
    (
        "vw_subjects",
        "SELECT s.id AS id, s.name AS name, \
                COUNT(DISTINCT t.id) AS teacher_count, \
                COUNT(DISTINCT tc.class_id) AS class_count \
         FROM subjects s \
         LEFT JOIN teachers t ON t.subject_id = s.id \
         LEFT JOIN teacher_classes tc ON tc.subject_id = s.id \
         GROUP BY s.id, s.name",
    ),
    (
        "vw_classes",
        "SELECT c.id AS id, c.name AS name, c.profile AS profile, \
                COUNT(st.id) AS student_count \
         FROM classes c \
         LEFT JOIN students st ON st.class_id = c.id \
         GROUP BY c.id, c.name, c.profile",
    ),
    (
        "vw_grades",
        "SELECT g.id AS id, su.first_name AS student_first_name, \
                su.second_name AS student_second_name, c.name AS class_name, \
                s.name AS subject_name, g.value AS value, g.weight AS weight, \
                tu.first_name AS teacher_first_name, tu.second_name AS teacher_second_name \
         FROM grades g \
         JOIN users su ON su.id = g.student_id \
         JOIN students st ON st.id = g.student_id \
         JOIN classes c ON c.id = st.class_id \
         JOIN subjects s ON s.id = g.subject_id \
         JOIN users tu ON tu.id = g.teacher_id",
    ),
    (
        "vw_assigns",
        "SELECT tc.id AS id, c.name AS class_name, s.name AS subject_name, \
                u.first_name AS teacher_first_name, u.second_name AS teacher_second_name \
         FROM teacher_classes tc \
         JOIN classes c ON c.id = tc.class_id \
         JOIN subjects s ON s.id = tc.subject_id \
         JOIN users u ON u.id = tc.teacher_id",
    ),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for (name, query) in VIEWS {
            db.execute_unprepared(&format!("DROP VIEW IF EXISTS {name}"))
                .await?;
            db.execute_unprepared(&format!("CREATE VIEW {name} AS {query}"))
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for (name, _) in VIEWS.iter().rev() {
            db.execute_unprepared(&format!("DROP VIEW IF EXISTS {name}"))
                .await?;
        }
        Ok(())
    }
}
