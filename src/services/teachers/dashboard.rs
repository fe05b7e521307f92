use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, error::ErrorUnauthorized};
use minijinja::context;
use std::collections::HashMap;
use tracing::error;

use super::TeacherService;
use crate::charts::{BarChart, Orientation};
use crate::errors::{GradebookError, Result};
use crate::grading::{averages_by_key, class_statistics, rank, weighted_average};
use crate::models::classes::entities::Class;
use crate::models::dashboards::{ClassReport, RankingEntry, TeacherDashboard, format_average};
use crate::services::parse_id;
use crate::session::Principal;
use crate::storage::Storage;
use crate::views::{self, Flash};

pub const CLASS_NOT_TAUGHT: &str = "You do not teach the selected class.";

/// Upper bound of the ranking chart, just above the best grade
const RANKING_CHART_MAX: f64 = 6.49;

pub async fn build_teacher_dashboard(
    storage: &dyn Storage,
    teacher_id: i64,
) -> Result<TeacherDashboard> {
    let teacher = storage
        .get_user_by_id(teacher_id)
        .await?
        .ok_or_else(|| GradebookError::not_found("Teacher does not exist."))?;
    let subject = storage.get_teacher_subject(teacher_id).await?;
    let classes = storage.list_teacher_classes(teacher_id).await?;

    Ok(TeacherDashboard {
        teacher_name: teacher.full_name(),
        subject_name: subject.map(|s| s.name),
        classes,
        report: None,
    })
}

/// Statistics of one taught class.
///
/// The class average, median and mode use every grade of the class. The
/// ranking only uses grades in the teacher's own subject.
pub async fn class_report(
    storage: &dyn Storage,
    teacher_id: i64,
    classes: &[Class],
    class_id: Option<i64>,
) -> Result<ClassReport> {
    let class = class_id
        .and_then(|id| classes.iter().find(|c| c.id == id))
        .ok_or_else(|| GradebookError::validation(CLASS_NOT_TAUGHT))?;

    let all_grades = storage.list_class_grades(class.id, None).await?;
    let pairs: Vec<(i32, f64)> = all_grades.iter().map(|g| (g.value, g.weight)).collect();
    let values: Vec<i32> = all_grades.iter().map(|g| g.value).collect();
    let statistics = class_statistics(&values);

    let roster = storage.list_students_in_class(class.id).await?;
    let names: HashMap<i64, String> = roster.iter().map(|s| (s.id, s.full_name())).collect();

    let ranked = match storage.get_teacher_subject(teacher_id).await? {
        Some(subject) => {
            let subject_grades = storage.list_class_grades(class.id, Some(subject.id)).await?;
            rank(&averages_by_key(
                subject_grades
                    .iter()
                    .map(|g| (g.student_id, g.value, g.weight)),
            ))
        }
        None => Vec::new(),
    };
    let name_of = |student_id: i64| names.get(&student_id).cloned().unwrap_or_default();

    let chart = (!ranked.is_empty()).then(|| {
        let bars = ranked
            .iter()
            .map(|entry| (name_of(entry.student_id), entry.average))
            .collect();
        BarChart::new(
            format!("Grades Bar Chart - class {}", class.name),
            Orientation::Vertical,
        )
        .labels("Students", "Average Grades")
        .value_max(RANKING_CHART_MAX)
        .bars(bars)
        .to_data_uri()
    });

    let ranking: Vec<RankingEntry> = ranked
        .iter()
        .map(|entry| RankingEntry {
            position: entry.position,
            student_id: entry.student_id,
            name: name_of(entry.student_id),
            average: format_average(entry.average),
        })
        .collect();

    Ok(ClassReport {
        class_id: class.id,
        class_name: class.name.clone(),
        class_average: format_average(weighted_average(&pairs)),
        median: match statistics.median {
            Ok(median) => median.to_string(),
            Err(e) => e.to_string(),
        },
        mode: match statistics.mode {
            Ok(mode) => mode.to_string(),
            Err(e) => e.to_string(),
        },
        roster,
        highest: ranking.first().cloned(),
        lowest: ranking.last().cloned(),
        ranking,
        chart,
    })
}

pub async fn handle_dashboard(
    service: &TeacherService,
    selected_class: Option<String>,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let principal = Principal::extract(request)
        .ok_or_else(|| ErrorUnauthorized("Authentication required"))?;
    let teacher_id = principal.user_id();

    let mut dashboard = match build_teacher_dashboard(storage.as_ref(), teacher_id).await {
        Ok(dashboard) => dashboard,
        Err(e) => {
            error!("Failed to build dashboard for teacher {}: {}", teacher_id, e);
            return Ok(views::redirect_with_error(request, "/", &e));
        }
    };

    let mut messages = Vec::new();
    if let Some(raw) = selected_class {
        match class_report(
            storage.as_ref(),
            teacher_id,
            &dashboard.classes,
            parse_id(Some(raw.as_str())),
        )
        .await
        {
            Ok(report) => dashboard.report = Some(report),
            Err(e) => {
                if !e.is_user_facing() {
                    error!("{}", e.format_simple());
                }
                messages.push(Flash::error(e.flash_text()));
            }
        }
    }

    views::render_with(
        request,
        "teacher_dashboard.html",
        context! { dashboard => dashboard },
        messages,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_utils::{grade, memory_storage, school};

    #[tokio::test]
    async fn test_dashboard_lists_taught_classes() {
        let storage = memory_storage().await;
        let s = school(&storage).await;

        let math = build_teacher_dashboard(&storage, s.math_teacher).await.unwrap();
        assert_eq!(math.subject_name.as_deref(), Some("Math"));
        let names: Vec<_> = math.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["1A", "1B"]);

        let physics = build_teacher_dashboard(&storage, s.physics_teacher).await.unwrap();
        assert_eq!(physics.classes.len(), 1);
    }

    #[tokio::test]
    async fn test_class_report() {
        let storage = memory_storage().await;
        let s = school(&storage).await;
        storage
            .insert_grades(vec![
                grade(3, 1.0, s.math, s.jan, s.math_teacher),
                grade(5, 1.0, s.math, s.zofia, s.math_teacher),
                grade(5, 1.0, s.math, s.zofia, s.math_teacher),
                grade(6, 1.0, s.physics, s.jan, s.physics_teacher),
            ])
            .await
            .unwrap();
        let dashboard = build_teacher_dashboard(&storage, s.math_teacher).await.unwrap();

        let report = class_report(&storage, s.math_teacher, &dashboard.classes, Some(s.class_a))
            .await
            .unwrap();
        // every subject counts towards the class statistics
        assert_eq!(report.class_average, "4.75");
        assert_eq!(report.median, "5");
        assert_eq!(report.mode, "5");

        let roster: Vec<_> = report.roster.iter().map(|s| s.first_name.as_str()).collect();
        assert_eq!(roster, vec!["Anna", "Jan", "Zofia"]);

        // only math grades rank, Anna has none
        assert_eq!(report.ranking.len(), 2);
        let highest = report.highest.unwrap();
        assert_eq!(highest.name, "Zofia Wrona");
        assert_eq!(highest.average, "5.00");
        let lowest = report.lowest.unwrap();
        assert_eq!(lowest.name, "Jan Nowak");
        assert_eq!(lowest.position, 2);
        assert!(report.chart.is_some());
    }

    #[tokio::test]
    async fn test_report_reports_statistics_errors() {
        let storage = memory_storage().await;
        let s = school(&storage).await;
        storage
            .insert_grades(vec![
                grade(3, 1.0, s.math, s.jan, s.math_teacher),
                grade(4, 1.0, s.math, s.zofia, s.math_teacher),
            ])
            .await
            .unwrap();
        let dashboard = build_teacher_dashboard(&storage, s.math_teacher).await.unwrap();

        let report = class_report(&storage, s.math_teacher, &dashboard.classes, Some(s.class_a))
            .await
            .unwrap();
        assert_eq!(report.median, "3.5");
        assert!(report.mode.contains("no unique mode"));

        let empty = class_report(&storage, s.math_teacher, &dashboard.classes, Some(s.class_b))
            .await
            .unwrap();
        assert_eq!(empty.median, "no grades to describe");
        assert!(empty.ranking.is_empty());
        assert!(empty.chart.is_none());
    }

    #[tokio::test]
    async fn test_class_not_taught() {
        let storage = memory_storage().await;
        let s = school(&storage).await;
        let dashboard = build_teacher_dashboard(&storage, s.physics_teacher).await.unwrap();
        let err = class_report(&storage, s.physics_teacher, &dashboard.classes, Some(s.class_b))
            .await
            .unwrap_err();
        assert_eq!(err.message(), CLASS_NOT_TAUGHT);
    }
}
