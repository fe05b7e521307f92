use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, error::ErrorUnauthorized};
use minijinja::context;
use tracing::error;

use super::StudentService;
use crate::charts::{BarChart, Orientation};
use crate::errors::{GradebookError, Result};
use crate::grading::{averages_by_key, position_of, rank, weighted_average};
use crate::models::dashboards::{StudentDashboard, SubjectSelection, format_average};
use crate::models::grades::entities::GradeRow;
use crate::models::subjects::entities::Subject;
use crate::services::parse_id;
use crate::session::Principal;
use crate::storage::Storage;
use crate::views::{self, Flash};

pub const UNKNOWN_SUBJECT: &str = "Selected subject does not exist.";

fn pairs(grades: &[GradeRow]) -> Vec<(i32, f64)> {
    grades.iter().map(|g| (g.value, g.weight)).collect()
}

/// Horizontal chart of the student's per-subject averages, lowest first
pub fn subject_chart(grades: &[GradeRow]) -> BarChart {
    let mut bars = averages_by_key(
        grades
            .iter()
            .map(|g| (g.subject_name.clone(), g.value, g.weight)),
    );
    bars.sort_by(|a, b| a.1.total_cmp(&b.1));

    BarChart::new("Average Grades per Subject", Orientation::Horizontal)
        .labels("Average Grade", "Subjects")
        .bars(bars)
}

pub async fn build_student_dashboard(
    storage: &dyn Storage,
    student_id: i64,
) -> Result<StudentDashboard> {
    let student = storage
        .get_user_by_id(student_id)
        .await?
        .ok_or_else(|| GradebookError::not_found("Student does not exist."))?;
    let class = storage
        .get_student_class(student_id)
        .await?
        .ok_or_else(|| GradebookError::not_found("Student is not assigned to a class."))?;

    let class_size = storage.count_students_in_class(class.id).await?;
    let subjects = storage.list_student_subjects(student_id).await?;
    let latest_grade = storage.latest_student_grade(student_id).await?;

    let own_grades = storage.list_student_grades(student_id, None).await?;
    let overall_average = weighted_average(&pairs(&own_grades));

    let class_grades = storage.list_class_grades(class.id, None).await?;
    let student_averages =
        averages_by_key(class_grades.iter().map(|g| (g.student_id, g.value, g.weight)));
    let rank = position_of(&rank(&student_averages), student_id);

    Ok(StudentDashboard {
        student_name: student.full_name(),
        class_name: class.name,
        class_profile: class.profile,
        class_size,
        subjects,
        latest_grade,
        overall_average: format_average(overall_average),
        rank,
        chart: subject_chart(&own_grades).to_data_uri(),
        selected: None,
    })
}

/// Student and class averages in one of the student's subjects.
///
/// `subjects` are the subjects the student is enrolled in.
pub async fn subject_selection(
    storage: &dyn Storage,
    student_id: i64,
    subjects: &[Subject],
    subject_id: Option<i64>,
) -> Result<SubjectSelection> {
    let subject = subject_id
        .and_then(|id| subjects.iter().find(|s| s.id == id))
        .ok_or_else(|| GradebookError::validation(UNKNOWN_SUBJECT))?;
    let class = storage
        .get_student_class(student_id)
        .await?
        .ok_or_else(|| GradebookError::not_found("Student is not assigned to a class."))?;

    let own = storage
        .list_student_grades(student_id, Some(subject.id))
        .await?;
    let class_grades = storage.list_class_grades(class.id, Some(subject.id)).await?;

    Ok(SubjectSelection {
        subject_id: subject.id,
        subject_name: subject.name.clone(),
        student_average: format_average(weighted_average(&pairs(&own))),
        class_average: format_average(weighted_average(&pairs(&class_grades))),
    })
}

pub async fn handle_dashboard(
    service: &StudentService,
    selected_subject: Option<String>,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let principal = Principal::extract(request)
        .ok_or_else(|| ErrorUnauthorized("Authentication required"))?;
    let student_id = principal.user_id();

    let mut dashboard = match build_student_dashboard(storage.as_ref(), student_id).await {
        Ok(dashboard) => dashboard,
        Err(e) => {
            error!("Failed to build dashboard for student {}: {}", student_id, e);
            return Ok(views::redirect_with_error(request, "/", &e));
        }
    };

    let mut messages = Vec::new();
    if let Some(raw) = selected_subject {
        match subject_selection(
            storage.as_ref(),
            student_id,
            &dashboard.subjects,
            parse_id(Some(raw.as_str())),
        )
        .await
        {
            Ok(selection) => dashboard.selected = Some(selection),
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
        "student_dashboard.html",
        context! { dashboard => dashboard },
        messages,
    )
}
