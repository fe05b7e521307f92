use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, error::ErrorUnauthorized};
use minijinja::context;
use std::collections::HashSet;
use tracing::{error, info};

use super::TeacherService;
use super::dashboard::CLASS_NOT_TAUGHT;
use crate::errors::{GradebookError, Result};
use crate::models::classes::entities::Class;
use crate::models::grades::entities::NewGrade;
use crate::models::grades::requests::{EnterGradesForm, GradeAction};
use crate::services::parse_id;
use crate::session::Principal;
use crate::storage::Storage;
use crate::utils::validate::{parse_grade, parse_weight};
use crate::views::{self, Flash};

pub const GRADES_ADDED: &str = "Grades added!";
pub const INVALID_ACTION: &str = "Invalid action!";
pub const STUDENT_NOT_IN_CLASS: &str = "Selected student is not in the selected class.";
pub const ROSTER_MISMATCH: &str = "Grades do not match the class list.";

const ENTER_GRADES_PATH: &str = "/enter_grades";

async fn taught_class(storage: &dyn Storage, teacher_id: i64, class_id: Option<i64>) -> Result<Class> {
    let classes = storage.list_teacher_classes(teacher_id).await?;
    class_id
        .and_then(|id| classes.into_iter().find(|c| c.id == id))
        .ok_or_else(|| GradebookError::validation(CLASS_NOT_TAUGHT))
}

/// Validates a submitted grade sheet and stores it as one batch.
///
/// Nothing is written unless every cell is valid. Blank cells are skipped.
/// Returns the number of grades stored.
pub async fn record_grades(
    storage: &dyn Storage,
    teacher_id: i64,
    form: &EnterGradesForm,
) -> Result<u64> {
    let class = taught_class(storage, teacher_id, parse_id(form.selected_class.as_deref())).await?;

    let weight = parse_weight(form.weight.as_deref().unwrap_or(""))
        .map_err(GradebookError::validation)?;
    let values = form
        .grades
        .iter()
        .map(|raw| parse_grade(raw))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(GradebookError::validation)?;

    if values.len() != form.students.len() {
        return Err(GradebookError::validation(ROSTER_MISMATCH));
    }

    let subject = storage
        .get_teacher_subject(teacher_id)
        .await?
        .ok_or_else(|| GradebookError::not_found("You are not assigned to a subject."))?;
    let roster: HashSet<i64> = storage
        .list_students_in_class(class.id)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();

    let mut batch = Vec::new();
    for (student, value) in form.students.iter().zip(values) {
        let Some(value) = value else {
            continue;
        };
        let student_id = parse_id(Some(student.as_str()))
            .filter(|id| roster.contains(id))
            .ok_or_else(|| GradebookError::validation(STUDENT_NOT_IN_CLASS))?;
        batch.push(NewGrade {
            value,
            weight,
            subject_id: subject.id,
            student_id,
            teacher_id,
        });
    }

    storage.insert_grades(batch).await
}

pub async fn handle_enter_grades_page(
    service: &TeacherService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let principal = Principal::extract(request)
        .ok_or_else(|| ErrorUnauthorized("Authentication required"))?;

    match storage.list_teacher_classes(principal.user_id()).await {
        Ok(classes) => views::render(request, "enter_grades.html", context! { classes => classes }),
        Err(e) => {
            error!("Failed to list classes of teacher {}: {}", principal.user_id(), e);
            Ok(views::redirect_with_error(request, "/teacher_dashboard", &e))
        }
    }
}

pub async fn handle_enter_grades(
    service: &TeacherService,
    form: EnterGradesForm,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let principal = Principal::extract(request)
        .ok_or_else(|| ErrorUnauthorized("Authentication required"))?;
    let teacher_id = principal.user_id();

    let Ok(action) = form.gradeaction.parse::<GradeAction>() else {
        return Ok(views::redirect_with_flash(
            request,
            ENTER_GRADES_PATH,
            Flash::error(INVALID_ACTION),
        ));
    };

    match action {
        GradeAction::SelectClass => {
            let class_id = parse_id(form.selected_class.as_deref());
            let result = match taught_class(storage.as_ref(), teacher_id, class_id).await {
                Ok(class) => storage
                    .list_students_in_class(class.id)
                    .await
                    .map(|students| (class, students)),
                Err(e) => Err(e),
            };
            match result {
                Ok((class, students)) => views::render(
                    request,
                    "enter_grades_step2.html",
                    context! { selected_class => class, students => students },
                ),
                Err(e) => Ok(views::redirect_with_error(request, ENTER_GRADES_PATH, &e)),
            }
        }
        GradeAction::Submit => match record_grades(storage.as_ref(), teacher_id, &form).await {
            Ok(count) => {
                info!("Teacher {} added {} grades", teacher_id, count);
                Ok(views::redirect_with_flash(
                    request,
                    ENTER_GRADES_PATH,
                    Flash::success(GRADES_ADDED),
                ))
            }
            Err(e) => Ok(views::redirect_with_error(request, ENTER_GRADES_PATH, &e)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_utils::{memory_storage, school};
    use crate::utils::validate::{
        INVALID_GRADE_INTEGER, INVALID_GRADE_RANGE, INVALID_WEIGHT_NUMERIC, INVALID_WEIGHT_RANGE,
    };

    fn sheet(class_id: i64, weight: &str, cells: &[(i64, &str)]) -> EnterGradesForm {
        EnterGradesForm {
            gradeaction: "update2".into(),
            selected_class: Some(class_id.to_string()),
            weight: Some(weight.into()),
            students: cells.iter().map(|(id, _)| id.to_string()).collect(),
            grades: cells.iter().map(|(_, g)| g.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_valid_sheet_skips_blank_cells() {
        let storage = memory_storage().await;
        let s = school(&storage).await;

        let form = sheet(s.class_a, "0.5", &[(s.anna, "4"), (s.jan, ""), (s.zofia, "6")]);
        let stored = record_grades(&storage, s.math_teacher, &form).await.unwrap();
        assert_eq!(stored, 2);

        let grades = storage.list_class_grades(s.class_a, Some(s.math)).await.unwrap();
        assert_eq!(grades.len(), 2);
        assert!(grades.iter().all(|g| g.weight == 0.5));
        assert!(grades.iter().all(|g| g.student_id != s.jan));
    }

    #[tokio::test]
    async fn test_invalid_input_leaves_grades_unchanged() {
        let storage = memory_storage().await;
        let s = school(&storage).await;

        let cases = [
            ("0", "4", INVALID_WEIGHT_RANGE),
            ("1.5", "4", INVALID_WEIGHT_RANGE),
            ("heavy", "4", INVALID_WEIGHT_NUMERIC),
            ("1", "0", INVALID_GRADE_RANGE),
            ("1", "7", INVALID_GRADE_RANGE),
            ("1", "five", INVALID_GRADE_INTEGER),
        ];
        for (weight, bad, expected) in cases {
            let form = sheet(s.class_a, weight, &[(s.anna, "5"), (s.jan, bad)]);
            let err = record_grades(&storage, s.math_teacher, &form).await.unwrap_err();
            assert_eq!(err.message(), expected, "weight {weight}, grade {bad}");
        }

        assert!(storage.list_class_grades(s.class_a, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_student_from_another_class_rejected() {
        let storage = memory_storage().await;
        let s = school(&storage).await;

        let form = sheet(s.class_a, "1", &[(s.jan, "5"), (s.piotr, "3")]);
        let err = record_grades(&storage, s.math_teacher, &form).await.unwrap_err();
        assert_eq!(err.message(), STUDENT_NOT_IN_CLASS);
        assert!(storage.list_class_grades(s.class_a, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_class_must_be_taught() {
        let storage = memory_storage().await;
        let s = school(&storage).await;

        let form = sheet(s.class_b, "1", &[(s.piotr, "3")]);
        let err = record_grades(&storage, s.physics_teacher, &form).await.unwrap_err();
        assert_eq!(err.message(), CLASS_NOT_TAUGHT);
    }
}
