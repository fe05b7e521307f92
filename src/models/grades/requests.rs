/// `/enter_grades` form.
///
/// The form repeats `students[]` and `grades[]`, so it is read from the raw
/// list of pairs rather than through a struct derive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnterGradesForm {
    pub gradeaction: String,
    pub selected_class: Option<String>,
    pub weight: Option<String>,
    pub students: Vec<String>,
    pub grades: Vec<String>,
}

/// Parsed `gradeaction` of the grade entry form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeAction {
    /// Step 1: class chosen, show the roster
    SelectClass,
    /// Step 2: grades entered, persist them
    Submit,
}

impl std::str::FromStr for GradeAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "update1" => Ok(GradeAction::SelectClass),
            "update2" => Ok(GradeAction::Submit),
            _ => Err(format!("Invalid action: {s}")),
        }
    }
}

impl EnterGradesForm {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = EnterGradesForm::default();
        for (key, value) in pairs {
            match key.as_str() {
                "gradeaction" => form.gradeaction = value,
                "selectedClass" => form.selected_class = Some(value),
                "weight" => form.weight = Some(value),
                "students" | "students[]" => form.students.push(value),
                "grades" | "grades[]" => form.grades.push(value),
                _ => {}
            }
        }
        form
    }
}
