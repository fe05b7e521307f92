use serde::Deserialize;

/// Form posted on both steps of `/assign_teacher_to_class`
#[derive(Debug, Deserialize)]
pub struct AssignTeacherForm {
    #[serde(default)]
    pub action: String,
    pub classes: Option<String>,
    pub subjects: Option<String>,
    pub teachers: Option<String>,
}

/// Parsed `action` of the assignment form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignAction {
    /// Step 1: class and subject chosen, list qualified teachers
    Update,
    /// Step 2: teacher chosen, persist the assignment
    Save,
}

impl std::str::FromStr for AssignAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "update" => Ok(AssignAction::Update),
            "save" => Ok(AssignAction::Save),
            _ => Err(format!("Invalid action: {s}")),
        }
    }
}
