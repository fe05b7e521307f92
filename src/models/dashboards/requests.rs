use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SelectSubjectForm {
    pub selected_subject: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectClassForm {
    pub selected_class: Option<String>,
}
