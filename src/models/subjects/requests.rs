use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AddSubjectForm {
    #[serde(default)]
    pub newsubject: String,
}
