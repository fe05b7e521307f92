use serde::Deserialize;

/// Form posted by the admin on `/add_user`
#[derive(Debug, Clone, Deserialize)]
pub struct AddUserForm {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(rename = "secondName", default)]
    pub second_name: String,
    #[serde(default)]
    pub password: String,
    /// Class id, used when creating a student
    pub classes: Option<String>,
    /// Subject id, used when creating a teacher
    pub subjects: Option<String>,
}
