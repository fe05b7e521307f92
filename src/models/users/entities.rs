use serde::{Deserialize, Serialize};

pub const EMAIL_EXISTS: &str = "Email already exists.";

/// The three fixed roles of the gradebook
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    Teacher,
    Admin,
}

impl UserRole {
    pub const STUDENT: &'static str = "student";
    pub const TEACHER: &'static str = "teacher";
    pub const ADMIN: &'static str = "admin";

    pub fn all_roles() -> &'static [UserRole] {
        &[UserRole::Student, UserRole::Teacher, UserRole::Admin]
    }

    /// Role name with its indefinite article, as used in login messages
    pub fn with_article(&self) -> &'static str {
        match self {
            UserRole::Student => "a student",
            UserRole::Teacher => "a teacher",
            UserRole::Admin => "an admin",
        }
    }

    pub fn login_path(&self) -> &'static str {
        match self {
            UserRole::Student => "/login_student",
            UserRole::Teacher => "/login_teacher",
            UserRole::Admin => "/login_admin",
        }
    }

    pub fn dashboard_path(&self) -> &'static str {
        match self {
            UserRole::Student => "/student_dashboard",
            UserRole::Teacher => "/teacher_dashboard",
            UserRole::Admin => "/admin_panel",
        }
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<UserRole>().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Student => write!(f, "{}", UserRole::STUDENT),
            UserRole::Teacher => write!(f, "{}", UserRole::TEACHER),
            UserRole::Admin => write!(f, "{}", UserRole::ADMIN),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            UserRole::STUDENT => Ok(UserRole::Student),
            UserRole::TEACHER => Ok(UserRole::Teacher),
            UserRole::ADMIN => Ok(UserRole::Admin),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub second_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.second_name)
    }
}

/// Data for a user row about to be inserted. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub second_name: String,
    pub password_hash: String,
}

/// A student as listed in a class roster
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StudentSummary {
    pub id: i64,
    pub first_name: String,
    pub second_name: String,
}

impl StudentSummary {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.second_name)
    }
}

/// A teacher together with the subject they are qualified for
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TeacherSummary {
    pub id: i64,
    pub first_name: String,
    pub second_name: String,
    pub email: String,
    pub subject_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_strings() {
        for role in UserRole::all_roles() {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), *role);
        }
        assert!("user".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_paths() {
        assert_eq!(UserRole::Student.login_path(), "/login_student");
        assert_eq!(UserRole::Teacher.dashboard_path(), "/teacher_dashboard");
        assert_eq!(UserRole::Admin.dashboard_path(), "/admin_panel");
        assert_eq!(UserRole::Admin.with_article(), "an admin");
    }

    #[test]
    fn test_role_deserialize_rejects_unknown() {
        let role: UserRole = serde_json::from_str("\"teacher\"").unwrap();
        assert_eq!(role, UserRole::Teacher);
        assert!(serde_json::from_str::<UserRole>("\"janitor\"").is_err());
    }
}
