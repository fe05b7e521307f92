//! Unified error handling.
//!
//! Error variants are generated by a macro that attaches an error code and a
//! type name to every variant.

use std::fmt;

/// Defines the crate error enum.
///
/// Generates:
/// - the enum itself
/// - `code()` returning the error code
/// - `error_type()` returning the type name
/// - `message()` returning the detail message
/// - snake_case constructors
macro_rules! define_gradebook_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum GradebookError {
            $($variant(String),)*
        }

        impl GradebookError {
            /// Error code
            pub fn code(&self) -> &'static str {
                match self {
                    $(GradebookError::$variant(_) => $code,)*
                }
            }

            /// Error type name
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(GradebookError::$variant(_) => $type_name,)*
                }
            }

            /// Error detail
            pub fn message(&self) -> &str {
                match self {
                    $(GradebookError::$variant(msg) => msg,)*
                }
            }
        }

        paste::paste! {
            impl GradebookError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        GradebookError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_gradebook_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    Authentication("E012", "Authentication Error"),
    Authorization("E013", "Authorization Error"),
    Conflict("E014", "Conflict"),
    Template("E015", "Template Error"),
}

impl GradebookError {
    /// Colored output for development
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// Whether the message may be shown to the user as-is.
    ///
    /// Store and infrastructure failures are logged instead.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            GradebookError::Validation(_)
                | GradebookError::NotFound(_)
                | GradebookError::Conflict(_)
                | GradebookError::Authentication(_)
                | GradebookError::Authorization(_)
        )
    }

    /// Message suitable for a flash.
    pub fn flash_text(&self) -> String {
        if self.is_user_facing() {
            self.message().to_string()
        } else {
            "Something went wrong, please try again.".to_string()
        }
    }
}

impl fmt::Display for GradebookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for GradebookError {}

impl From<sea_orm::DbErr> for GradebookError {
    fn from(err: sea_orm::DbErr) -> Self {
        GradebookError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for GradebookError {
    fn from(err: serde_json::Error) -> Self {
        GradebookError::Serialization(err.to_string())
    }
}

impl From<minijinja::Error> for GradebookError {
    fn from(err: minijinja::Error) -> Self {
        GradebookError::Template(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GradebookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(GradebookError::cache_connection("test").code(), "E001");
        assert_eq!(GradebookError::database_config("test").code(), "E003");
        assert_eq!(GradebookError::validation("test").code(), "E007");
        assert_eq!(GradebookError::conflict("test").code(), "E014");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            GradebookError::validation("test").error_type(),
            "Validation Error"
        );
        assert_eq!(
            GradebookError::not_found("test").error_type(),
            "Resource Not Found"
        );
    }

    #[test]
    fn test_flash_text_hides_store_errors() {
        let err = GradebookError::database_operation("UNIQUE constraint failed: users.email");
        assert!(!err.flash_text().contains("UNIQUE"));

        let err = GradebookError::validation("Invalid role");
        assert_eq!(err.flash_text(), "Invalid role");
    }

    #[test]
    fn test_format_simple() {
        let err = GradebookError::validation("Invalid weight");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("Invalid weight"));
    }
}
