pub mod password;
pub mod validate;

pub use validate::{check_word, parse_grade, parse_weight, validate_email, validate_role_email};
