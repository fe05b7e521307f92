//! SeaORM entity definitions
//!
//! These entities are used for database access only and are kept apart from
//! the business types in `models`. The storage layer converts between them.

pub mod prelude;

pub mod classes;
pub mod grades;
pub mod students;
pub mod subjects;
pub mod teacher_classes;
pub mod teachers;
pub mod users;
