pub mod requests;

pub use requests::LoginForm;
