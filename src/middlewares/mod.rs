pub mod rate_limit;
pub mod require_role;
pub mod require_session;

pub use rate_limit::RateLimit;
pub use require_role::RequireRole;
pub use require_session::RequireSession;
