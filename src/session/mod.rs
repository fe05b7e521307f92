//! Login sessions.
//!
//! A session is created on login, stored server side in the object cache and
//! referenced by an opaque id in an HttpOnly cookie. Expiry is a pure function
//! of the last activity time so it can be checked without a clock.

mod principal;
mod store;

pub use principal::Principal;
pub use store::{SessionStore, removal_cookie, session_cookie};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::users::entities::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    pub role: UserRole,
    pub last_activity: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Expired,
}

impl Session {
    pub fn new(user_id: i64, role: UserRole, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            role,
            last_activity: now,
        }
    }

    /// Expired iff more than `idle_timeout` passed since the last activity
    pub fn status_at(&self, now: DateTime<Utc>, idle_timeout: Duration) -> SessionStatus {
        if now.signed_duration_since(self.last_activity) > idle_timeout {
            SessionStatus::Expired
        } else {
            SessionStatus::Active
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.role, self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(minutes: i64, seconds: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
            + Duration::minutes(minutes)
            + Duration::seconds(seconds)
    }

    #[test]
    fn test_session_expires_after_idle_timeout() {
        let timeout = Duration::minutes(5);
        let session = Session::new(1, UserRole::Student, at(0, 0));

        assert_eq!(session.status_at(at(0, 0), timeout), SessionStatus::Active);
        assert_eq!(session.status_at(at(5, 0), timeout), SessionStatus::Active);
        assert_eq!(session.status_at(at(5, 1), timeout), SessionStatus::Expired);
    }

    #[test]
    fn test_touch_extends_session() {
        let timeout = Duration::minutes(5);
        let mut session = Session::new(1, UserRole::Teacher, at(0, 0));
        session.touch(at(4, 0));
        assert_eq!(session.status_at(at(8, 0), timeout), SessionStatus::Active);
        assert_eq!(session.status_at(at(9, 1), timeout), SessionStatus::Expired);
    }

    #[test]
    fn test_session_ids_are_unique() {
        let a = Session::new(1, UserRole::Admin, at(0, 0));
        let b = Session::new(1, UserRole::Admin, at(0, 0));
        assert_ne!(a.id, b.id);
        assert_eq!(a.principal(), Principal::Admin { user_id: 1 });
    }
}
