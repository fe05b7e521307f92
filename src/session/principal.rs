use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures_util::future::{Ready, ready};

use crate::models::users::entities::UserRole;

/// The authenticated user of the current request.
///
/// Attached to the request extensions by the session middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    Student { user_id: i64 },
    Teacher { user_id: i64 },
    Admin { user_id: i64 },
}

impl Principal {
    pub fn new(role: UserRole, user_id: i64) -> Self {
        match role {
            UserRole::Student => Principal::Student { user_id },
            UserRole::Teacher => Principal::Teacher { user_id },
            UserRole::Admin => Principal::Admin { user_id },
        }
    }

    pub fn user_id(&self) -> i64 {
        match self {
            Principal::Student { user_id }
            | Principal::Teacher { user_id }
            | Principal::Admin { user_id } => *user_id,
        }
    }

    pub fn role(&self) -> UserRole {
        match self {
            Principal::Student { .. } => UserRole::Student,
            Principal::Teacher { .. } => UserRole::Teacher,
            Principal::Admin { .. } => UserRole::Admin,
        }
    }

    pub fn extract(req: &HttpRequest) -> Option<Principal> {
        req.extensions().get::<Principal>().copied()
    }
}

impl FromRequest for Principal {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Principal::extract(req).ok_or_else(|| ErrorUnauthorized("Authentication required")))
    }
}
