use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use super::Session;
use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::models::users::entities::UserRole;

const KEY_PREFIX: &str = "session:";

/// Sessions kept as JSON in the object cache
#[derive(Clone)]
pub struct SessionStore {
    cache: Arc<dyn ObjectCache>,
    ttl: u64,
}

impl SessionStore {
    pub fn new(cache: Arc<dyn ObjectCache>) -> Self {
        Self {
            cache,
            ttl: AppConfig::get().cache.default_ttl,
        }
    }

    fn key(id: &str) -> String {
        format!("{KEY_PREFIX}{id}")
    }

    pub async fn create(&self, user_id: i64, role: UserRole, now: DateTime<Utc>) -> Session {
        let session = Session::new(user_id, role, now);
        self.save(&session).await;
        debug!("Session created for user {} ({})", user_id, role);
        session
    }

    pub async fn load(&self, id: &str) -> Option<Session> {
        match self.cache.get_raw(&Self::key(id)).await {
            CacheResult::Found(json) => match serde_json::from_str::<Session>(&json) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!("Dropping unreadable session {}: {}", id, e);
                    self.cache.remove(&Self::key(id)).await;
                    None
                }
            },
            _ => None,
        }
    }

    pub async fn save(&self, session: &Session) {
        match serde_json::to_string(session) {
            Ok(json) => {
                self.cache
                    .insert_raw(Self::key(&session.id), json, self.ttl)
                    .await
            }
            Err(e) => warn!("Failed to serialize session {}: {}", session.id, e),
        }
    }

    pub async fn destroy(&self, id: &str) {
        self.cache.remove(&Self::key(id)).await;
    }
}

pub fn session_cookie(session_id: &str) -> Cookie<'static> {
    let config = &AppConfig::get().session;
    Cookie::build(config.cookie_name.clone(), session_id.to_string())
        .path("/")
        .http_only(true)
        .secure(config.secure_cookie)
        .same_site(SameSite::Lax)
        .finish()
}

pub fn removal_cookie() -> Cookie<'static> {
    let config = &AppConfig::get().session;
    Cookie::build(config.cookie_name.clone(), "")
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::ZERO)
        .finish()
}
