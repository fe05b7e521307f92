use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::{AppConfig, ClassSeed};
use crate::errors::{GradebookError, Result};
use crate::models::users::entities::NewUser;
use crate::session::SessionStore;
use crate::storage::Storage;
use crate::utils::password::hash_password_with;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@uw.edu.pl";

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub sessions: SessionStore,
}

async fn try_cache_backend(name: &str) -> Option<Arc<dyn ObjectCache>> {
    let constructor = get_object_cache_plugin(name)?;
    match constructor().await {
        Ok(cache) => {
            warn!("Successfully created {} cache backend", name);
            Some(Arc::from(cache))
        }
        Err(e) => {
            warn!("Failed to create {} cache: {}", name, e);
            None
        }
    }
}

/// Session store backend named by `cache.type`, falling back to memory
async fn create_cache() -> Result<Arc<dyn ObjectCache>> {
    let cache_type = &AppConfig::get().cache.cache_type;
    warn!("Attempting to create {} cache backend", cache_type);

    if get_object_cache_plugin(cache_type).is_none() {
        warn!("Cache backend '{}' not found in registry", cache_type);
    }
    if let Some(cache) = try_cache_backend(cache_type).await {
        return Ok(cache);
    }

    if cache_type != "moka" {
        warn!("Falling back to memory cache");
        if let Some(cache) = try_cache_backend("moka").await {
            return Ok(cache);
        }
    }

    Err(GradebookError::cache_plugin_not_found(format!(
        "No cache backend available (tried: {cache_type})"
    )))
}

fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Creates the configured classes that do not exist yet.
pub async fn seed_classes(storage: &dyn Storage, classes: &[ClassSeed]) -> Result<usize> {
    let mut created = 0;
    for seed in classes {
        if storage.get_class_by_name(&seed.name).await?.is_some() {
            continue;
        }
        storage.create_class(&seed.name, &seed.profile).await?;
        debug!("Seeded class {} ({})", seed.name, seed.profile);
        created += 1;
    }
    Ok(created)
}

/// Creates the default admin account on an empty database.
///
/// Credentials come from `ADMIN_EMAIL` and `ADMIN_PASSWORD`; a random
/// password is generated and logged when none is set.
async fn seed_admin(storage: &dyn Storage) {
    match storage.count_users().await {
        Ok(count) if count > 0 => {
            debug!(
                "Database already has {} user(s), skipping admin seed",
                count
            );
            return;
        }
        Ok(_) => {
            info!("No users found in database, creating default admin account...");
        }
        Err(e) => {
            warn!("Failed to count users: {}, skipping admin seed", e);
            return;
        }
    }

    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        let pwd = generate_random_password(16);
        warn!("==========================================================");
        warn!("  ADMIN PASSWORD NOT SET - USING GENERATED PASSWORD");
        warn!("  Generated admin password: {}", pwd);
        warn!("  Please save this password or set ADMIN_PASSWORD env var");
        warn!("==========================================================");
        pwd
    });

    let password_hash = match hash_password_with(&password, &AppConfig::get().argon2) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash admin password: {}, skipping admin seed", e);
            return;
        }
    };

    let admin = NewUser {
        email,
        first_name: "System".to_string(),
        second_name: "Administrator".to_string(),
        password_hash,
    };

    match storage.create_admin(admin).await {
        Ok(user) => info!(
            "Default admin account created successfully (ID: {}, email: {})",
            user.id, user.email
        ),
        Err(e) => warn!("Failed to create admin account: {}", e),
    }
}

/// Everything the server needs before it starts accepting requests
pub async fn prepare_server_startup() -> Result<StartupContext> {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
        debug!("Debug mode: Cache registry is enabled");
    }

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    let seeded = seed_classes(storage.as_ref(), &AppConfig::get().school.classes).await?;
    if seeded > 0 {
        info!("Seeded {} class(es) from configuration", seeded);
    }
    seed_admin(storage.as_ref()).await;

    let cache = create_cache().await?;
    warn!("Cache backend initialized");

    Ok(StartupContext {
        storage,
        sessions: SessionStore::new(cache),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_utils::memory_storage;

    #[tokio::test]
    async fn test_seed_classes_is_idempotent() {
        let storage = memory_storage().await;
        let seeds = vec![
            ClassSeed {
                name: "1A".into(),
                profile: "Mathematics".into(),
            },
            ClassSeed {
                name: "1B".into(),
                profile: "Biology".into(),
            },
        ];

        assert_eq!(seed_classes(&storage, &seeds).await.unwrap(), 2);
        assert_eq!(seed_classes(&storage, &seeds).await.unwrap(), 0);
        assert_eq!(storage.list_classes().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_seed_admin_only_on_empty_database() {
        let storage = memory_storage().await;
        seed_admin(&storage).await;
        assert_eq!(storage.count_users().await.unwrap(), 1);

        seed_admin(&storage).await;
        assert_eq!(storage.count_users().await.unwrap(), 1);
    }

    #[test]
    fn test_generated_password_length() {
        assert_eq!(generate_random_password(16).chars().count(), 16);
    }
}
