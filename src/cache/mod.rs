//! Object cache plugins.
//!
//! Backends register a constructor under a name at load time through
//! [`declare_object_cache_plugin!`]; startup picks one by `cache.type`.
//! The session store is the only consumer.

pub mod object_cache;
pub mod register;

use async_trait::async_trait;

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    /// The backend failed to answer; treated like a miss by callers
    ExistsButNoValue,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    /// `ttl` in seconds, 0 means the backend default
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    async fn remove(&self, key: &str);
}

/// Registers a cache backend under `$name`.
///
/// `$ty` must provide `fn new() -> Result<Self, String>` and implement
/// [`ObjectCache`].
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:literal, $ty:ty) => {
        #[ctor::ctor]
        unsafe fn __register_object_cache_plugin() {
            $crate::cache::register::register_object_cache_plugin(
                $name,
                std::sync::Arc::new(|| {
                    Box::pin(async {
                        <$ty>::new()
                            .map(|cache| {
                                Box::new(cache) as Box<dyn $crate::cache::ObjectCache>
                            })
                            .map_err($crate::errors::GradebookError::cache_connection)
                    }) as $crate::cache::register::BoxedObjectCacheFuture
                }),
            );
        }
    };
}
