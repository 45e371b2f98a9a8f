//! audiocall-store: word progress stores.
//!
//! Implements the `WordStore` trait from `audiocall-core` over memory and a
//! local JSON file, plus a recording store for tests.

pub mod file;
pub mod memory;
pub mod mock;

use std::sync::Arc;

use audiocall_core::config::QuizConfig;
use audiocall_core::error::StoreError;
use audiocall_core::traits::WordStore;

pub use file::JsonFileStore;
pub use memory::{MemoryWordStore, StoreSnapshot};
pub use mock::RecordingStore;

/// Create the store a session should write to.
///
/// Guests get a memory store that refuses writes, so nothing reaches disk.
pub fn create_store(config: &QuizConfig) -> Result<Arc<dyn WordStore>, StoreError> {
    if !config.authenticated {
        tracing::info!("playing as guest, progress will not be saved");
        return Ok(Arc::new(MemoryWordStore::guest()));
    }
    Ok(Arc::new(JsonFileStore::open(&config.store_path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guest_store_is_unauthenticated() {
        let config = QuizConfig {
            authenticated: false,
            ..Default::default()
        };
        let store = create_store(&config).unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn signed_in_store_uses_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = QuizConfig {
            store_path: dir.path().join("p.json"),
            ..Default::default()
        };
        let store = create_store(&config).unwrap();
        assert!(store.is_authenticated());
    }
}
