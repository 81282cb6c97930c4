//! Per-provider cache of chat clients, keyed by API version.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::Result;

use super::client::ChatClient;

/// Lazily-populated map from API version to client.
///
/// Construction happens outside the lock. Two callers missing on the same
/// version at once may each build a client; the last insert wins and both
/// clients are usable, since clients hold nothing but connection settings.
#[derive(Default)]
pub struct ClientCache {
    clients: RwLock<HashMap<String, Arc<dyn ChatClient>>>,
}

impl ClientCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached client for `api_version`, building it with `create`
    /// on a miss.
    pub fn get_or_try_insert_with<F>(
        &self,
        api_version: &str,
        create: F,
    ) -> Result<Arc<dyn ChatClient>>
    where
        F: FnOnce() -> Result<Arc<dyn ChatClient>>,
    {
        if let Some(client) = self.get(api_version) {
            return Ok(client);
        }

        debug!(api_version, "creating Azure client");
        let client = create()?;
        self.clients
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(api_version.to_string(), Arc::clone(&client));
        Ok(client)
    }

    pub fn get(&self, api_version: &str) -> Option<Arc<dyn ChatClient>> {
        self.clients
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(api_version)
            .cloned()
    }

    pub fn contains(&self, api_version: &str) -> bool {
        self.get(api_version).is_some()
    }

    /// Current number of cached clients.
    pub fn len(&self) -> usize {
        self.clients
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached client.
    pub fn clear(&self) {
        self.clients
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}
