//! 站点内存存储实现

use crate::error::StorageError;
use crate::models::{Versioned, next_version};
use crate::traits::SiteStore;
use domain::{Site, SiteKey};
use std::collections::HashMap;
use std::sync::RwLock;

pub struct InMemorySiteStore {
    sites: RwLock<HashMap<SiteKey, Versioned<Site>>>,
}

impl InMemorySiteStore {
    pub fn new() -> Self {
        Self {
            sites: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySiteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SiteStore for InMemorySiteStore {
    async fn get_site(&self, key: &SiteKey) -> Result<Option<Versioned<Site>>, StorageError> {
        let map = self
            .sites
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map.get(key).cloned())
    }

    async fn upsert_site(
        &self,
        key: &SiteKey,
        site: &Site,
        expected_version: Option<i64>,
    ) -> Result<i64, StorageError> {
        let mut map = self
            .sites
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let current = map.get(key).map(|item| item.version);
        let version = next_version(key, current, expected_version)?;
        map.insert(key.clone(), Versioned::new(site.clone(), version));
        Ok(version)
    }
}
