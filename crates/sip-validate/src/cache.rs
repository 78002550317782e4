//! Process-lifetime cache of fetched schema sources.
//!
//! Keyed by `(location, version)`. Compiled validation contexts hold raw
//! libxml2 pointers and cannot cross threads, so the cache stores the
//! fetched bytes (the expensive, network-bound part) and validations
//! compile from them. Concurrent misses on one key may fetch twice; the
//! first write wins and later fetches of equivalent content are dropped.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use sip_model::SchemaReference;

use crate::error::ValidateError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SchemaKey {
    location: String,
    version: String,
}

impl SchemaKey {
    fn for_reference(reference: &SchemaReference) -> Self {
        Self {
            location: reference.location.clone(),
            version: reference.version.clone(),
        }
    }
}

/// One cached schema source.
#[derive(Debug)]
pub struct SchemaSource {
    pub location: String,
    pub bytes: Vec<u8>,
}

/// Shared, read-mostly schema-source cache. Inject one per process (or
/// one per test) rather than relying on a global.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: RwLock<HashMap<SchemaKey, Arc<SchemaSource>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached source for a reference, loading it on miss.
    /// The loader runs outside any lock; a racing load on the same key
    /// is tolerated and the first inserted entry is kept.
    pub fn get_or_load(
        &self,
        reference: &SchemaReference,
        loader: impl FnOnce(&SchemaReference) -> Result<Vec<u8>, ValidateError>,
    ) -> Result<Arc<SchemaSource>, ValidateError> {
        let key = SchemaKey::for_reference(reference);
        if let Some(cached) = self.entries.read().unwrap().get(&key) {
            return Ok(Arc::clone(cached));
        }

        let bytes = loader(reference)?;
        let source = Arc::new(SchemaSource {
            location: reference.location.clone(),
            bytes,
        });

        let mut entries = self.entries.write().unwrap();
        let entry = entries.entry(key).or_insert_with(|| Arc::clone(&source));
        Ok(Arc::clone(entry))
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
