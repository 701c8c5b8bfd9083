//! # Process-Wide Schema Store
//!
//! A keyed cache of compiled namespaces, so every subsystem decoding against
//! the same schema shares one immutable compilation. Publication is
//! first-wins: once a key holds a namespace, later loads under that key
//! return the existing one and the supplied schema is discarded.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};

use crate::defs::Abi;
use crate::error::BuildError;
use crate::namespace::AbiNamespace;

fn store() -> &'static Mutex<HashMap<String, AbiNamespace>> {
    static STORE: OnceLock<Mutex<HashMap<String, AbiNamespace>>> = OnceLock::new();
    STORE.get_or_init(|| Mutex::new(HashMap::new()))
}

fn lock() -> std::sync::MutexGuard<'static, HashMap<String, AbiNamespace>> {
    store().lock().unwrap_or_else(PoisonError::into_inner)
}

/// Compile `abi` and publish it under `key`, or return the namespace already
/// published there. Compilation happens outside the lock; on a concurrent
/// double-load the first insert wins and the loser's build is dropped.
pub fn load(key: &str, abi: Abi) -> Result<AbiNamespace, BuildError> {
    if let Some(existing) = get(key) {
        return Ok(existing);
    }
    let built = AbiNamespace::build(abi)?;
    let mut map = lock();
    let published = map.entry(key.to_owned()).or_insert(built);
    tracing::debug!(key, fingerprint = %published.fingerprint(), "schema published");
    Ok(published.clone())
}

/// The namespace published under `key`, if any.
pub fn get(key: &str) -> Option<AbiNamespace> {
    lock().get(key).cloned()
}

/// Drop the namespace published under `key`. Handles already held stay
/// valid; they share the compiled namespace, not the store slot.
pub fn unload(key: &str) -> bool {
    lock().remove(key).is_some()
}

/// Keys with a published namespace, in no particular order.
pub fn keys() -> Vec<String> {
    lock().keys().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(field_type: &str) -> Abi {
        Abi::from_json(&format!(
            r#"{{"structs": [{{"name": "row", "fields": [{{"name": "x", "type": "{field_type}"}}]}}]}}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_publish_once_per_key() {
        let first = load("store-test-once", schema("uint8")).unwrap();
        // a different schema under the same key does not replace the first
        let second = load("store-test-once", schema("uint64")).unwrap();
        assert_eq!(first.fingerprint(), second.fingerprint());
        assert!(unload("store-test-once"));
    }

    #[test]
    fn test_unload_frees_the_key() {
        load("store-test-unload", schema("uint8")).unwrap();
        assert!(unload("store-test-unload"));
        assert!(!unload("store-test-unload"));
        assert!(get("store-test-unload").is_none());
    }

    #[test]
    fn test_invalid_schema_publishes_nothing() {
        let bad = Abi::from_json(
            r#"{"structs": [{"name": "row", "fields": [{"name": "x", "type": "mystery"}]}]}"#,
        )
        .unwrap();
        assert!(load("store-test-invalid", bad).is_err());
        assert!(get("store-test-invalid").is_none());
    }

    #[test]
    fn test_handles_survive_unload() {
        let ns = load("store-test-survive", schema("uint8")).unwrap();
        let row = ns.require("row").unwrap();
        unload("store-test-survive");
        assert_eq!(row.name(), "row");
    }
}
