use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::records::{self, Decoded};

pub mod sqlite;

/// Keys under which the storefront keeps its state
pub mod keys {
    /// Profile of the logged in user, absent when anonymous
    pub const SESSION: &str = "holysmokes_user";
    pub const THEME: &str = "holysmokes_theme";
    pub const CART: &str = "holysmokes_cart";
    pub const DISHES: &str = "holysmokes_dishes";
    pub const USERS: &str = "holysmokes_users";
    pub const ORDERS: &str = "holysmokes_orders";
}

/// Trait hiding the storage backend
///
/// The storefront only needs a flat string to string map. The in-memory
/// store backs the unit tests and the SQLite one backs the CLI; the rest of
/// the code only sees this trait.
pub trait Store {
    /// Create a new empty store
    fn new() -> Result<Self>
    where
        Self: Sized;

    /// Raw value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing what was there
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Drop `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// A value read back from the store
#[derive(Debug)]
pub struct Loaded<T> {
    pub value: T,
    /// True when the value predates the versioned envelope and went through
    /// a migration. Saving it again upgrades the stored copy.
    pub migrated: bool,
}

/// Read and deserialize the value under `key`
///
/// Legacy values are assumed to have the same shape as current ones.
pub fn load<T: DeserializeOwned>(store: &dyn Store, key: &str) -> Result<Option<T>> {
    load_record(store, key, |value| Ok(serde_json::from_value(value)?))
        .map(|loaded| loaded.map(|loaded| loaded.value))
}

/// Read the value under `key`, running `migrate` on it if it is a legacy value
pub fn load_record<T, F>(store: &dyn Store, key: &str, migrate: F) -> Result<Option<Loaded<T>>>
where
    T: DeserializeOwned,
    F: FnOnce(Value) -> Result<T>,
{
    let raw = match store.get(key)? {
        Some(raw) => raw,
        None => return Ok(None),
    };

    let loaded = match records::decode(key, &raw)? {
        Decoded::Current(value) => Loaded {
            value: serde_json::from_value(value)?,
            migrated: false,
        },
        Decoded::Legacy(value) => {
            debug!("Migrating unversioned record '{key}'");
            Loaded {
                value: migrate(value)?,
                migrated: true,
            }
        }
    };
    Ok(Some(loaded))
}

/// Serialize `value` in the current envelope and write it under `key`
pub fn save<T: Serialize + ?Sized>(store: &mut dyn Store, key: &str, value: &T) -> Result<()> {
    let raw = records::encode(&value)?;
    store.set(key, &raw)
}

pub mod mock {
    use super::*;
    use crate::errors::Error;
    use std::collections::HashMap;

    /// Store living in a hash map
    ///
    /// Writes can be made to fail, either after a number of successful ones
    /// or for a single key, which stands in for a full browser storage quota.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        entries: HashMap<String, String>,
        writes_left: Option<usize>,
        failing_key: Option<String>,
    }

    impl MemoryStore {
        /// Let `count` more writes succeed, then fail every following one
        pub fn fail_writes_after(&mut self, count: usize) {
            self.writes_left = Some(count);
        }

        /// Fail every write to `key`, let the others through
        pub fn fail_writes_to(&mut self, key: &str) {
            self.failing_key = Some(key.to_string());
        }

        /// Make writes succeed again
        pub fn heal(&mut self) {
            self.writes_left = None;
            self.failing_key = None;
        }

        pub fn len(&self) -> usize {
            self.entries.len()
        }

        pub fn is_empty(&self) -> bool {
            self.entries.is_empty()
        }

        fn check_write(&mut self, key: &str) -> Result<()> {
            if self.failing_key.as_deref() == Some(key) {
                return Err(Error::Storage(format!(
                    "quota exceeded while writing '{}'",
                    key
                )));
            }
            match self.writes_left.as_mut() {
                Some(0) => Err(Error::Storage(format!(
                    "quota exceeded while writing '{}'",
                    key
                ))),
                Some(left) => {
                    *left -= 1;
                    Ok(())
                }
                None => Ok(()),
            }
        }
    }

    impl Store for MemoryStore {
        fn new() -> Result<Self> {
            Ok(MemoryStore::default())
        }

        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.entries.get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            self.check_write(key)?;
            self.entries.insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.check_write(key)?;
            self.entries.remove(key);
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::errors::Error;

        #[test]
        fn test_memory_store() {
            let mut store = MemoryStore::new().unwrap();
            assert_eq!(store.get("a").unwrap(), None);

            store.set("a", "1").unwrap();
            store.set("b", "2").unwrap();
            store.set("a", "3").unwrap();
            assert_eq!(store.get("a").unwrap().as_deref(), Some("3"));
            assert_eq!(store.len(), 2);

            store.remove("a").unwrap();
            store.remove("a").unwrap();
            assert_eq!(store.get("a").unwrap(), None);
            assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
        }

        #[test]
        fn test_failing_writes() {
            let mut store = MemoryStore::new().unwrap();
            store.fail_writes_after(1);
            store.set("a", "1").unwrap();
            assert!(matches!(store.set("b", "2"), Err(Error::Storage(_))));
            assert!(matches!(store.remove("a"), Err(Error::Storage(_))));
            assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

            store.heal();
            store.set("b", "2").unwrap();

            store.fail_writes_to("a");
            assert!(store.set("a", "4").is_err());
            store.set("c", "3").unwrap();
        }
    }
}
