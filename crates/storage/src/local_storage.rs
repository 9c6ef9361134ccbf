use std::collections::VecDeque;

use fytr_app::log;
use gloo_storage::{Storage as GlooStorage, errors::StorageError};
use serde::{Serialize, de::DeserializeOwned};

use crate::key_value::{Key, KeyValueError, KeyValueStore, impl_settings_repository};

/// Browser local storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

impl KeyValueStore for LocalStorage {
    fn get<T: DeserializeOwned>(&self, key: Key) -> Result<Option<T>, KeyValueError> {
        match gloo_storage::LocalStorage::get(key) {
            Ok(value) => Ok(Some(value)),
            Err(StorageError::KeyNotFound(_)) => Ok(None),
            Err(StorageError::SerdeError(err)) => Err(KeyValueError::Serialization(err)),
            Err(err) => Err(KeyValueError::Backend(err.to_string())),
        }
    }

    fn set<T: Serialize>(&self, key: Key, value: &T) -> Result<(), KeyValueError> {
        gloo_storage::LocalStorage::set(key, value).map_err(|err| match err {
            StorageError::SerdeError(err) => KeyValueError::Serialization(err),
            err => KeyValueError::Backend(err.to_string()),
        })
    }

    fn remove(&self, key: Key) -> Result<(), KeyValueError> {
        gloo_storage::LocalStorage::delete(key);
        Ok(())
    }

    /// Removes all entries of this app. Entries of other apps on the same origin are kept.
    fn clear(&self) -> Result<(), KeyValueError> {
        for key in Key::ALL {
            self.remove(key)?;
        }
        Ok(())
    }
}

impl_settings_repository!(LocalStorage);

impl log::Repository for LocalStorage {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        self.get::<VecDeque<log::Entry>>(Key::Log)
            .map(Option::unwrap_or_default)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        log::push_entry(&mut entries, entry);
        self.set(Key::Log, &entries)
            .map_err(|err| log::Error::Unknown(err.to_string()))
    }
}
