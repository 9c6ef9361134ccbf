use std::{cell::RefCell, collections::HashMap};

use fytr_domain as domain;
use serde::{Serialize, de::DeserializeOwned};
use strum::AsRefStr;

/// Synchronous store for serializable values.
pub trait KeyValueStore {
    fn get<T: DeserializeOwned>(&self, key: Key) -> Result<Option<T>, KeyValueError>;
    fn set<T: Serialize>(&self, key: Key, value: &T) -> Result<(), KeyValueError>;
    fn remove(&self, key: Key) -> Result<(), KeyValueError>;
    fn clear(&self) -> Result<(), KeyValueError>;
}

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    #[strum(serialize = "fytr:settings")]
    Settings,
    #[strum(serialize = "fytr:log")]
    Log,
    #[strum(serialize = "fytr:user")]
    User,
    #[strum(serialize = "fytr:onboarding")]
    Onboarding,
    #[strum(serialize = "fytr:onboarding-draft")]
    OnboardingDraft,
    #[strum(serialize = "fytr:quota")]
    Quota,
    #[strum(serialize = "fytr:analyses")]
    Analyses,
    #[strum(serialize = "fytr:workout-plans")]
    WorkoutPlans,
    #[strum(serialize = "fytr:exercises")]
    Exercises,
    #[strum(serialize = "fytr:exercise-version")]
    ExerciseVersion,
}

impl Key {
    pub const ALL: [Key; 10] = [
        Key::Settings,
        Key::Log,
        Key::User,
        Key::Onboarding,
        Key::OnboardingDraft,
        Key::Quota,
        Key::Analyses,
        Key::WorkoutPlans,
        Key::Exercises,
        Key::ExerciseVersion,
    ];

    /// Keys of data that belongs to the signed-in user.
    pub const SESSION_DEPENDENT: [Key; 6] = [
        Key::User,
        Key::Onboarding,
        Key::OnboardingDraft,
        Key::Quota,
        Key::Analyses,
        Key::WorkoutPlans,
    ];
}

#[derive(thiserror::Error, Debug)]
pub enum KeyValueError {
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{0}")]
    Backend(String),
}

impl From<KeyValueError> for domain::StorageError {
    fn from(value: KeyValueError) -> Self {
        domain::StorageError::Other(Box::new(value))
    }
}

macro_rules! impl_settings_repository {
    ($store: ty) => {
        impl fytr_app::SettingsRepository for $store {
            async fn read_settings(
                &self,
            ) -> Result<fytr_app::Settings, fytr_app::SettingsError> {
                $crate::key_value::KeyValueStore::get::<fytr_app::Settings>(
                    self,
                    $crate::key_value::Key::Settings,
                )
                .map(Option::unwrap_or_default)
                .map_err(|err| fytr_app::SettingsError::Read(err.to_string()))
            }

            async fn write_settings(
                &self,
                settings: fytr_app::Settings,
            ) -> Result<(), fytr_app::SettingsError> {
                $crate::key_value::KeyValueStore::set(
                    self,
                    $crate::key_value::Key::Settings,
                    &settings,
                )
                .map_err(|err| fytr_app::SettingsError::Write(err.to_string()))
            }
        }
    };
}

pub(crate) use impl_settings_repository;

/// In-memory store, used where no browser storage is available.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<Key, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, key: Key) -> bool {
        self.entries.borrow().contains_key(&key)
    }
}

impl KeyValueStore for MemoryStorage {
    fn get<T: DeserializeOwned>(&self, key: Key) -> Result<Option<T>, KeyValueError> {
        match self.entries.borrow().get(&key) {
            Some(value) => Ok(Some(serde_json::from_str(value)?)),
            None => Ok(None),
        }
    }

    fn set<T: Serialize>(&self, key: Key, value: &T) -> Result<(), KeyValueError> {
        let value = serde_json::to_string(value)?;
        self.entries.borrow_mut().insert(key, value);
        Ok(())
    }

    fn remove(&self, key: Key) -> Result<(), KeyValueError> {
        self.entries.borrow_mut().remove(&key);
        Ok(())
    }

    fn clear(&self) -> Result<(), KeyValueError> {
        self.entries.borrow_mut().clear();
        Ok(())
    }
}

impl_settings_repository!(MemoryStorage);
