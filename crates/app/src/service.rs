use std::collections::VecDeque;

use crate::{Settings, SettingsError, SettingsRepository, SettingsService, log};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

impl<R: log::Repository> log::Service for Service<R> {
    fn get_log_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        self.repository.read_entries()
    }

    fn add_log_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        self.repository.write_entry(entry)
    }
}

impl<R: SettingsRepository> SettingsService for Service<R> {
    async fn get_settings(&self) -> Result<Settings, SettingsError> {
        self.repository.read_settings().await
    }

    async fn set_settings(&self, settings: Settings) -> Result<(), SettingsError> {
        self.repository.write_settings(settings).await
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, sync::Mutex};

    use ::log::Level;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Theme, log::Service as _};

    #[tokio::test]
    async fn test_settings() {
        let service = Service::new(FakeSettings::default());
        assert_eq!(service.get_settings().await.unwrap(), Settings::default());

        let settings = Settings {
            theme: Theme::Dark,
            ..Settings::default()
        };
        service.set_settings(settings.clone()).await.unwrap();
        assert_eq!(service.get_settings().await.unwrap(), settings);
    }

    #[test]
    fn test_log_entries() {
        let service = Service::new(FakeLog::default());
        let entry = log::Entry {
            time: String::from("Jan 01 00:00:00"),
            level: Level::Info,
            message: String::from("foo"),
        };
        service.add_log_entry(entry.clone()).unwrap();
        assert_eq!(
            service.get_log_entries().unwrap(),
            VecDeque::from([entry])
        );
    }

    #[derive(Default)]
    struct FakeSettings {
        settings: RefCell<Option<Settings>>,
    }

    impl SettingsRepository for FakeSettings {
        async fn read_settings(&self) -> Result<Settings, SettingsError> {
            Ok(self.settings.borrow().clone().unwrap_or_default())
        }

        async fn write_settings(&self, settings: Settings) -> Result<(), SettingsError> {
            *self.settings.borrow_mut() = Some(settings);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeLog {
        entries: Mutex<VecDeque<log::Entry>>,
    }

    impl log::Repository for FakeLog {
        fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
            self.entries
                .lock()
                .map(|entries| entries.clone())
                .map_err(|err| log::Error::Unknown(err.to_string()))
        }

        fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
            let mut entries = self
                .entries
                .lock()
                .map_err(|err| log::Error::Unknown(err.to_string()))?;
            log::push_entry(&mut entries, entry);
            Ok(())
        }
    }
}
